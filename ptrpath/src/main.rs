use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use ptrpath::{
    check, check_batch, tokens, CheckOptions, Error, ParserConfig, Report, Source,
    DEFAULT_CONDITIONAL_LOOKAHEAD,
};

#[derive(Parser, Debug)]
#[command(name = "ptrpath", version, about = "Validate and inspect pointer-path expressions")]
struct Cli {
    /// Expression to check. Starts an interactive prompt when omitted.
    expression: Option<String>,

    /// Read every unprefixed number as hexadecimal.
    #[arg(short = 'x', long = "hex")]
    hex: bool,

    /// Print the token stream before the AST.
    #[arg(short = 't', long = "tokens")]
    tokens: bool,

    /// Check every line of FILE instead of a single expression.
    #[arg(short = 'b', long = "batch", value_name = "FILE", conflicts_with = "expression")]
    batch: Option<PathBuf>,

    /// Treat NAME as bound before the expression runs. Can be repeated.
    #[arg(short = 'D', long = "define", value_name = "NAME")]
    define: Vec<String>,

    /// Fail on references to unbound variables instead of warning.
    #[arg(long)]
    strict: bool,

    /// Number of tokens searched for the `?` of a conditional.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONDITIONAL_LOOKAHEAD)]
    lookahead: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = CheckOptions {
        parser: ParserConfig {
            conditional_lookahead: cli.lookahead,
        },
        predefined: cli.define.clone(),
    };

    let ok = if let Some(path) = &cli.batch {
        run_batch(path, &cli, &options)?
    } else if let Some(expression) = &cli.expression {
        run_expression(expression, &cli, &options)
    } else {
        run_prompt(&cli, &options)?;
        true
    };

    if !ok {
        process::exit(1);
    }
    Ok(())
}

/// Checks a single expression and prints the result. Returns `false` if it was rejected.
fn run_expression(expression: &str, cli: &Cli, options: &CheckOptions) -> bool {
    let source = Source::new(expression).with_hex_mode(cli.hex);

    if cli.tokens {
        // tokenize errors are reported by `check` below
        if let Ok(tokens) = tokens(source) {
            for token in &tokens {
                println!("{:>4}  {:<10} {}", token.position, token.kind, token.text);
            }
        }
    }

    match check(source, options) {
        Ok(report) => {
            println!("{}", style(report.canonical()).green());
            println!("{:#?}", report.nodes);
            report_unresolved(&report, None, cli.strict)
        }
        Err(err) => {
            print_error(&source, &err);
            false
        }
    }
}

fn run_batch(path: &Path, cli: &Cli, options: &CheckOptions) -> Result<bool> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    let batch = check_batch(&text, cli.hex, options);

    let mut ok = batch.errors.has_no_errors();
    for (line, report) in &batch.reports {
        ok &= report_unresolved(report, Some(*line), cli.strict);
    }

    eprint!("{}", batch.errors);
    println!(
        "{} expression(s) checked, {} error(s)",
        batch.checked(),
        batch.errors.error_count()
    );
    Ok(ok)
}

fn run_prompt(cli: &Cli, options: &CheckOptions) -> Result<()> {
    let mut stdout = io::stdout();
    let stdin = io::stdin();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break; // EOF
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        run_expression(input, cli, options);
    }
    Ok(())
}

/// Prints every unresolved reference of `report`. Returns `false` if that fails a strict run.
fn report_unresolved(report: &Report, line: Option<usize>, strict: bool) -> bool {
    let label = if strict {
        style("error:").red().bold()
    } else {
        style("warning:").yellow().bold()
    };

    for var in &report.unresolved {
        match line {
            Some(line) => eprintln!("{} line {}: {}", label, line, var),
            None => eprintln!("{} {}", label, var),
        }
    }
    !(strict && !report.is_clean())
}

fn print_error(source: &Source<'_>, err: &Error) {
    eprintln!("{} {}", style("error:").red().bold(), err);
    if let Some(position) = err.position() {
        eprintln!("{}", source.excerpt(position));
    }
}
