//! Front end for pointer-path expressions: tokenize, parse and check in one call.

pub use ptrpath_parser::ast;
pub use ptrpath_parser::lexer::{Token, TokenKind};
pub use ptrpath_parser::parser::{ParserConfig, DEFAULT_CONDITIONAL_LOOKAHEAD};
pub use ptrpath_passes::resolve::UnresolvedVariable;
pub use ptrpath_source::{Error, ErrorReporter, ParseError, Source, TokenizeError};

use ast::ExprNode;
use log::debug;
use ptrpath_parser::{parse, parse_with_config, printer, tokenize};
use ptrpath_passes::resolve::Resolver;

/// Tokenizes `source`, honoring its hex mode.
pub fn tokens(source: Source<'_>) -> Result<Vec<Token>, TokenizeError> {
    tokenize(source.content, source.hex_mode)
}

/// Tokenizes and parses `input` with the default parser configuration.
pub fn parse_str(input: &str, hex_mode: bool) -> Result<Vec<ExprNode>, Error> {
    let tokens = tokenize(input, hex_mode)?;
    Ok(parse(&tokens)?)
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub parser: ParserConfig,
    /// Variables bound by the evaluator before the expression runs.
    pub predefined: Vec<String>,
}

/// An accepted expression together with its unresolved variable references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub nodes: Vec<ExprNode>,
    pub unresolved: Vec<UnresolvedVariable>,
}

impl Report {
    /// Returns `true` if every variable reference resolves.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// The expression in canonical form.
    pub fn canonical(&self) -> String {
        printer::to_source(&self.nodes)
    }
}

/// Tokenizes, parses and resolves `source`.
/// Unresolved variables do not make the check fail; they are listed in the [`Report`].
pub fn check(source: Source<'_>, options: &CheckOptions) -> Result<Report, Error> {
    let tokens = tokens(source)?;
    let nodes = parse_with_config(&tokens, options.parser)?;

    let mut resolver = Resolver::with_predefined(options.predefined.iter().cloned());
    resolver.resolve_program(&nodes);

    Ok(Report {
        nodes,
        unresolved: resolver.into_unresolved(),
    })
}

/// Result of checking every expression of a batch.
pub struct BatchReport {
    /// `(line, report)` for every accepted expression. Lines are 1-based.
    pub reports: Vec<(usize, Report)>,
    /// Every rejected expression.
    pub errors: ErrorReporter,
}

impl BatchReport {
    /// Number of expressions checked, accepted or not.
    pub fn checked(&self) -> usize {
        self.reports.len() + self.errors.error_count()
    }
}

/// Checks every line of `text` as its own expression.
/// Blank lines and lines starting with `#` are skipped. Definitions do not carry over between lines.
pub fn check_batch(text: &str, hex_mode: bool, options: &CheckOptions) -> BatchReport {
    let errors = ErrorReporter::new();
    let mut reports = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // positions count from the start of the line
        let source = Source::new(line).with_hex_mode(hex_mode);
        match check(source, options) {
            Ok(report) => reports.push((index + 1, report)),
            Err(err) => errors.add_error(index + 1, err),
        }
    }

    debug!(
        "batch: {} accepted, {} rejected",
        reports.len(),
        errors.error_count()
    );
    BatchReport { reports, errors }
}
