use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use ptrpath::ast::{Builtin, CompareOp, Condition, DataType, ExprNode, Operand};
use ptrpath::{check, check_batch, parse_str, CheckOptions, Source};

fn ok(source: &str) -> Vec<ExprNode> {
    parse_str(source, false).unwrap()
}

fn err(source: &str) -> (String, Option<usize>) {
    let err = parse_str(source, false).unwrap_err();
    (err.message().to_string(), err.position())
}

fn ptrpath(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ptrpath"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn pointer_chain() {
    assert_eq!(
        ok("base: 0x10 + *u64 ptr: $base +8 **u32 $ptr -4 @[_, 8] @stop"),
        vec![
            ExprNode::VarDef {
                name: "base".to_string(),
                body: vec![
                    ExprNode::Offset(16),
                    ExprNode::Deref {
                        data_type: DataType::U64,
                        depth: 1
                    },
                ],
            },
            ExprNode::VarDef {
                name: "ptr".to_string(),
                body: vec![
                    ExprNode::VarRef("base".to_string()),
                    ExprNode::Offset(8),
                    ExprNode::Deref {
                        data_type: DataType::U32,
                        depth: 2
                    },
                    ExprNode::VarRef("ptr".to_string()),
                    ExprNode::Offset(-4),
                    ExprNode::Builtin(Builtin::ArrayAccess {
                        index: Operand::Current,
                        element_size: Some(8)
                    }),
                    ExprNode::Builtin(Builtin::Stop),
                ],
            },
        ]
    );
}

#[test]
fn conditional() {
    assert_eq!(
        ok("_ == 1 ? 4 : 8"),
        vec![ExprNode::Conditional {
            condition: Condition::Compare {
                lhs: Operand::Current,
                op: CompareOp::Eq,
                rhs: Operand::Constant(1),
            },
            true_branch: vec![ExprNode::Offset(4)],
            false_branch: vec![ExprNode::Offset(8)],
        }]
    );
}

#[test]
fn hex_mode() {
    assert_eq!(parse_str("10", true).unwrap(), parse_str("0x10", false).unwrap());
    assert_eq!(
        parse_str("*u32 +ff", true).unwrap(),
        vec![
            ExprNode::Deref {
                data_type: DataType::U32,
                depth: 1
            },
            ExprNode::Offset(255),
        ]
    );
}

#[test]
fn errors() {
    assert_eq!(err(""), ("empty expression".to_string(), None));
    assert_eq!(
        err("*bogus"),
        ("unknown data type 'bogus'".to_string(), Some(1))
    );
    assert_eq!(
        err("a: b: 4"),
        (
            "variable definition 'a' has an empty body".to_string(),
            Some(3)
        )
    );
    assert_eq!(
        err("8 # 4"),
        ("unrecognized character '#'".to_string(), Some(2))
    );
}

#[test]
fn check_reports_unresolved_variables() {
    let options = CheckOptions {
        predefined: vec!["module".to_string()],
        ..CheckOptions::default()
    };

    let report = check(Source::new("$module +0x10 *u64"), &options).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.canonical(), "$module +0x10 *u64");

    let report = check(Source::new("$module $other"), &options).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.unresolved[0].name, "other");
    assert_eq!(report.unresolved[0].node_index, 1);
}

#[test]
fn check_honors_hex_mode() {
    let report = check(
        Source::new("10 *u8").with_hex_mode(true),
        &CheckOptions::default(),
    )
    .unwrap();
    assert_eq!(report.nodes[0], ExprNode::Offset(16));
}

#[test]
fn batch() {
    let text = r#"
# comment
base: 0x10 *u64

  *bogus
ptr: $base +8 *u32 $missing
"#;
    let batch = check_batch(text, false, &CheckOptions::default());
    assert_eq!(batch.checked(), 3);
    assert_eq!(batch.errors.error_count(), 1);
    assert_eq!(
        batch.errors.to_string(),
        "ERROR: line 5: unknown data type 'bogus' at position 3\n"
    );

    let lines: Vec<usize> = batch.reports.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![3, 6]);
    assert!(batch.reports[0].1.is_clean());

    // every line is checked on its own, `base` is not bound on line 6
    let names: Vec<&str> = batch.reports[1]
        .1
        .unresolved
        .iter()
        .map(|var| var.name.as_str())
        .collect();
    assert_eq!(names, vec!["base", "missing"]);
}

#[test]
fn cli_single_expression() {
    let output = ptrpath(&["base: 16 + *u64"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("base: +0x10 *u64\n"));

    let output = ptrpath(&["*bogus"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown data type 'bogus' at position 1"));
}

#[test]
fn cli_strict() {
    assert!(ptrpath(&["$missing"]).status.success());
    assert!(!ptrpath(&["--strict", "$missing"]).status.success());
    assert!(ptrpath(&["--strict", "-D", "missing", "$missing"])
        .status
        .success());
}

#[test]
fn cli_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paths.txt");
    fs::write(&path, "base: 0x10 *u64\n*bogus\n").unwrap();

    let output = ptrpath(&["--batch", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 expression(s) checked, 1 error(s)"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: line 2: unknown data type 'bogus' at position 1"));
}

#[test]
fn cli_prompt() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ptrpath"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"8 *u32\n\n*bogus\n")
        .unwrap();

    // closing stdin ends the prompt
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("> +0x8 *u32\n"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown data type 'bogus'"));
}
