//! Canonical source printing for the AST.
//!
//! The printed text re-parses to an equal AST. Every number is printed with a `0x` prefix,
//! which reads the same with and without hex mode.

use crate::ast::{
    BitwiseOp, Builtin, CompareOp, Condition, DataType, ExprNode, LogicalOp, Operand, CURRENT,
};
use std::fmt;

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[ExprNode]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

/// Renders top-level nodes separated by spaces.
pub fn to_source(nodes: &[ExprNode]) -> String {
    struct Program<'a>(&'a [ExprNode]);

    impl fmt::Display for Program<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_list(f, self.0)
        }
    }

    Program(nodes).to_string()
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Offset(value) if *value < 0 => write!(f, "-0x{:x}", value.unsigned_abs()),
            ExprNode::Offset(value) => write!(f, "+0x{:x}", value),
            ExprNode::Deref { data_type, depth } => {
                write!(f, "{}{}", "*".repeat(*depth), data_type)
            }
            ExprNode::VarDef { name, body } => {
                write!(f, "{}: ", name)?;
                write_list(f, body)
            }
            ExprNode::VarRef(name) if name == CURRENT => f.write_str(CURRENT),
            ExprNode::VarRef(name) => write!(f, "${}", name),
            ExprNode::Builtin(builtin) => write!(f, "{}", builtin),
            ExprNode::Conditional {
                condition,
                true_branch,
                false_branch,
            } => {
                write!(f, "{} ? ", condition)?;
                write_list(f, true_branch)?;
                f.write_str(" : ")?;
                write_list(f, false_branch)
            }
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Skip => f.write_str("@skip"),
            Builtin::Null => f.write_str("@null"),
            Builtin::Stop => f.write_str("@stop"),
            Builtin::ArrayAccess {
                index,
                element_size: Some(size),
            } => write!(f, "@[{}, 0x{:x}]", index, *size as u64),
            Builtin::ArrayAccess {
                index,
                element_size: None,
            } => write!(f, "@[{}]", index),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Current => f.write_str(CURRENT),
            Operand::Variable(name) => write!(f, "${}", name),
            Operand::Constant(value) => write!(f, "0x{:x}", *value as u64),
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        })
    }
}

impl fmt::Display for BitwiseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BitwiseOp::And => "&",
            BitwiseOp::Or => "|",
            BitwiseOp::Xor => "^",
        })
    }
}

impl Condition {
    /// Binding strength, higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Condition::Logical {
                op: LogicalOp::Or, ..
            } => 1,
            Condition::Logical {
                op: LogicalOp::And,
                ..
            } => 2,
            Condition::Not(_) => 3,
            Condition::Compare { .. } | Condition::Bitwise { .. } => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Logical { lhs, op, rhs } => {
                // logical operators are left associative
                lhs.fmt_operand(f, lhs.precedence() < self.precedence())?;
                write!(f, " {} ", op)?;
                rhs.fmt_operand(f, rhs.precedence() <= self.precedence())
            }
            Condition::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_operand(f, inner.precedence() < self.precedence())
            }
            Condition::Compare { lhs, op, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Condition::Bitwise { lhs, op, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
        }
    }
}
