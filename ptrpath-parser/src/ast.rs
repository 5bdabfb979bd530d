/// Name bound to the implicit "value at the current chain position".
pub const CURRENT: &str = "_";

/// Primitive width read by a dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::U8,
        DataType::U16,
        DataType::U32,
        DataType::U64,
        DataType::I8,
        DataType::I16,
        DataType::I32,
        DataType::I64,
    ];

    /// Looks up a data type by its code (e.g. `"u32"`). Codes are case sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|data_type| data_type.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
        }
    }

    /// Width in bytes.
    pub fn size(self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 => 4,
            DataType::U64 | DataType::I64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64
        )
    }
}

/// One step of a pointer-path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    /// A signed byte displacement (e.g. `+8`, `-0x10`).
    Offset(i64),
    /// `depth` successive dereferences of `data_type` (e.g. `**u32`). `depth` is at least `1`.
    Deref { data_type: DataType, depth: usize },
    /// Binds `name` to a sub-chain (e.g. `base: 0x10 *u64`).
    /// `body` is never empty and never contains a `VarDef` or a `Conditional`.
    VarDef { name: String, body: Vec<ExprNode> },
    /// A reference to a bound variable (e.g. `$base`), or [`CURRENT`] for a lone `_`.
    VarRef(String),
    Builtin(Builtin),
    /// `condition ? true_branch : false_branch`. Both branches are non-empty and restricted like a `VarDef` body.
    Conditional {
        condition: Condition,
        true_branch: Vec<ExprNode>,
        false_branch: Vec<ExprNode>,
    },
}

/// Built-in operations introduced with `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Builtin {
    Skip,
    Null,
    Stop,
    /// `@[index]` or `@[index, element_size]`.
    ArrayAccess {
        index: Operand,
        element_size: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `lhs && rhs` or `lhs || rhs`.
    Logical {
        lhs: Box<Condition>,
        op: LogicalOp,
        rhs: Box<Condition>,
    },
    /// `!inner`.
    Not(Box<Condition>),
    /// A comparison (e.g. `_ == 1`).
    Compare {
        lhs: Operand,
        op: CompareOp,
        rhs: Operand,
    },
    /// A bitwise test (e.g. `$flags & 0x4`).
    Bitwise {
        lhs: Operand,
        op: BitwiseOp,
        rhs: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// Leaf value inside conditions and array indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `_`
    Current,
    /// `$name`
    Variable(String),
    Constant(i64),
}
