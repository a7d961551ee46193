//! Parsed statements understood by the interpreter.

use quarry_core::{AggregateFunction, SqlValue};

/// A value position in a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal written in the text.
    Value(SqlValue),
    /// The n-th `?` of the statement, counted from zero in text order.
    Placeholder(usize),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A boolean condition over one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
    Compare {
        column: String,
        op: CompareOp,
        value: Operand,
    },
    Like {
        column: String,
        pattern: Operand,
        negated: bool,
    },
    IsNull {
        column: String,
        negated: bool,
    },
    In {
        column: String,
        values: Vec<Operand>,
        negated: bool,
    },
    Between {
        column: String,
        low: Operand,
        high: Operand,
        negated: bool,
    },
}

/// One item of a SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*` or `table.*`
    All,
    /// A column, optionally renamed.
    Column { name: String, alias: Option<String> },
    /// An aggregate call; `argument` is `None` for `*`.
    Aggregate {
        function: AggregateFunction,
        argument: Option<String>,
        alias: Option<String>,
    },
}

impl Projection {
    /// Key under which the item appears in a result row.
    #[must_use]
    pub fn output_name(&self) -> String {
        match self {
            Self::All => String::from("*"),
            Self::Column { name, alias } => alias.clone().unwrap_or_else(|| name.clone()),
            Self::Aggregate {
                function,
                argument,
                alias,
            } => alias.clone().unwrap_or_else(|| {
                format!("{}({})", function.as_str(), argument.as_deref().unwrap_or("*"))
            }),
        }
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub distinct: bool,
    pub projection: Vec<Projection>,
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderKey>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    /// One entry per `VALUES` tuple, each as long as `columns`.
    pub rows: Vec<Vec<Operand>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<(String, Operand)>,
    pub filter: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub filter: Option<Condition>,
}

/// A classified statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable { table: String },
    DropTable { table: String },
    /// A recognized statement using a clause the interpreter cannot run.
    Unsupported { clause: &'static str },
    /// Text not starting with a statement keyword the interpreter handles.
    Other,
}

impl Statement {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::CreateTable { .. } => "create",
            Self::DropTable { .. } => "drop",
            Self::Unsupported { .. } => "unsupported",
            Self::Other => "other",
        }
    }
}
