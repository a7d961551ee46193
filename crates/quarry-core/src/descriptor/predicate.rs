//! WHERE/HAVING predicates.

use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::value::SqlValue;

/// How a predicate joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boolean {
    /// Logical AND (default).
    #[default]
    And,
    /// Logical OR.
    Or,
}

impl Boolean {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operator of a basic predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=` (also parsed from `<>`)
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl Operator {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            _ => Err(QueryError::configuration(format!("unknown operator '{s}'"))),
        }
    }
}

/// One condition of a WHERE or HAVING clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op value`
    Basic {
        /// Column name.
        column: String,
        /// Comparison operator.
        operator: Operator,
        /// Right-hand value.
        value: SqlValue,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column IS NULL`
    Null {
        /// Column name.
        column: String,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column IS NOT NULL`
    NotNull {
        /// Column name.
        column: String,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column IN (values)`
    In {
        /// Column name.
        column: String,
        /// Candidate values; may be empty.
        values: Vec<SqlValue>,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column NOT IN (values)`
    NotIn {
        /// Column name.
        column: String,
        /// Excluded values; may be empty.
        values: Vec<SqlValue>,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column BETWEEN low AND high`
    Between {
        /// Column name.
        column: String,
        /// Inclusive lower bound.
        low: SqlValue,
        /// Inclusive upper bound.
        high: SqlValue,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
    /// `column NOT BETWEEN low AND high`
    NotBetween {
        /// Column name.
        column: String,
        /// Inclusive lower bound.
        low: SqlValue,
        /// Inclusive upper bound.
        high: SqlValue,
        /// Conjunction with the previous predicate.
        boolean: Boolean,
    },
}

impl Predicate {
    /// Returns the column the predicate tests.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Basic { column, .. }
            | Self::Null { column, .. }
            | Self::NotNull { column, .. }
            | Self::In { column, .. }
            | Self::NotIn { column, .. }
            | Self::Between { column, .. }
            | Self::NotBetween { column, .. } => column,
        }
    }

    /// Returns the conjunction with the previous predicate.
    #[must_use]
    pub const fn boolean(&self) -> Boolean {
        match self {
            Self::Basic { boolean, .. }
            | Self::Null { boolean, .. }
            | Self::NotNull { boolean, .. }
            | Self::In { boolean, .. }
            | Self::NotIn { boolean, .. }
            | Self::Between { boolean, .. }
            | Self::NotBetween { boolean, .. } => *boolean,
        }
    }

    /// Returns the values this predicate contributes, in text order.
    #[must_use]
    pub fn values(&self) -> Vec<&SqlValue> {
        match self {
            Self::Basic { value, .. } => vec![value],
            Self::Null { .. } | Self::NotNull { .. } => vec![],
            Self::In { values, .. } | Self::NotIn { values, .. } => values.iter().collect(),
            Self::Between { low, high, .. } | Self::NotBetween { low, high, .. } => {
                vec![low, high]
            }
        }
    }
}
