//! The backend capability consumed by [`QueryBuilder`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::QueryBuilder;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::value::SqlValue;

/// One result row: column name to value.
pub type Row = BTreeMap<String, SqlValue>;

/// Identifier generated by the most recent INSERT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertId {
    /// Numeric identifier.
    Int(i64),
    /// Textual identifier (UUIDs, engine-assigned keys).
    Text(String),
}

impl Default for InsertId {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl fmt::Display for InsertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryResult {
    /// Rows produced by a query; empty for statements.
    pub rows: Vec<Row>,
    /// Rows inserted, mutated or removed.
    pub affected_rows: u64,
    /// Identifier generated by an INSERT.
    pub last_insert_id: Option<InsertId>,
}

impl QueryResult {
    /// A result carrying only rows.
    #[must_use]
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// A result carrying only an affected count.
    #[must_use]
    pub fn affected(count: u64) -> Self {
        Self {
            affected_rows: count,
            ..Self::default()
        }
    }
}

/// A database connection that executes opaque SQL text.
///
/// Implementations decide how to run the text; the [`Grammar`] they report is
/// the dialect a [`QueryBuilder`] compiles to for them.
pub trait Connection {
    /// Applies a connection configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Connection`] when the configuration is malformed.
    fn connect(&mut self, config: &ConnectionConfig) -> Result<()>;

    /// Executes `sql` with positional `bindings`.
    ///
    /// # Errors
    ///
    /// Backend-specific; see the implementation.
    fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<QueryResult>;

    /// Returns the rows produced by the most recent [`Self::execute`].
    fn fetch_rows(&self) -> Vec<Row>;

    /// Returns the identifier generated by the most recent INSERT.
    fn last_insert_id(&self) -> InsertId;

    /// Returns the dialect this connection expects.
    fn grammar(&self) -> Grammar;

    /// Starts a query against `table`.
    fn table(&mut self, table: &str) -> QueryBuilder<'_, Self>
    where
        Self: Sized,
    {
        QueryBuilder::new(self).table(table)
    }
}

impl<'a> dyn Connection + 'a {
    /// Starts a query against `table` on a type-erased connection.
    pub fn table(&mut self, table: &str) -> QueryBuilder<'_, dyn Connection + 'a> {
        QueryBuilder::new(self).table(table)
    }
}
