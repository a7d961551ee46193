//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates a [`QueryDescriptor`] through chained calls
//! and only touches its connection in a terminal operation (`get`, `first`,
//! `insert`, ...). Text generation is delegated to the connection's
//! [`Grammar`], so the same chain runs unchanged on every dialect.
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_core::{Connection, Operator};
//!
//! let adults = conn
//!     .table("users")
//!     .where_op("age", Operator::GtEq, 18)
//!     .or_where("role", "admin")
//!     .order_by_desc("age")
//!     .limit(10)
//!     .get()?;
//! ```
//!
//! Chained calls never fail. Invalid input (a negative limit, an empty
//! projection) is recorded and reported by the next terminal operation.

mod execute;

use crate::connection::Connection;
use crate::descriptor::{Boolean, Direction, Join, JoinKind, Operator, Ordering, Predicate, QueryDescriptor};
use crate::error::{QueryError, Result};
use crate::grammar::{CompiledQuery, Grammar, QueryKind};
use crate::value::{SqlValue, ToSqlValue};

/// A fluent builder bound to one connection.
pub struct QueryBuilder<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    grammar: Grammar,
    descriptor: QueryDescriptor,
    /// First invalid input seen by a chained call.
    error: Option<String>,
}

impl<'c, C: Connection + ?Sized> QueryBuilder<'c, C> {
    /// Creates a builder using the connection's grammar.
    pub fn new(connection: &'c mut C) -> Self {
        let grammar = connection.grammar();
        Self {
            connection,
            grammar,
            descriptor: QueryDescriptor::default(),
            error: None,
        }
    }

    /// Overrides the grammar reported by the connection.
    #[must_use]
    pub const fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Returns the grammar used for compilation.
    #[must_use]
    pub const fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Returns the descriptor accumulated so far.
    #[must_use]
    pub const fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    /// Sets the target table.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.descriptor.table = String::from(table);
        self
    }

    /// Replaces the projection list.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            self.fail(String::from("select() requires at least one column"));
        }
        self.descriptor.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Selects distinct rows.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.descriptor.distinct = true;
        self
    }

    fn push_basic(mut self, column: &str, operator: Operator, value: SqlValue, boolean: Boolean) -> Self {
        self.descriptor.predicates.push(Predicate::Basic {
            column: String::from(column),
            operator,
            value,
            boolean,
        });
        self
    }

    /// Adds `column = value`, joined with AND.
    #[must_use]
    pub fn where_<T: ToSqlValue>(self, column: &str, value: T) -> Self {
        self.push_basic(column, Operator::Eq, value.to_sql_value(), Boolean::And)
    }

    /// Adds `column op value`, joined with AND.
    #[must_use]
    pub fn where_op<T: ToSqlValue>(self, column: &str, operator: Operator, value: T) -> Self {
        self.push_basic(column, operator, value.to_sql_value(), Boolean::And)
    }

    /// Adds `column = value`, joined with OR.
    #[must_use]
    pub fn or_where<T: ToSqlValue>(self, column: &str, value: T) -> Self {
        self.push_basic(column, Operator::Eq, value.to_sql_value(), Boolean::Or)
    }

    /// Adds `column op value`, joined with OR.
    #[must_use]
    pub fn or_where_op<T: ToSqlValue>(self, column: &str, operator: Operator, value: T) -> Self {
        self.push_basic(column, operator, value.to_sql_value(), Boolean::Or)
    }

    /// Adds `column IS NULL`.
    #[must_use]
    pub fn where_null(mut self, column: &str) -> Self {
        self.descriptor.predicates.push(Predicate::Null {
            column: String::from(column),
            boolean: Boolean::And,
        });
        self
    }

    /// Adds `column IS NULL`, joined with OR.
    #[must_use]
    pub fn or_where_null(mut self, column: &str) -> Self {
        self.descriptor.predicates.push(Predicate::Null {
            column: String::from(column),
            boolean: Boolean::Or,
        });
        self
    }

    /// Adds `column IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.descriptor.predicates.push(Predicate::NotNull {
            column: String::from(column),
            boolean: Boolean::And,
        });
        self
    }

    /// Adds `column IN (values)`. An empty list matches nothing.
    #[must_use]
    pub fn where_in<T: ToSqlValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.descriptor.predicates.push(Predicate::In {
            column: String::from(column),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            boolean: Boolean::And,
        });
        self
    }

    /// Adds `column IN (values)`, joined with OR.
    #[must_use]
    pub fn or_where_in<T: ToSqlValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.descriptor.predicates.push(Predicate::In {
            column: String::from(column),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            boolean: Boolean::Or,
        });
        self
    }

    /// Adds `column NOT IN (values)`.
    #[must_use]
    pub fn where_not_in<T: ToSqlValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.descriptor.predicates.push(Predicate::NotIn {
            column: String::from(column),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            boolean: Boolean::And,
        });
        self
    }

    /// Adds `column BETWEEN low AND high`.
    #[must_use]
    pub fn where_between<T: ToSqlValue, U: ToSqlValue>(mut self, column: &str, low: T, high: U) -> Self {
        self.descriptor.predicates.push(Predicate::Between {
            column: String::from(column),
            low: low.to_sql_value(),
            high: high.to_sql_value(),
            boolean: Boolean::And,
        });
        self
    }

    /// Adds `column NOT BETWEEN low AND high`.
    #[must_use]
    pub fn where_not_between<T: ToSqlValue, U: ToSqlValue>(
        mut self,
        column: &str,
        low: T,
        high: U,
    ) -> Self {
        self.descriptor.predicates.push(Predicate::NotBetween {
            column: String::from(column),
            low: low.to_sql_value(),
            high: high.to_sql_value(),
            boolean: Boolean::And,
        });
        self
    }

    /// Appends an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.descriptor.orderings.push(Ordering {
            column: String::from(column),
            direction,
        });
        self
    }

    /// Appends a descending ORDER BY entry.
    #[must_use]
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, Direction::Desc)
    }

    /// Sets LIMIT. Negative values are rejected at execution.
    #[must_use]
    pub fn limit(mut self, n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => self.descriptor.limit = Some(n),
            Err(_) => self.fail(format!("limit must be non-negative, got {n}")),
        }
        self
    }

    /// Sets OFFSET. Negative values are rejected at execution.
    #[must_use]
    pub fn offset(mut self, n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => self.descriptor.offset = Some(n),
            Err(_) => self.fail(format!("offset must be non-negative, got {n}")),
        }
        self
    }

    /// Sets GROUP BY columns.
    #[must_use]
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.descriptor.group_by = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds a HAVING predicate, joined with AND.
    #[must_use]
    pub fn having<T: ToSqlValue>(mut self, column: &str, operator: Operator, value: T) -> Self {
        self.descriptor.having.push(Predicate::Basic {
            column: String::from(column),
            operator,
            value: value.to_sql_value(),
            boolean: Boolean::And,
        });
        self
    }

    fn push_join(mut self, kind: JoinKind, table: &str, left: &str, operator: &str, right: &str) -> Self {
        self.descriptor.joins.push(Join {
            table: String::from(table),
            left: String::from(left),
            operator: String::from(operator),
            right: String::from(right),
            kind,
        });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn join(self, table: &str, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Inner, table, left, operator, right)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: &str, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Left, table, left, operator, right)
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(self, table: &str, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Right, table, left, operator, right)
    }

    /// Adds a CROSS JOIN.
    #[must_use]
    pub fn cross_join(mut self, table: &str) -> Self {
        self.descriptor.joins.push(Join::cross(table));
        self
    }

    /// Verifies the builder can produce a statement.
    fn validate(&self) -> Result<()> {
        if let Some(message) = &self.error {
            return Err(QueryError::configuration(message.clone()));
        }
        if self.descriptor.table.is_empty() {
            return Err(QueryError::configuration(
                "no table selected; call table() before executing",
            ));
        }
        Ok(())
    }

    /// Compiles the SELECT without executing it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Configuration`] if no table is set or a chained
    /// call received invalid input.
    pub fn to_sql(&self) -> Result<CompiledQuery> {
        self.compile(&QueryKind::Select)
    }

    /// Compiles any statement kind without executing it.
    ///
    /// # Errors
    ///
    /// See [`Self::to_sql`].
    pub fn compile(&self, kind: &QueryKind) -> Result<CompiledQuery> {
        self.validate()?;
        Ok(self.grammar.compile(&self.descriptor, kind))
    }
}
