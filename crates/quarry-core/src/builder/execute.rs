//! Terminal operations: compile the accumulated descriptor and run it.

use super::QueryBuilder;
use crate::connection::{Connection, InsertId, QueryResult, Row};
use crate::descriptor::{Boolean, Operator, Predicate};
use crate::error::Result;
use crate::grammar::{AggregateFunction, CompiledQuery, QueryKind};
use crate::value::{SqlValue, ToSqlValue};

/// Turns `(column, value)` pairs into owned assignments.
fn assignments<I, K, V>(values: I) -> Vec<(String, SqlValue)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToSqlValue,
{
    values
        .into_iter()
        .map(|(column, value)| (column.into(), value.to_sql_value()))
        .collect()
}

impl<C: Connection + ?Sized> QueryBuilder<'_, C> {
    fn run(&mut self, compiled: &CompiledQuery) -> Result<QueryResult> {
        tracing::trace!(
            grammar = %self.grammar,
            sql = %compiled.sql,
            bindings = compiled.bindings.len(),
            "executing query"
        );
        self.connection.execute(&compiled.sql, &compiled.bindings)
    }

    fn execute_kind(&mut self, kind: &QueryKind) -> Result<QueryResult> {
        let compiled = self.compile(kind)?;
        self.run(&compiled)
    }

    /// Runs the SELECT and returns every row.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid chain, or whatever the
    /// connection reports.
    pub fn get(&mut self) -> Result<Vec<Row>> {
        Ok(self.execute_kind(&QueryKind::Select)?.rows)
    }

    /// Runs the SELECT limited to one row and returns it.
    ///
    /// The builder's own limit is left untouched.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn first(&mut self) -> Result<Option<Row>> {
        self.validate()?;
        let mut descriptor = self.descriptor.clone();
        descriptor.limit = Some(1);
        let compiled = self.grammar.compile_select(&descriptor);
        Ok(self.run(&compiled)?.rows.into_iter().next())
    }

    /// Looks a row up by its `id` column.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn find<T: ToSqlValue>(&mut self, id: T) -> Result<Option<Row>> {
        self.find_by("id", id)
    }

    /// Looks a row up by an arbitrary key column.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn find_by<T: ToSqlValue>(&mut self, key: &str, id: T) -> Result<Option<Row>> {
        self.validate()?;
        let mut descriptor = self.descriptor.clone();
        descriptor.predicates.push(Predicate::Basic {
            column: String::from(key),
            operator: Operator::Eq,
            value: id.to_sql_value(),
            boolean: Boolean::And,
        });
        descriptor.limit = Some(1);
        let compiled = self.grammar.compile_select(&descriptor);
        Ok(self.run(&compiled)?.rows.into_iter().next())
    }

    fn aggregate(&mut self, kind: &QueryKind) -> Result<SqlValue> {
        let result = self.execute_kind(kind)?;
        Ok(result
            .rows
            .into_iter()
            .next()
            .and_then(|mut row| row.remove(AggregateFunction::ALIAS))
            .unwrap_or(SqlValue::Null))
    }

    /// Counts the rows matching the WHERE predicates.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn count(&mut self) -> Result<i64> {
        let value = self.aggregate(&QueryKind::Count)?;
        Ok(match value {
            SqlValue::Int(n) => n,
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Float(f) => f as i64,
            SqlValue::Text(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    /// Returns whether any row matches the WHERE predicates.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn exists(&mut self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// `SUM(column)` over the matching rows; `Null` when nothing matches.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn sum(&mut self, column: &str) -> Result<SqlValue> {
        self.aggregate(&QueryKind::Aggregate(AggregateFunction::Sum, String::from(column)))
    }

    /// `AVG(column)` over the matching rows.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn avg(&mut self, column: &str) -> Result<SqlValue> {
        self.aggregate(&QueryKind::Aggregate(AggregateFunction::Avg, String::from(column)))
    }

    /// `MIN(column)` over the matching rows.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn min(&mut self, column: &str) -> Result<SqlValue> {
        self.aggregate(&QueryKind::Aggregate(AggregateFunction::Min, String::from(column)))
    }

    /// `MAX(column)` over the matching rows.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn max(&mut self, column: &str) -> Result<SqlValue> {
        self.aggregate(&QueryKind::Aggregate(AggregateFunction::Max, String::from(column)))
    }

    /// Inserts one row. Returns whether the connection reported success.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn insert<I, K, V>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        let result = self.execute_kind(&QueryKind::Insert(assignments(values)))?;
        Ok(result.affected_rows > 0 || result.last_insert_id.is_some())
    }

    /// Inserts one row and returns the generated identifier.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn insert_get_id<I, K, V>(&mut self, values: I) -> Result<InsertId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        let result = self.execute_kind(&QueryKind::Insert(assignments(values)))?;
        Ok(match result.last_insert_id {
            Some(id) => id,
            None => self.connection.last_insert_id(),
        })
    }

    /// Updates the matching rows and returns how many were changed.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn update<I, K, V>(&mut self, values: I) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        Ok(self
            .execute_kind(&QueryKind::Update(assignments(values)))?
            .affected_rows)
    }

    /// Deletes the matching rows. Matching nothing is still a success.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn delete(&mut self) -> Result<bool> {
        self.execute_kind(&QueryKind::Delete)?;
        Ok(true)
    }

    /// Creates the builder's table using the dialect's DDL.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn create_table(&mut self) -> Result<QueryResult> {
        self.execute_kind(&QueryKind::CreateTable)
    }

    /// Drops the builder's table.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn drop_table(&mut self) -> Result<QueryResult> {
        self.execute_kind(&QueryKind::DropTable)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConnectionConfig;
    use crate::connection::{Connection, InsertId, QueryResult, Row};
    use crate::error::Result;
    use crate::grammar::Grammar;
    use crate::value::SqlValue;

    /// Replies to every statement with a canned result.
    struct Canned {
        reply: QueryResult,
        seen: Vec<(String, Vec<SqlValue>)>,
    }

    impl Canned {
        fn new(reply: QueryResult) -> Self {
            Self { reply, seen: vec![] }
        }
    }

    impl Connection for Canned {
        fn connect(&mut self, _config: &ConnectionConfig) -> Result<()> {
            Ok(())
        }

        fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<QueryResult> {
            self.seen.push((String::from(sql), bindings.to_vec()));
            Ok(self.reply.clone())
        }

        fn fetch_rows(&self) -> Vec<Row> {
            self.reply.rows.clone()
        }

        fn last_insert_id(&self) -> InsertId {
            InsertId::Int(42)
        }

        fn grammar(&self) -> Grammar {
            Grammar::Generic
        }
    }

    fn row(pairs: &[(&str, SqlValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (String::from(*k), v.clone()))
            .collect()
    }

    #[test]
    fn test_first_does_not_mutate_limit() {
        let mut conn = Canned::new(QueryResult::with_rows(vec![
            row(&[("id", SqlValue::Int(1))]),
            row(&[("id", SqlValue::Int(2))]),
        ]));
        let mut builder = conn.table("users");
        let first = builder.first().unwrap().unwrap();
        assert_eq!(first["id"], SqlValue::Int(1));
        assert_eq!(builder.descriptor().limit, None);
        drop(builder);
        assert_eq!(conn.seen[0].0, "SELECT * FROM users LIMIT 1");
    }

    #[test]
    fn test_first_empty_is_none() {
        let mut conn = Canned::new(QueryResult::default());
        assert!(conn.table("users").first().unwrap().is_none());
    }

    #[test]
    fn test_find_uses_primary_key() {
        let mut conn = Canned::new(QueryResult::default());
        conn.table("users").where_("active", true).find(7).unwrap();
        assert_eq!(
            conn.seen[0].0,
            "SELECT * FROM users WHERE active = ? AND id = ? LIMIT 1"
        );
        assert_eq!(conn.seen[0].1, vec![SqlValue::Bool(true), SqlValue::Int(7)]);
    }

    #[test]
    fn test_count_reads_aggregate_column() {
        let mut conn = Canned::new(QueryResult::with_rows(vec![row(&[(
            "aggregate",
            SqlValue::Int(3),
        )])]));
        assert_eq!(conn.table("users").count().unwrap(), 3);
        assert!(conn.table("users").exists().unwrap());
        assert_eq!(conn.seen[0].0, "SELECT COUNT(*) AS aggregate FROM users");
    }

    #[test]
    fn test_count_without_rows_is_zero() {
        let mut conn = Canned::new(QueryResult::default());
        assert_eq!(conn.table("users").count().unwrap(), 0);
        assert!(!conn.table("users").exists().unwrap());
    }

    #[test]
    fn test_sum_returns_null_when_empty() {
        let mut conn = Canned::new(QueryResult::default());
        assert_eq!(conn.table("users").sum("age").unwrap(), SqlValue::Null);
    }

    #[test]
    fn test_insert_get_id_falls_back_to_connection() {
        let mut conn = Canned::new(QueryResult::affected(1));
        let id = conn
            .table("users")
            .insert_get_id([("name", "Budi")])
            .unwrap();
        assert_eq!(id, InsertId::Int(42));
    }

    #[test]
    fn test_update_reports_affected() {
        let mut conn = Canned::new(QueryResult::affected(2));
        let affected = conn
            .table("users")
            .where_("name", "Budi")
            .update([("email", "new@x.id")])
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(
            conn.seen[0].1,
            vec![
                SqlValue::Text(String::from("new@x.id")),
                SqlValue::Text(String::from("Budi"))
            ]
        );
    }

    #[test]
    fn test_delete_without_matches_succeeds() {
        let mut conn = Canned::new(QueryResult::affected(0));
        assert!(conn.table("users").where_("id", 99).delete().unwrap());
    }
}
