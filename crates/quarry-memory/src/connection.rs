//! The in-memory [`Connection`].

use quarry_core::{
    Connection, ConnectionConfig, Grammar, InsertId, QueryError, QueryResult, Result, Row,
    SqlValue,
};

use crate::ast::Statement;
use crate::executor;
use crate::parser::parse;
use crate::store::Store;

/// Driver name under which [`MemoryConnection`] registers.
pub const DRIVER: &str = "inmemory";

/// A connection that interprets SQL text against a [`Store`].
///
/// Statements the interpreter cannot parse, or that use clauses it does not
/// run (joins, grouping), are no-ops returning an empty result unless the
/// connection is strict.
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    store: Store,
    grammar: Grammar,
    strict: bool,
    last_rows: Vec<Row>,
    last_id: InsertId,
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnection {
    /// Creates a connection over the process-wide store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Store::global())
    }

    /// Creates a connection over `store`.
    #[must_use]
    pub fn with_store(store: Store) -> Self {
        Self {
            store,
            grammar: Grammar::Generic,
            strict: false,
            last_rows: vec![],
            last_id: InsertId::default(),
        }
    }

    /// Sets the grammar builders compile to. Every grammar is understood.
    #[must_use]
    pub const fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Reports unparseable and unsupported statements as errors.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The store this connection reads and writes.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    fn classify(&self, sql: &str) -> Result<Statement> {
        match parse(sql) {
            Ok(Statement::Unsupported { clause }) if self.strict => Err(QueryError::Execution(
                format!("the in-memory interpreter does not support {clause}"),
            )),
            Ok(statement) => Ok(statement),
            Err(err) if self.strict => Err(err.into()),
            Err(err) => {
                tracing::debug!(error = %err, sql, "ignoring unparseable statement");
                Ok(Statement::Other)
            }
        }
    }
}

impl Connection for MemoryConnection {
    fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        if let Some(grammar) = &config.grammar {
            self.grammar = grammar
                .parse()
                .map_err(|_| QueryError::connection(format!("unknown grammar '{grammar}'")))?;
        }
        self.strict = config.strict;
        Ok(())
    }

    fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<QueryResult> {
        let statement = self.classify(sql)?;
        let result = executor::execute(&self.store, &statement, bindings);
        tracing::debug!(
            kind = statement.kind(),
            rows = result.rows.len(),
            affected = result.affected_rows,
            "executed in-memory statement"
        );

        self.last_rows.clone_from(&result.rows);
        if let Some(id) = &result.last_insert_id {
            self.last_id = id.clone();
        }
        Ok(result)
    }

    fn fetch_rows(&self) -> Vec<Row> {
        self.last_rows.clone()
    }

    fn last_insert_id(&self) -> InsertId {
        self.last_id.clone()
    }

    fn grammar(&self) -> Grammar {
        self.grammar
    }
}
