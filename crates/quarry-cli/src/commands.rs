//! The work behind each subcommand, writing to any [`Write`] sink.

use std::io::Write;

use serde::Serialize;

use quarry_core::{
    interpolate_bindings, CompiledQuery, Connection, DatabaseConfig, Direction, Grammar,
    SqlValue,
};
use quarry_memory::{split_statements, MemoryConnection, Store};

use crate::error::{CliError, Result};
use crate::input::Filter;

/// Options for `quarry compile`.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Table to select from.
    pub table: String,
    /// Equality filters, joined with AND.
    pub filters: Vec<Filter>,
    /// Orderings in application order.
    pub orders: Vec<(String, Direction)>,
    /// Maximum number of rows.
    pub limit: Option<i64>,
}

/// The printed form of a compiled query.
#[derive(Debug, Serialize)]
pub struct CompiledOutput {
    /// SQL text.
    pub sql: String,
    /// Placeholder values in order.
    pub bindings: Vec<SqlValue>,
}

/// Counts reported after running a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Statements sent to the connection.
    pub statements: usize,
    /// Rows printed.
    pub rows: usize,
    /// Rows inserted, updated or deleted.
    pub affected: u64,
}

/// Runs every `;`-separated statement of `script`, printing each returned
/// row as one JSON line.
///
/// # Errors
///
/// Stops at the first statement the connection rejects, reporting its
/// one-based position.
pub fn run_script(
    connection: &mut dyn Connection,
    script: &str,
    out: &mut impl Write,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    for (index, statement) in split_statements(script).into_iter().enumerate() {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        tracing::debug!(index = index + 1, sql = statement, "running statement");
        let result = connection
            .execute(statement, &[])
            .map_err(|source| CliError::Statement {
                index: index + 1,
                source,
            })?;
        for row in &result.rows {
            writeln!(out, "{}", serde_json::to_string(row)?)?;
        }
        summary.statements += 1;
        summary.rows += result.rows.len();
        summary.affected += result.affected_rows;
    }
    Ok(summary)
}

/// Builds a SELECT with `options` and compiles it for `grammar`.
///
/// With `inline`, bindings are rendered into the text and the returned
/// binding list is empty.
///
/// # Errors
///
/// Returns the builder's error for invalid options such as a negative limit.
pub fn compile_select(
    grammar: Grammar,
    options: &SelectOptions,
    inline: bool,
) -> Result<CompiledOutput> {
    let mut scratch = MemoryConnection::with_store(Store::new()).with_grammar(grammar);
    let mut builder = scratch.table(&options.table);
    for filter in &options.filters {
        builder = builder.where_(&filter.column, filter.value.clone());
    }
    for (column, direction) in &options.orders {
        builder = builder.order_by(column, *direction);
    }
    if let Some(limit) = options.limit {
        builder = builder.limit(limit);
    }

    let CompiledQuery { sql, bindings } = builder.to_sql()?;
    if inline && !bindings.is_empty() {
        return Ok(CompiledOutput {
            sql: interpolate_bindings(&sql, &bindings, grammar),
            bindings: vec![],
        });
    }
    Ok(CompiledOutput { sql, bindings })
}

/// Writes one line per configured connection: name, driver and grammar, with
/// the default marked by `*`.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the sink fails.
pub fn list_connections(config: &DatabaseConfig, out: &mut impl Write) -> Result<()> {
    for (name, connection) in &config.connections {
        let marker = if *name == config.default { "*" } else { " " };
        let grammar = connection.grammar.as_deref().unwrap_or("generic");
        writeln!(out, "{marker} {name}\t{}\t{grammar}", connection.driver)?;
    }
    Ok(())
}
