//! Parsing of command-line values into query parts.

use std::path::{Path, PathBuf};

use quarry_core::{DatabaseConfig, Direction, SqlValue};

use crate::error::{CliError, Result};

/// An equality filter from `--where column=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column to compare.
    pub column: String,
    /// Value the column must equal.
    pub value: SqlValue,
}

/// Parses a bare command-line value.
///
/// `null`, `true` and `false` are recognized case-insensitively, integers and
/// floats become numbers, a single-quoted value is always text and anything
/// else is text as written.
#[must_use]
pub fn parse_value(raw: &str) -> SqlValue {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return SqlValue::Text(trimmed[1..trimmed.len() - 1].replace("''", "'"));
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "null" => return SqlValue::Null,
        "true" => return SqlValue::Bool(true),
        "false" => return SqlValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return SqlValue::Int(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return SqlValue::Float(f);
        }
    }
    SqlValue::Text(String::from(raw))
}

/// Parses `column=value`. Only the first `=` separates the two.
///
/// # Errors
///
/// Returns [`CliError::InvalidFilter`] when there is no `=` or no column.
pub fn parse_filter(raw: &str) -> Result<Filter> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidFilter(String::from(raw)))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::InvalidFilter(String::from(raw)));
    }
    Ok(Filter {
        column: String::from(column),
        value: parse_value(value),
    })
}

/// Parses `column`, `column:asc` or `column:desc`.
///
/// # Errors
///
/// Returns [`CliError::InvalidOrder`] for an empty column or another suffix.
pub fn parse_order(raw: &str) -> Result<(String, Direction)> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, dir)) if dir.eq_ignore_ascii_case("asc") => (column, Direction::Asc),
        Some((column, dir)) if dir.eq_ignore_ascii_case("desc") => (column, Direction::Desc),
        Some(_) => return Err(CliError::InvalidOrder(String::from(raw))),
        None => (raw, Direction::Asc),
    };
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::InvalidOrder(String::from(raw)));
    }
    Ok((String::from(column), direction))
}

/// Loads the database configuration, or the in-memory default without a path.
///
/// # Errors
///
/// Returns a [`CliError::Query`] when the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<DatabaseConfig> {
    match path {
        Some(path) => Ok(DatabaseConfig::from_path(path)?),
        None => Ok(DatabaseConfig::default()),
    }
}

/// Reads a script from `path`, or from stdin when there is none.
///
/// # Errors
///
/// Returns [`CliError::Read`] for an unreadable file and [`CliError::Io`] for
/// a stdin failure.
pub fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        }),
        None => Ok(std::io::read_to_string(std::io::stdin())?),
    }
}
