//! # quarry-memory
//!
//! An in-memory [`Connection`](quarry_core::Connection) that interprets the SQL
//! text produced by every [`Grammar`](quarry_core::Grammar) against a table
//! [`Store`].
//!
//! The interpreter understands `INSERT`, `SELECT`, `UPDATE`, `DELETE`,
//! `CREATE TABLE` and `DROP TABLE`, with `AND`/`OR`/`NOT` conditions, `IN`,
//! `BETWEEN`, `LIKE`, `IS NULL`, `ORDER BY`, `LIMIT`/`OFFSET`, `DISTINCT` and
//! aggregate projections. Joins and grouping are not executed.
//!
//! ```rust
//! use quarry_core::{Connection, Grammar};
//! use quarry_memory::{MemoryConnection, Store};
//!
//! let mut conn = MemoryConnection::with_store(Store::new()).with_grammar(Grammar::MySql);
//! conn.table("users").insert([("name", "Budi")]).unwrap();
//!
//! let budi = conn.table("users").where_("name", "Budi").first().unwrap().unwrap();
//! assert_eq!(budi["id"], quarry_core::SqlValue::Int(1));
//! ```

pub mod ast;
mod connection;
mod error;
pub mod eval;
mod executor;
pub mod lexer;
pub mod parser;
mod store;

pub use connection::{MemoryConnection, DRIVER};
pub use error::ParseError;
pub use parser::{parse, split_statements, Parser};
pub use store::Store;

use quarry_core::{DatabaseConfig, DatabaseManager};

/// Registers the [`DRIVER`] driver on `manager`, backed by the global store.
pub fn register(manager: &mut DatabaseManager) {
    manager.extend(DRIVER, || Box::new(MemoryConnection::new()));
}

/// Registers the [`DRIVER`] driver with every connection sharing `store`.
pub fn register_with_store(manager: &mut DatabaseManager, store: &Store) {
    let store = store.clone();
    manager.extend(DRIVER, move || {
        Box::new(MemoryConnection::with_store(store.clone()))
    });
}

/// A manager for `config` with the in-memory driver registered.
#[must_use]
pub fn manager(config: DatabaseConfig) -> DatabaseManager {
    let mut manager = DatabaseManager::new(config);
    register(&mut manager);
    manager
}
