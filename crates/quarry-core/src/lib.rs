//! # quarry-core
//!
//! A fluent SQL query builder whose text generation is delegated to a
//! swappable dialect [`Grammar`].
//!
//! This crate provides:
//! - [`QueryDescriptor`], a backend-neutral description of one query
//! - [`QueryBuilder`], the fluent API that fills it and runs it
//! - [`Grammar`], compiling descriptors to bound or literal-inlined SQL text
//! - the [`Connection`] trait that backends implement, and a
//!   [`DatabaseManager`] resolving named connections from configuration
//!
//! ## Building Queries
//!
//! ```rust
//! use quarry_core::descriptor::{Boolean, Operator, Predicate, QueryDescriptor};
//! use quarry_core::grammar::Grammar;
//! use quarry_core::ToSqlValue;
//!
//! let mut users = QueryDescriptor::new("users");
//! users.predicates.push(Predicate::Basic {
//!     column: String::from("name"),
//!     operator: Operator::Eq,
//!     value: "Budi".to_sql_value(),
//!     boolean: Boolean::And,
//! });
//!
//! let bound = Grammar::MySql.compile_select(&users);
//! assert_eq!(bound.sql, "SELECT * FROM `users` WHERE `name` = ?");
//!
//! let inline = Grammar::Literal.compile_select(&users);
//! assert_eq!(inline.sql, "SELECT * FROM users WHERE name = 'Budi'");
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Binding dialects never place values in the text. The literal dialect
//! escapes every value it inlines:
//!
//! ```rust
//! use quarry_core::{Grammar, ToSqlValue};
//!
//! let quoted = Grammar::Literal.quote_value(&"'; DROP TABLE users; --".to_sql_value());
//! assert_eq!(quoted, "'''; DROP TABLE users; --'");
//! ```

pub mod builder;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod grammar;
pub mod manager;
pub mod value;

pub use builder::QueryBuilder;
pub use config::{ConnectionConfig, DatabaseConfig};
pub use connection::{Connection, InsertId, QueryResult, Row};
pub use descriptor::{Boolean, Direction, Join, JoinKind, Operator, Ordering, Predicate, QueryDescriptor};
pub use error::{QueryError, Result};
pub use grammar::{interpolate_bindings, AggregateFunction, CompiledQuery, Grammar, QueryKind};
pub use manager::{DatabaseManager, DriverFactory};
pub use value::{SqlValue, ToSqlValue};
