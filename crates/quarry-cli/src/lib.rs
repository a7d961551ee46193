//! Library half of the `quarry` command-line tool.
//!
//! # CLI Usage
//!
//! ```bash
//! # Run a script against the default in-memory connection
//! quarry run seed.sql
//!
//! # Show what a builder chain compiles to
//! quarry compile --dialect mysql --table users --where name=Budi --order id:desc --limit 5
//!
//! # Inline the bindings instead of printing them
//! quarry compile --dialect literal --table users --where id=3 --inline
//!
//! # List configured connections
//! QUARRY_CONFIG=database.json quarry connections
//! ```

pub mod commands;
pub mod error;
pub mod input;

pub use commands::{
    compile_select, list_connections, run_script, CompiledOutput, RunSummary, SelectOptions,
};
pub use error::{CliError, Result};
pub use input::{load_config, parse_filter, parse_order, parse_value, read_script, Filter};
