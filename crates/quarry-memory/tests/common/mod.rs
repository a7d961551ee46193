#![allow(dead_code)]

use quarry_core::{Connection, Grammar, Row, SqlValue};
use quarry_memory::{MemoryConnection, Store};

/// A connection over a fresh, isolated store.
pub fn connection(grammar: Grammar) -> MemoryConnection {
    MemoryConnection::with_store(Store::new()).with_grammar(grammar)
}

/// Inserts the two users every scenario starts from.
pub fn seed_users(conn: &mut MemoryConnection) {
    conn.table("users")
        .insert([("name", "Budi"), ("email", "budi@lonate.id")])
        .unwrap();
    conn.table("users")
        .insert([("name", "Yasir"), ("email", "yasir@lonate.id")])
        .unwrap();
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// The `name` column of each row, in order.
pub fn names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|r| r.get("name").map(ToString::to_string).unwrap_or_default())
        .collect()
}
