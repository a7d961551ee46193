//! Table storage shared by in-memory connections.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use quarry_core::{InsertId, Row, SqlValue};

/// Rows of one table plus its auto-increment counter.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    pub(crate) rows: Vec<Row>,
    counter: i64,
}

impl Table {
    /// Appends `row`, assigning `id` from the counter unless the row carries one.
    ///
    /// An explicit integer id above the counter advances it, so later
    /// generated ids never collide.
    fn insert(&mut self, mut row: Row) -> InsertId {
        self.counter += 1;
        let id = match row.get("id") {
            Some(SqlValue::Int(n)) => {
                self.counter = self.counter.max(*n);
                InsertId::Int(*n)
            }
            Some(SqlValue::Text(s)) => InsertId::Text(s.clone()),
            _ => {
                row.insert(String::from("id"), SqlValue::Int(self.counter));
                InsertId::Int(self.counter)
            }
        };
        self.rows.push(row);
        id
    }
}

/// Every table of one store.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    tables: BTreeMap<String, Table>,
}

impl Tables {
    /// Returns the table, creating it empty on first reference.
    pub(crate) fn ensure(&mut self, name: &str) -> &mut Table {
        if !self.tables.contains_key(name) {
            tracing::debug!(table = name, "creating in-memory table");
        }
        self.tables.entry(String::from(name)).or_default()
    }

    pub(crate) fn insert(&mut self, name: &str, row: Row) -> InsertId {
        self.ensure(name).insert(row)
    }

    pub(crate) fn drop_table(&mut self, name: &str) -> bool {
        let dropped = self.tables.remove(name).is_some();
        if dropped {
            tracing::debug!(table = name, "dropped in-memory table");
        }
        dropped
    }
}

static GLOBAL_STORE: OnceLock<Store> = OnceLock::new();

/// A handle to a set of in-memory tables.
///
/// Clones share the same tables. Every operation holds one lock for its whole
/// read-modify-write sequence, so id assignment and row append are atomic.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<Tables>>,
}

impl Store {
    /// Creates an empty, isolated store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store used by connections that were not given one.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_STORE.get_or_init(Self::new).clone()
    }

    /// Returns whether both handles point at the same tables.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the tables.
    pub(crate) fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.lock();
        f(&mut tables)
    }

    /// Creates `table` if it does not exist. Returns whether it was created.
    pub fn create_table(&self, table: &str) -> bool {
        self.with_tables(|tables| {
            let existed = tables.tables.contains_key(table);
            tables.ensure(table);
            !existed
        })
    }

    /// Removes `table` and its counter. Returns whether it existed.
    pub fn drop_table(&self, table: &str) -> bool {
        self.with_tables(|tables| tables.drop_table(table))
    }

    /// Returns whether `table` exists.
    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.with_tables(|tables| tables.tables.contains_key(table))
    }

    /// Appends a row and returns its id.
    pub fn insert(&self, table: &str, row: Row) -> InsertId {
        self.with_tables(|tables| tables.insert(table, row))
    }

    /// A copy of the rows of `table`; empty if it does not exist.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.with_tables(|tables| {
            tables
                .tables
                .get(table)
                .map(|t| t.rows.clone())
                .unwrap_or_default()
        })
    }

    /// A copy of every table, for debugging.
    #[must_use]
    pub fn tables(&self) -> BTreeMap<String, Vec<Row>> {
        self.with_tables(|tables| {
            tables
                .tables
                .iter()
                .map(|(name, t)| (name.clone(), t.rows.clone()))
                .collect()
        })
    }

    /// Removes every table.
    pub fn reset(&self) {
        self.with_tables(|tables| tables.tables.clear());
    }
}
