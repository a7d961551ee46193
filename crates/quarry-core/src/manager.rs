//! Named connections built from a driver registry.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::DatabaseConfig;
use crate::connection::Connection;
use crate::error::{QueryError, Result};

/// Builds an unconnected connection for one driver.
pub type DriverFactory = Box<dyn Fn() -> Box<dyn Connection>>;

/// Resolves connection names to live connections.
///
/// Connections are created lazily on first request, configured with
/// [`Connection::connect`] and cached until [`Self::disconnect`].
pub struct DatabaseManager {
    config: DatabaseConfig,
    drivers: BTreeMap<String, DriverFactory>,
    connections: BTreeMap<String, Box<dyn Connection>>,
}

impl fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("config", &self.config)
            .field("drivers", &self.drivers.keys().collect::<Vec<_>>())
            .field("connections", &self.connections.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DatabaseManager {
    /// Creates a manager with no registered drivers.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            drivers: BTreeMap::new(),
            connections: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Registers (or replaces) the factory for `driver`.
    pub fn extend<F>(&mut self, driver: &str, factory: F)
    where
        F: Fn() -> Box<dyn Connection> + 'static,
    {
        tracing::debug!(driver, "registering database driver");
        self.drivers.insert(String::from(driver), Box::new(factory));
    }

    /// Returns whether `driver` has a registered factory.
    #[must_use]
    pub fn has_driver(&self, driver: &str) -> bool {
        self.drivers.contains_key(driver)
    }

    /// Returns the named connection, or the default one for `None`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Configuration`] if the name is not configured or
    /// its driver is not registered, and whatever [`Connection::connect`]
    /// reports.
    pub fn connection(&mut self, name: Option<&str>) -> Result<&mut dyn Connection> {
        let name = String::from(name.unwrap_or(&self.config.default));

        if !self.connections.contains_key(&name) {
            let config = self.config.connection(Some(&name))?;
            let factory = self.drivers.get(&config.driver).ok_or_else(|| {
                QueryError::configuration(format!(
                    "unsupported driver [{}] for connection [{name}]",
                    config.driver
                ))
            })?;
            let mut connection = factory();
            connection.connect(config)?;
            tracing::info!(
                connection = %name,
                driver = %config.driver,
                grammar = %connection.grammar(),
                "database connection established"
            );
            self.connections.insert(name.clone(), connection);
        }

        match self.connections.get_mut(&name) {
            Some(connection) => {
                let connection: &mut dyn Connection = connection.as_mut();
                Ok(connection)
            }
            None => Err(QueryError::connection(format!(
                "connection [{name}] was not cached"
            ))),
        }
    }

    /// Drops a cached connection. Returns whether one was open.
    pub fn disconnect(&mut self, name: &str) -> bool {
        let removed = self.connections.remove(name).is_some();
        if removed {
            tracing::info!(connection = name, "database connection closed");
        }
        removed
    }

    /// Names of every configured connection.
    #[must_use]
    pub fn connection_names(&self) -> Vec<&str> {
        self.config.connections.keys().map(String::as_str).collect()
    }

    /// Names of the connections currently open.
    #[must_use]
    pub fn open_connections(&self) -> Vec<&str> {
        self.connections.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::connection::{InsertId, QueryResult, Row};
    use crate::grammar::Grammar;
    use crate::value::SqlValue;

    #[derive(Default)]
    struct Null {
        grammar: Grammar,
    }

    impl Connection for Null {
        fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
            if let Some(g) = &config.grammar {
                self.grammar = g.parse().map_err(|_| {
                    QueryError::connection(format!("unknown grammar '{g}'"))
                })?;
            }
            Ok(())
        }

        fn execute(&mut self, _sql: &str, _bindings: &[SqlValue]) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }

        fn fetch_rows(&self) -> Vec<Row> {
            vec![]
        }

        fn last_insert_id(&self) -> InsertId {
            InsertId::default()
        }

        fn grammar(&self) -> Grammar {
            self.grammar
        }
    }

    fn config() -> DatabaseConfig {
        DatabaseConfig::from_json(
            r#"{
                "default": "a",
                "connections": {
                    "a": { "driver": "null" },
                    "b": { "driver": "null", "grammar": "mysql" },
                    "c": { "driver": "missing" },
                    "d": { "driver": "null", "grammar": "oracle" }
                }
            }"#,
        )
        .unwrap()
    }

    fn manager() -> DatabaseManager {
        let mut manager = DatabaseManager::new(config());
        manager.extend("null", || Box::new(Null::default()));
        manager
    }

    #[test]
    fn test_default_connection() {
        let mut manager = manager();
        let conn = manager.connection(None).unwrap();
        assert_eq!(conn.grammar(), Grammar::Generic);
        assert_eq!(manager.open_connections(), vec!["a"]);
    }

    #[test]
    fn test_named_connection_is_configured() {
        let mut manager = manager();
        let conn = manager.connection(Some("b")).unwrap();
        assert_eq!(conn.grammar(), Grammar::MySql);
        let sql = conn.table("users").to_sql().unwrap();
        assert_eq!(sql.sql, "SELECT * FROM `users`");
    }

    #[test]
    fn test_unknown_driver() {
        let mut manager = manager();
        let err = manager.connection(Some("c")).err().unwrap();
        assert!(matches!(err, QueryError::Configuration(ref m) if m.contains("missing")));
    }

    #[test]
    fn test_unknown_connection_name() {
        let mut manager = manager();
        assert!(matches!(
            manager.connection(Some("zzz")).err().unwrap(),
            QueryError::Configuration(_)
        ));
    }

    #[test]
    fn test_connect_failure_is_not_cached() {
        let mut manager = manager();
        assert!(matches!(
            manager.connection(Some("d")).err().unwrap(),
            QueryError::Connection(_)
        ));
        assert!(manager.open_connections().is_empty());
    }

    #[test]
    fn test_disconnect() {
        let mut manager = manager();
        manager.connection(Some("a")).unwrap();
        assert!(manager.disconnect("a"));
        assert!(!manager.disconnect("a"));
        assert_eq!(manager.connection_names(), vec!["a", "b", "c", "d"]);
    }
}
