//! Connection configuration.
//!
//! Configuration is plain `serde` data so the owning application can load it
//! from wherever it keeps settings. [`DatabaseConfig::from_path`] reads the JSON
//! layout:
//!
//! ```json
//! {
//!   "default": "memory",
//!   "connections": {
//!     "memory": { "driver": "inmemory" },
//!     "embedded": { "driver": "inmemory", "grammar": "literal" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Settings for one named connection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Driver name, resolved through the manager's driver registry.
    pub driver: String,
    /// Database name or file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Login user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Dialect override, for drivers that can speak more than one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
    /// Turn silently ignored statements into errors, where supported.
    #[serde(default)]
    pub strict: bool,
}

impl ConnectionConfig {
    /// Creates a configuration for `driver` with every other field unset.
    #[must_use]
    pub fn new(driver: &str) -> Self {
        Self {
            driver: String::from(driver),
            ..Self::default()
        }
    }

    /// Sets the dialect override.
    #[must_use]
    pub fn grammar(mut self, grammar: &str) -> Self {
        self.grammar = Some(String::from(grammar));
        self
    }

    /// Sets the database name or path.
    #[must_use]
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(String::from(database));
        self
    }

    /// Enables strict mode.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// The set of named connections and the default among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Name of the connection used when none is requested.
    pub default: String,
    /// Connection settings by name.
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let mut connections = BTreeMap::new();
        connections.insert(String::from("memory"), ConnectionConfig::new("inmemory"));
        Self {
            default: String::from("memory"),
            connections,
        }
    }
}

impl DatabaseConfig {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ConfigParse`] for invalid JSON or a wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ConfigIo`] if the file cannot be read and
    /// [`QueryError::ConfigParse`] if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| QueryError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Looks up a connection by name, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Configuration`] if the name is not configured.
    pub fn connection(&self, name: Option<&str>) -> Result<&ConnectionConfig> {
        let name = name.unwrap_or(&self.default);
        self.connections.get(name).ok_or_else(|| {
            QueryError::configuration(format!("database connection [{name}] is not configured"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.default, "memory");
        assert_eq!(config.connection(None).unwrap().driver, "inmemory");
    }

    #[test]
    fn test_from_json() {
        let config = DatabaseConfig::from_json(
            r#"{
                "default": "embedded",
                "connections": {
                    "embedded": { "driver": "inmemory", "grammar": "literal", "strict": true },
                    "mysql": { "driver": "mysql", "host": "127.0.0.1", "port": 3306 }
                }
            }"#,
        )
        .unwrap();

        let embedded = config.connection(None).unwrap();
        assert_eq!(embedded.grammar.as_deref(), Some("literal"));
        assert!(embedded.strict);

        let mysql = config.connection(Some("mysql")).unwrap();
        assert_eq!(mysql.port, Some(3306));
        assert!(!mysql.strict);
    }

    #[test]
    fn test_unknown_connection() {
        let config = DatabaseConfig::default();
        let err = config.connection(Some("missing")).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default": "m", "connections": {{"m": {{"driver": "inmemory"}}}}}}"#
        )
        .unwrap();
        let config = DatabaseConfig::from_path(file.path()).unwrap();
        assert_eq!(config.default, "m");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = DatabaseConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, QueryError::ConfigIo { .. }));
    }

    #[test]
    fn test_from_json_malformed() {
        let err = DatabaseConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, QueryError::ConfigParse(_)));
    }
}
