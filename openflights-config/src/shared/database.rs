use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Connection string used for a private in-memory database.
pub const IN_MEMORY_DATABASE_PATH: &str = ":memory:";

/// Configuration of the SQLite database backing the entity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Filesystem path of the database file, or `:memory:`.
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Whether the database file is created when it does not exist yet.
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

impl DatabaseConfig {
    /// Returns a configuration for a single-connection in-memory database.
    ///
    /// Every SQLite in-memory connection owns its own database, so the pool is capped at one
    /// connection to keep all callers on the same data.
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY_DATABASE_PATH.to_string(),
            max_connections: 1,
            create_if_missing: true,
        }
    }

    /// Returns `true` if this configuration points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DATABASE_PATH
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.trim().is_empty() {
            return Err(ValidationError::EmptyDatabasePath);
        }

        if self.max_connections == 0 {
            return Err(ValidationError::MaxConnectionsZero);
        }

        Ok(())
    }
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_create_if_missing() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied_when_omitted() {
        let config: DatabaseConfig = serde_json::from_str(r#"{"path": "openflights.db"}"#).unwrap();

        assert_eq!(config.max_connections, 5);
        assert!(config.create_if_missing);
        assert!(!config.is_in_memory());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_connections_is_rejected() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::in_memory()
        };

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MaxConnectionsZero)
        ));
    }
}
