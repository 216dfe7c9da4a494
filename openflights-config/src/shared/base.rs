use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The database pool cannot be configured with zero connections.
    #[error("`max_connections` cannot be zero")]
    MaxConnectionsZero,
    /// The database path must point somewhere.
    #[error("`database.path` cannot be empty")]
    EmptyDatabasePath,
    /// A zero row ceiling would reject every bulk load.
    #[error("`max_total_rows` cannot be zero")]
    MaxTotalRowsZero,
}
