use std::str::FromStr;

use openflights_config::shared::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use thiserror::Error;
use tracing::info;

/// Schema migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection string of a private in-memory SQLite database.
const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error while connecting to the database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error while migrating the database: {0}")]
    Migrate(#[from] MigrateError),
}

/// Statement that opens a transaction holding the database write lock from the start.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Builds the connect options for `config`.
///
/// Foreign key enforcement is switched on for every connection so that countries referenced by
/// airports or airlines cannot be deleted.
pub fn connect_options(config: &DatabaseConfig) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = if config.is_in_memory() {
        SqliteConnectOptions::from_str(IN_MEMORY_URL)?
    } else {
        SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
    };

    Ok(options.foreign_keys(true))
}

/// Opens a connection pool for `config`.
///
/// In-memory databases keep their single connection open for the lifetime of the pool, since
/// closing it would discard the data.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let options = connect_options(config)?;

    let pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    let pool_options = if config.is_in_memory() {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
    };

    let pool = pool_options.connect_with(options).await?;

    Ok(pool)
}

/// Starts a transaction that reads and then writes.
///
/// A deferred transaction that upgrades from reader to writer while another connection writes
/// fails with `SQLITE_BUSY` without waiting, so the write lock is taken up front. Waiting for it
/// honors the connection's busy timeout.
pub async fn begin_write(
    pool: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with(BEGIN_WRITE).await
}

/// Applies all pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    info!("database schema is up to date");

    Ok(())
}

/// Opens a connection pool and brings its schema up to date.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let pool = connect(config).await?;
    migrate(&pool).await?;

    Ok(pool)
}
