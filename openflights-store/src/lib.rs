//! Entity store for the OpenFlights dataset.
//!
//! Owns the SQLite schema (embedded migrations), the entity models and the helpers used by both
//! the bulk loader and the query service to talk to the database.

pub mod connection;
pub mod counts;
pub mod decimal;
pub mod models;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use connection::{
    MIGRATOR, StoreError, begin_write, connect, connect_and_migrate, migrate,
};
