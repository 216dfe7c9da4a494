//! Helpers for tests that need a migrated database.

use openflights_config::shared::DatabaseConfig;
use sqlx::SqlitePool;

use crate::connection::connect_and_migrate;
use crate::models::Country;

/// Creates a fresh in-memory database with the schema applied.
pub async fn create_test_pool() -> SqlitePool {
    connect_and_migrate(&DatabaseConfig::in_memory())
        .await
        .expect("failed to create the in-memory test database")
}

/// Inserts `country` directly, bypassing the loader.
pub async fn insert_country(pool: &SqlitePool, country: &Country) {
    sqlx::query("insert into countries (country_id, name, iso2, dafif) values (?, ?, ?, ?)")
        .bind(country.country_id)
        .bind(&country.name)
        .bind(&country.iso2)
        .bind(&country.dafif)
        .execute(pool)
        .await
        .expect("failed to insert test country");
}

/// Builds a [`Country`] with only the required fields set.
pub fn country(country_id: i64, name: &str) -> Country {
    Country {
        country_id,
        name: name.to_string(),
        iso2: None,
        dafif: None,
    }
}
