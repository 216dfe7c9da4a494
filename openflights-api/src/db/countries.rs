use serde::Serialize;
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::{MAX_LIST_ROWS, contains_pattern};

/// Extended result code SQLite reports when an `on delete restrict` action rejects a delete.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

#[derive(Debug, Error)]
#[error("Error while interacting with the database for countries: {0}")]
pub struct CountriesDbError(#[from] sqlx::Error);

#[derive(Debug, Error)]
pub enum DeleteCountryError {
    #[error("Error while deleting a country: {0}")]
    Database(#[from] sqlx::Error),

    #[error("The country with id {0} is referenced by airports or airlines")]
    Referenced(i64),
}

/// A country annotated with the number of airports and airlines referencing it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
pub struct CountryWithCounts {
    #[schema(example = 112)]
    pub country_id: i64,
    #[schema(example = "Denmark")]
    pub name: String,
    #[schema(example = "DK")]
    pub iso2: Option<String>,
    #[schema(example = "DA")]
    pub dafif: Option<String>,
    #[schema(example = 1)]
    pub airport_count: i64,
    #[schema(example = 0)]
    pub airline_count: i64,
}

/// Lists countries with their airport and airline counts, most airports first and then by name.
pub async fn list_countries<'c, E>(
    executor: E,
    q: Option<&str>,
) -> Result<Vec<CountryWithCounts>, CountriesDbError>
where
    E: SqliteExecutor<'c>,
{
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        select
            c.country_id,
            c.name,
            c.iso2,
            c.dafif,
            (select count(*) from airports a where a.country_id = c.country_id) as airport_count,
            (select count(*) from airlines l where l.country_id = c.country_id) as airline_count
        from countries c
        "#,
    );

    if let Some(q) = q {
        builder
            .push(" where c.name like ")
            .push_bind(contains_pattern(q))
            .push(" escape '\\'");
    }

    builder
        .push(" order by airport_count desc, c.name asc limit ")
        .push_bind(MAX_LIST_ROWS);

    let countries = builder
        .build_query_as::<CountryWithCounts>()
        .fetch_all(executor)
        .await?;

    Ok(countries)
}

pub async fn country_exists<'c, E>(executor: E, country_id: i64) -> Result<bool, CountriesDbError>
where
    E: SqliteExecutor<'c>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "select exists(select 1 from countries where country_id = ?)",
    )
    .bind(country_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Deletes a country that no airport or airline references.
///
/// Returns `false` if the country does not exist and [`DeleteCountryError::Referenced`] if it is
/// still referenced.
pub async fn delete_country<'c, E>(
    executor: E,
    country_id: i64,
) -> Result<bool, DeleteCountryError>
where
    E: SqliteExecutor<'c>,
{
    let result = sqlx::query("delete from countries where country_id = ?")
        .bind(country_id)
        .execute(executor)
        .await;

    match result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(sqlx::Error::Database(err)) if is_foreign_key_violation(err.as_ref()) => {
            Err(DeleteCountryError::Referenced(country_id))
        }
        Err(err) => Err(err.into()),
    }
}

/// Restrict actions fail through SQLite's trigger path, which sqlx does not classify as a
/// foreign key violation.
fn is_foreign_key_violation(err: &dyn DatabaseError) -> bool {
    err.kind() == ErrorKind::ForeignKeyViolation
        || err.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
}
