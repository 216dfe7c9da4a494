use openflights_store::models::Airline;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};
use thiserror::Error;

use crate::db::{MAX_LIST_ROWS, contains_pattern};

#[derive(Debug, Error)]
pub enum AirlinesDbError {
    #[error("Error while interacting with the database for airlines: {0}")]
    Database(#[from] sqlx::Error),
}

/// An airline together with the name of the country it references.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AirlineWithCountry {
    #[sqlx(flatten)]
    pub airline: Airline,
    pub country_name: String,
}

/// Optional filters of the airline listing. Text filters match case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct AirlineFilters {
    pub country_id: Option<i64>,
    /// `Y` or `N`.
    pub active: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    /// Substring of the name.
    pub q: Option<String>,
}

pub async fn list_airlines<'c, E>(
    executor: E,
    filters: &AirlineFilters,
) -> Result<Vec<AirlineWithCountry>, AirlinesDbError>
where
    E: SqliteExecutor<'c>,
{
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        select l.*, c.name as country_name
        from airlines l
        join countries c on c.country_id = l.country_id
        where 1 = 1
        "#,
    );

    if let Some(country_id) = filters.country_id {
        builder.push(" and l.country_id = ").push_bind(country_id);
    }
    for (column, value) in [
        ("l.active", &filters.active),
        ("l.iata", &filters.iata),
        ("l.icao", &filters.icao),
    ] {
        if let Some(value) = value {
            builder
                .push(format!(" and {column} = "))
                .push_bind(value)
                .push(" collate nocase");
        }
    }
    if let Some(q) = &filters.q {
        builder
            .push(" and l.name like ")
            .push_bind(contains_pattern(q))
            .push(" escape '\\'");
    }

    builder
        .push(" order by l.airline_id limit ")
        .push_bind(MAX_LIST_ROWS);

    let airlines = builder
        .build_query_as::<AirlineWithCountry>()
        .fetch_all(executor)
        .await?;

    Ok(airlines)
}
