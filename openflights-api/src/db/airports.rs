use openflights_store::decimal;
use openflights_store::models::Airport;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::{MAX_LIST_ROWS, contains_pattern};

/// Airports joined with the name of their country.
const SELECT_AIRPORTS: &str = r#"
    select a.*, c.name as country_name
    from airports a
    join countries c on c.country_id = a.country_id
    "#;

#[derive(Debug, Error)]
pub enum AirportsDbError {
    #[error("Error while interacting with the database for airports: {0}")]
    Database(#[from] sqlx::Error),
}

/// An airport together with the name of the country it references.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AirportWithCountry {
    #[sqlx(flatten)]
    pub airport: Airport,
    pub country_name: String,
}

/// Optional filters of the airport listing. Text filters match case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct AirportFilters {
    pub country_id: Option<i64>,
    /// Substring of the city.
    pub city: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    /// Substring of the name.
    pub q: Option<String>,
}

/// Number of airports of a single city.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
pub struct CityAirportCount {
    #[schema(example = "Copenhagen")]
    pub city: String,
    #[schema(example = 3)]
    pub airport_count: i64,
}

pub async fn list_airports<'c, E>(
    executor: E,
    filters: &AirportFilters,
) -> Result<Vec<AirportWithCountry>, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_AIRPORTS);
    builder.push(" where 1 = 1");

    if let Some(country_id) = filters.country_id {
        builder.push(" and a.country_id = ").push_bind(country_id);
    }
    if let Some(city) = &filters.city {
        builder
            .push(" and a.city like ")
            .push_bind(contains_pattern(city))
            .push(" escape '\\'");
    }
    if let Some(iata) = &filters.iata {
        builder
            .push(" and a.iata = ")
            .push_bind(iata)
            .push(" collate nocase");
    }
    if let Some(icao) = &filters.icao {
        builder
            .push(" and a.icao = ")
            .push_bind(icao)
            .push(" collate nocase");
    }
    if let Some(q) = &filters.q {
        builder
            .push(" and a.name like ")
            .push_bind(contains_pattern(q))
            .push(" escape '\\'");
    }

    builder
        .push(" order by a.airport_id limit ")
        .push_bind(MAX_LIST_ROWS);

    let airports = builder
        .build_query_as::<AirportWithCountry>()
        .fetch_all(executor)
        .await?;

    Ok(airports)
}

/// Lists airports lacking an IATA or an ICAO code, where empty codes count as missing.
pub async fn list_airports_missing_codes<'c, E>(
    executor: E,
    country_id: Option<i64>,
) -> Result<Vec<AirportWithCountry>, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_AIRPORTS);
    builder.push(
        " where (a.iata is null or a.iata = '' or a.icao is null or a.icao = '')",
    );

    if let Some(country_id) = country_id {
        builder.push(" and a.country_id = ").push_bind(country_id);
    }

    builder
        .push(" order by a.airport_id limit ")
        .push_bind(MAX_LIST_ROWS);

    let airports = builder
        .build_query_as::<AirportWithCountry>()
        .fetch_all(executor)
        .await?;

    Ok(airports)
}

/// Counts the airports of each city of a country, busiest cities first.
///
/// Airports without a city are left out.
pub async fn city_airport_counts<'c, E>(
    executor: E,
    country_id: i64,
) -> Result<Vec<CityAirportCount>, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let counts = sqlx::query_as::<_, CityAirportCount>(
        r#"
        select city, count(*) as airport_count
        from airports
        where country_id = ? and city is not null and city <> ''
        group by city
        order by airport_count desc, city asc
        limit ?
        "#,
    )
    .bind(country_id)
    .bind(MAX_LIST_ROWS)
    .fetch_all(executor)
    .await?;

    Ok(counts)
}

pub async fn read_airport<'c, E>(
    executor: E,
    airport_id: i64,
) -> Result<Option<AirportWithCountry>, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let airport = sqlx::query_as::<_, AirportWithCountry>(&format!(
        "{SELECT_AIRPORTS} where a.airport_id = ?"
    ))
    .bind(airport_id)
    .fetch_optional(executor)
    .await?;

    Ok(airport)
}

pub async fn airport_exists<'c, E>(executor: E, airport_id: i64) -> Result<bool, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "select exists(select 1 from airports where airport_id = ?)",
    )
    .bind(airport_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

pub async fn create_airport<'c, E>(executor: E, airport: &Airport) -> Result<(), AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    sqlx::query(
        r#"
        insert into airports (
            airport_id, name, city, country_id, iata, icao, latitude, longitude,
            altitude_ft, timezone_hrs, dst, tz, type, source
        )
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(airport.airport_id)
    .bind(&airport.name)
    .bind(&airport.city)
    .bind(airport.country_id)
    .bind(&airport.iata)
    .bind(&airport.icao)
    .bind(decimal::encode(airport.latitude.as_ref()))
    .bind(decimal::encode(airport.longitude.as_ref()))
    .bind(airport.altitude_ft)
    .bind(decimal::encode(airport.timezone_hrs.as_ref()))
    .bind(&airport.dst)
    .bind(&airport.tz)
    .bind(&airport.kind)
    .bind(&airport.source)
    .execute(executor)
    .await?;

    Ok(())
}

/// Overwrites every column of an existing airport. Returns `false` if the airport does not exist.
pub async fn update_airport<'c, E>(executor: E, airport: &Airport) -> Result<bool, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let result = sqlx::query(
        r#"
        update airports
        set name = ?, city = ?, country_id = ?, iata = ?, icao = ?, latitude = ?,
            longitude = ?, altitude_ft = ?, timezone_hrs = ?, dst = ?, tz = ?, type = ?,
            source = ?
        where airport_id = ?
        "#,
    )
    .bind(&airport.name)
    .bind(&airport.city)
    .bind(airport.country_id)
    .bind(&airport.iata)
    .bind(&airport.icao)
    .bind(decimal::encode(airport.latitude.as_ref()))
    .bind(decimal::encode(airport.longitude.as_ref()))
    .bind(airport.altitude_ft)
    .bind(decimal::encode(airport.timezone_hrs.as_ref()))
    .bind(&airport.dst)
    .bind(&airport.tz)
    .bind(&airport.kind)
    .bind(&airport.source)
    .bind(airport.airport_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes an airport. Returns `false` if the airport does not exist.
pub async fn delete_airport<'c, E>(executor: E, airport_id: i64) -> Result<bool, AirportsDbError>
where
    E: SqliteExecutor<'c>,
{
    let result = sqlx::query("delete from airports where airport_id = ?")
        .bind(airport_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
