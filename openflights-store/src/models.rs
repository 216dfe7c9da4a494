use bigdecimal::BigDecimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::decimal;

/// Length of an IATA code.
pub const IATA_CODE_LENGTH: usize = 3;

/// Length of an ICAO code.
pub const ICAO_CODE_LENGTH: usize = 4;

/// A country referenced by airports and airlines.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Country {
    pub country_id: i64,
    pub name: String,
    pub iso2: Option<String>,
    pub dafif: Option<String>,
}

/// An aircraft type. Planes have no relations.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Plane {
    pub plane_id: i64,
    pub name: String,
    pub iata: Option<String>,
    pub icao: Option<String>,
}

/// An airport row. `country_id` references [`Country`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Airport {
    pub airport_id: i64,
    pub name: String,
    pub city: Option<String>,
    pub country_id: i64,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub altitude_ft: Option<i64>,
    pub timezone_hrs: Option<BigDecimal>,
    pub dst: Option<String>,
    pub tz: Option<String>,
    /// Stored in the `type` column.
    pub kind: Option<String>,
    pub source: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Airport {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            airport_id: row.try_get("airport_id")?,
            name: row.try_get("name")?,
            city: row.try_get("city")?,
            country_id: row.try_get("country_id")?,
            iata: row.try_get("iata")?,
            icao: row.try_get("icao")?,
            latitude: decimal::decode(row, "latitude")?,
            longitude: decimal::decode(row, "longitude")?,
            altitude_ft: row.try_get("altitude_ft")?,
            timezone_hrs: decimal::decode(row, "timezone_hrs")?,
            dst: row.try_get("dst")?,
            tz: row.try_get("tz")?,
            kind: row.try_get("type")?,
            source: row.try_get("source")?,
        })
    }
}

/// An airline row. `country_id` references [`Country`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Airline {
    pub airline_id: i64,
    pub name: String,
    pub alias: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub callsign: Option<String>,
    pub country_id: i64,
    /// `Y` or `N`.
    pub active: Option<String>,
}
