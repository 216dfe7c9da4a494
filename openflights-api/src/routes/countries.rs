use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path, Query},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::error;
use utoipa::IntoParams;

use crate::db;
use crate::db::airports::{AirportsDbError, CityAirportCount};
use crate::db::countries::{CountriesDbError, CountryWithCounts};
use crate::routes::{ErrorMessage, INTERNAL_SERVER_ERROR, error_message_response};

#[derive(Debug, Error)]
pub enum CountryError {
    #[error(transparent)]
    CountriesDb(#[from] CountriesDbError),

    #[error(transparent)]
    AirportsDb(#[from] AirportsDbError),
}

impl ResponseError for CountryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!(error = %self, "country request failed");
        // Do not expose internal database details in error messages
        error_message_response(self.status_code(), INTERNAL_SERVER_ERROR.to_string())
    }
}

/// Filters of `GET /countries`.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountriesQuery {
    /// Case-insensitive substring of the name.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub q: Option<String>,
}

#[utoipa::path(
    summary = "List countries",
    description = "Returns at most 200 countries with their airport and airline counts, \
        ordered by airport count descending and then by name.",
    params(CountriesQuery),
    responses(
        (status = 200, description = "Countries listed successfully", body = Vec<CountryWithCounts>),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Countries"
)]
#[get("/countries")]
pub async fn read_all_countries(
    pool: Data<SqlitePool>,
    query: Query<CountriesQuery>,
) -> Result<impl Responder, CountryError> {
    let countries = db::countries::list_countries(&**pool, query.q.as_deref()).await?;

    Ok(Json(countries))
}

#[utoipa::path(
    summary = "Count airports per city",
    description = "Returns the airport count of each city of a country, busiest cities first.",
    params(
        ("country_id" = i64, Path, description = "Unique ID of the country"),
    ),
    responses(
        (status = 200, description = "Counts computed successfully", body = Vec<CityAirportCount>),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Countries"
)]
#[get("/countries/{country_id}/city-airport-counts")]
pub async fn read_city_airport_counts(
    pool: Data<SqlitePool>,
    country_id: Path<i64>,
) -> Result<impl Responder, CountryError> {
    let counts = db::airports::city_airport_counts(&**pool, country_id.into_inner()).await?;

    Ok(Json(counts))
}
