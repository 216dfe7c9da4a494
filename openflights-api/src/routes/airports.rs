use actix_web::{
    HttpResponse, Responder, ResponseError, delete, get,
    http::StatusCode,
    patch, post, put,
    web::{Data, Json, Path, Query},
};
use metrics::counter;
use openflights_telemetry::metrics::{OPENFLIGHTS_AIRPORT_MUTATIONS_TOTAL, OPERATION_LABEL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::db;
use crate::db::airports::{AirportFilters, AirportWithCountry, AirportsDbError};
use crate::db::countries::CountriesDbError;
use crate::routes::{
    ErrorMessage, INTERNAL_SERVER_ERROR, error_message_response, field_errors_response,
};
use crate::validation::{
    AirportChanges, DUPLICATE_AIRPORT, FieldErrors, IMMUTABLE_AIRPORT_ID, UNKNOWN_COUNTRY,
    ValidationMode, parse_id_filter,
};

#[derive(Debug, Error)]
pub enum AirportError {
    #[error("The airport with id {0} was not found")]
    AirportNotFound(i64),

    #[error("The airport is invalid: {0}")]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    AirportsDb(#[from] AirportsDbError),

    #[error(transparent)]
    CountriesDb(#[from] CountriesDbError),

    #[error("Error while interacting with the database: {0}")]
    Database(#[from] sqlx::Error),
}

impl AirportError {
    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            AirportError::AirportsDb(_)
            | AirportError::CountriesDb(_)
            | AirportError::Database(_) => INTERNAL_SERVER_ERROR.to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for AirportError {
    fn status_code(&self) -> StatusCode {
        match self {
            AirportError::AirportNotFound(_) => StatusCode::NOT_FOUND,
            AirportError::Validation(_) => StatusCode::BAD_REQUEST,
            AirportError::AirportsDb(_)
            | AirportError::CountriesDb(_)
            | AirportError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AirportError::Validation(errors) => field_errors_response(errors),
            e => {
                if e.status_code().is_server_error() {
                    error!(error = %e, "airport request failed");
                }
                error_message_response(e.status_code(), e.to_message())
            }
        }
    }
}

/// Filters of `GET /airports`. Blank values are ignored.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AirportsQuery {
    /// Exact country id.
    #[param(example = "112")]
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub country_id: Option<String>,
    /// Case-insensitive substring of the city.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub city: Option<String>,
    /// Case-insensitive IATA code.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub iata: Option<String>,
    /// Case-insensitive ICAO code.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub icao: Option<String>,
    /// Case-insensitive substring of the name.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub q: Option<String>,
}

/// Filters of `GET /airports/missing-codes`.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MissingCodesQuery {
    /// Exact country id.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub country_id: Option<String>,
}

/// Airport fields accepted by create and update requests.
///
/// Decimals may be sent as JSON numbers or strings. Unknown fields are ignored.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct AirportRequest {
    #[schema(example = 609)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport_id: Option<i64>,
    #[schema(example = "Copenhagen Kastrup Airport")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[schema(example = "Copenhagen")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[schema(example = 112)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<i64>,
    #[schema(example = "CPH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    #[schema(example = "EKCH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    #[schema(example = "55.617900")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[schema(example = "12.656000")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[schema(example = 17)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_ft: Option<i64>,
    #[schema(example = "1.00")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_hrs: Option<String>,
    #[schema(example = "E")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    #[schema(example = "Europe/Copenhagen")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
    #[schema(example = "airport")]
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[schema(example = "OurAirports")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AirportResponse {
    #[schema(example = 609)]
    pub airport_id: i64,
    #[schema(example = "Copenhagen Kastrup Airport")]
    pub name: String,
    #[schema(example = "Copenhagen")]
    pub city: Option<String>,
    #[schema(example = 112)]
    pub country_id: i64,
    #[schema(example = "Denmark")]
    pub country_name: String,
    #[schema(example = "CPH")]
    pub iata: Option<String>,
    #[schema(example = "EKCH")]
    pub icao: Option<String>,
    /// Decimal with 6 fractional digits.
    #[schema(example = "55.617900")]
    pub latitude: Option<String>,
    /// Decimal with 6 fractional digits.
    #[schema(example = "12.656000")]
    pub longitude: Option<String>,
    #[schema(example = 17)]
    pub altitude_ft: Option<i64>,
    /// Decimal with 2 fractional digits.
    #[schema(example = "1.00")]
    pub timezone_hrs: Option<String>,
    #[schema(example = "E")]
    pub dst: Option<String>,
    #[schema(example = "Europe/Copenhagen")]
    pub tz: Option<String>,
    #[schema(example = "airport")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[schema(example = "OurAirports")]
    pub source: Option<String>,
}

impl From<AirportWithCountry> for AirportResponse {
    fn from(row: AirportWithCountry) -> Self {
        let airport = row.airport;
        Self {
            airport_id: airport.airport_id,
            name: airport.name,
            city: airport.city,
            country_id: airport.country_id,
            country_name: row.country_name,
            iata: airport.iata,
            icao: airport.icao,
            latitude: airport.latitude.map(|d| d.to_plain_string()),
            longitude: airport.longitude.map(|d| d.to_plain_string()),
            altitude_ft: airport.altitude_ft,
            timezone_hrs: airport.timezone_hrs.map(|d| d.to_plain_string()),
            dst: airport.dst,
            tz: airport.tz,
            kind: airport.kind,
            source: airport.source,
        }
    }
}

fn into_responses(rows: Vec<AirportWithCountry>) -> Vec<AirportResponse> {
    rows.into_iter().map(AirportResponse::from).collect()
}

fn record_mutation(operation: &'static str, airport_id: i64) {
    counter!(OPENFLIGHTS_AIRPORT_MUTATIONS_TOTAL, OPERATION_LABEL => operation).increment(1);
    info!(airport_id, operation, "airport mutated");
}

#[utoipa::path(
    summary = "List airports",
    description = "Returns at most 200 airports ordered by id, optionally filtered.",
    params(AirportsQuery),
    responses(
        (status = 200, description = "Airports listed successfully", body = Vec<AirportResponse>),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[get("/airports")]
pub async fn read_all_airports(
    pool: Data<SqlitePool>,
    query: Query<AirportsQuery>,
) -> Result<impl Responder, AirportError> {
    let query = query.into_inner();
    let filters = AirportFilters {
        country_id: parse_id_filter("country_id", query.country_id.as_deref())?,
        city: query.city,
        iata: query.iata,
        icao: query.icao,
        q: query.q,
    };

    let airports = db::airports::list_airports(&**pool, &filters).await?;

    Ok(Json(into_responses(airports)))
}

#[utoipa::path(
    summary = "List airports missing codes",
    description = "Returns at most 200 airports whose IATA or ICAO code is absent or empty.",
    params(MissingCodesQuery),
    responses(
        (status = 200, description = "Airports listed successfully", body = Vec<AirportResponse>),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[get("/airports/missing-codes")]
pub async fn read_airports_missing_codes(
    pool: Data<SqlitePool>,
    query: Query<MissingCodesQuery>,
) -> Result<impl Responder, AirportError> {
    let country_id = parse_id_filter("country_id", query.country_id.as_deref())?;

    let airports = db::airports::list_airports_missing_codes(&**pool, country_id).await?;

    Ok(Json(into_responses(airports)))
}

#[utoipa::path(
    summary = "Create an airport",
    description = "Creates an airport. IATA and ICAO codes are stored uppercase.",
    request_body = AirportRequest,
    responses(
        (status = 201, description = "Airport created successfully", body = AirportResponse),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[post("/airports")]
pub async fn create_airport(
    pool: Data<SqlitePool>,
    body: Json<Map<String, Value>>,
) -> Result<impl Responder, AirportError> {
    let (changes, mut errors) = AirportChanges::parse(&body, ValidationMode::Create);

    let mut txn = openflights_store::begin_write(&pool).await?;

    if let Some(country_id) = changes.country_id {
        if !db::countries::country_exists(&mut *txn, country_id).await? {
            errors.add("country_id", UNKNOWN_COUNTRY);
        }
    }
    if let Some(airport_id) = changes.airport_id {
        if db::airports::airport_exists(&mut *txn, airport_id).await? {
            errors.add("airport_id", DUPLICATE_AIRPORT);
        }
    }

    let airport = errors.into_result(changes)?.into_airport()?;
    db::airports::create_airport(&mut *txn, &airport).await?;
    let created = db::airports::read_airport(&mut *txn, airport.airport_id)
        .await?
        .ok_or(AirportError::AirportNotFound(airport.airport_id))?;

    txn.commit().await?;
    record_mutation("create", airport.airport_id);

    Ok(HttpResponse::Created().json(AirportResponse::from(created)))
}

#[utoipa::path(
    summary = "Retrieve an airport",
    description = "Returns an airport identified by its ID.",
    params(
        ("airport_id" = i64, Path, description = "Unique ID of the airport"),
    ),
    responses(
        (status = 200, description = "Airport retrieved successfully", body = AirportResponse),
        (status = 404, description = "Airport not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[get("/airports/{airport_id}")]
pub async fn read_airport(
    pool: Data<SqlitePool>,
    airport_id: Path<i64>,
) -> Result<impl Responder, AirportError> {
    let airport_id = airport_id.into_inner();

    let airport = db::airports::read_airport(&**pool, airport_id)
        .await?
        .map(AirportResponse::from)
        .ok_or(AirportError::AirportNotFound(airport_id))?;

    Ok(Json(airport))
}

#[utoipa::path(
    summary = "Replace an airport",
    description = "Updates an airport. `name` and `country_id` are required.",
    request_body = AirportRequest,
    params(
        ("airport_id" = i64, Path, description = "Unique ID of the airport"),
    ),
    responses(
        (status = 200, description = "Airport updated successfully", body = AirportResponse),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 404, description = "Airport not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[put("/airports/{airport_id}")]
pub async fn replace_airport(
    pool: Data<SqlitePool>,
    airport_id: Path<i64>,
    body: Json<Map<String, Value>>,
) -> Result<impl Responder, AirportError> {
    let airport =
        apply_airport_changes(&pool, airport_id.into_inner(), &body, ValidationMode::Replace)
            .await?;

    Ok(Json(airport))
}

#[utoipa::path(
    summary = "Update an airport",
    description = "Updates only the fields present in the request body.",
    request_body = AirportRequest,
    params(
        ("airport_id" = i64, Path, description = "Unique ID of the airport"),
    ),
    responses(
        (status = 200, description = "Airport updated successfully", body = AirportResponse),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 404, description = "Airport not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[patch("/airports/{airport_id}")]
pub async fn update_airport(
    pool: Data<SqlitePool>,
    airport_id: Path<i64>,
    body: Json<Map<String, Value>>,
) -> Result<impl Responder, AirportError> {
    let airport =
        apply_airport_changes(&pool, airport_id.into_inner(), &body, ValidationMode::Partial)
            .await?;

    Ok(Json(airport))
}

#[utoipa::path(
    summary = "Delete an airport",
    description = "Deletes an airport identified by its ID.",
    params(
        ("airport_id" = i64, Path, description = "Unique ID of the airport"),
    ),
    responses(
        (status = 204, description = "Airport deleted successfully"),
        (status = 404, description = "Airport not found", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airports"
)]
#[delete("/airports/{airport_id}")]
pub async fn delete_airport(
    pool: Data<SqlitePool>,
    airport_id: Path<i64>,
) -> Result<impl Responder, AirportError> {
    let airport_id = airport_id.into_inner();

    if !db::airports::delete_airport(&**pool, airport_id).await? {
        return Err(AirportError::AirportNotFound(airport_id));
    }
    record_mutation("delete", airport_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Validates `body` against the stored airport and writes the result back.
async fn apply_airport_changes(
    pool: &SqlitePool,
    airport_id: i64,
    body: &Map<String, Value>,
    mode: ValidationMode,
) -> Result<AirportResponse, AirportError> {
    let mut txn = openflights_store::begin_write(pool).await?;

    let mut airport = db::airports::read_airport(&mut *txn, airport_id)
        .await?
        .ok_or(AirportError::AirportNotFound(airport_id))?
        .airport;

    let (changes, mut errors) = AirportChanges::parse(body, mode);
    if changes.airport_id.is_some_and(|id| id != airport_id) {
        errors.add("airport_id", IMMUTABLE_AIRPORT_ID);
    }
    if let Some(country_id) = changes.country_id {
        if !db::countries::country_exists(&mut *txn, country_id).await? {
            errors.add("country_id", UNKNOWN_COUNTRY);
        }
    }

    errors.into_result(changes)?.apply_to(&mut airport);
    db::airports::update_airport(&mut *txn, &airport).await?;
    let updated = db::airports::read_airport(&mut *txn, airport_id)
        .await?
        .ok_or(AirportError::AirportNotFound(airport_id))?;

    txn.commit().await?;
    record_mutation("update", airport_id);

    Ok(AirportResponse::from(updated))
}
