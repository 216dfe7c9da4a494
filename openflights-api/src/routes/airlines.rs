use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Query},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::db;
use crate::db::airlines::{AirlineFilters, AirlineWithCountry, AirlinesDbError};
use crate::routes::{
    ErrorMessage, INTERNAL_SERVER_ERROR, error_message_response, field_errors_response,
};
use crate::validation::{FieldErrors, parse_id_filter};

#[derive(Debug, Error)]
pub enum AirlineError {
    #[error("The airline filters are invalid: {0}")]
    InvalidFilter(#[from] FieldErrors),

    #[error(transparent)]
    AirlinesDb(#[from] AirlinesDbError),
}

impl AirlineError {
    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            AirlineError::AirlinesDb(_) => INTERNAL_SERVER_ERROR.to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for AirlineError {
    fn status_code(&self) -> StatusCode {
        match self {
            AirlineError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            AirlineError::AirlinesDb(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AirlineError::InvalidFilter(errors) => field_errors_response(errors),
            e => {
                error!(error = %e, "airline request failed");
                error_message_response(e.status_code(), e.to_message())
            }
        }
    }
}

/// Filters of `GET /airlines`. Blank values are ignored.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AirlinesQuery {
    /// Exact country id.
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub country_id: Option<String>,
    /// `Y` or `N`, case-insensitive.
    #[param(example = "Y")]
    #[serde(default, deserialize_with = "crate::utils::trim_option_string")]
    pub active: Option<String>,
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AirlineResponse {
    #[schema(example = 4319)]
    pub airline_id: i64,
    #[schema(example = "Scandinavian Airlines System")]
    pub name: String,
    pub alias: Option<String>,
    #[schema(example = "SK")]
    pub iata: Option<String>,
    #[schema(example = "SAS")]
    pub icao: Option<String>,
    #[schema(example = "SCANDINAVIAN")]
    pub callsign: Option<String>,
    #[schema(example = 203)]
    pub country_id: i64,
    #[schema(example = "Sweden")]
    pub country_name: String,
    #[schema(example = "Y")]
    pub active: Option<String>,
}

impl From<AirlineWithCountry> for AirlineResponse {
    fn from(row: AirlineWithCountry) -> Self {
        let airline = row.airline;
        Self {
            airline_id: airline.airline_id,
            name: airline.name,
            alias: airline.alias,
            iata: airline.iata,
            icao: airline.icao,
            callsign: airline.callsign,
            country_id: airline.country_id,
            country_name: row.country_name,
            active: airline.active,
        }
    }
}

#[utoipa::path(
    summary = "List airlines",
    description = "Returns at most 200 airlines ordered by id, optionally filtered.",
    params(AirlinesQuery),
    responses(
        (status = 200, description = "Airlines listed successfully", body = Vec<AirlineResponse>),
        (status = 400, description = "Bad request", body = FieldErrors),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Airlines"
)]
#[get("/airlines")]
pub async fn read_all_airlines(
    pool: Data<SqlitePool>,
    query: Query<AirlinesQuery>,
) -> Result<impl Responder, AirlineError> {
    let query = query.into_inner();
    let filters = AirlineFilters {
        country_id: parse_id_filter("country_id", query.country_id.as_deref())?,
        active: query.active,
        iata: query.iata,
        icao: query.icao,
        q: query.q,
    };

    let airlines: Vec<AirlineResponse> = db::airlines::list_airlines(&**pool, &filters)
        .await?
        .into_iter()
        .map(AirlineResponse::from)
        .collect();

    Ok(Json(airlines))
}
