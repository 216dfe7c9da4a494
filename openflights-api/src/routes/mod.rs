use actix_web::{HttpResponse, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::FieldErrors;

pub mod airlines;
pub mod airports;
pub mod countries;
pub mod health_check;
pub mod metrics;

/// Body of every error response other than validation failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = "The airport with id 609 was not found")]
    pub error: String,
}

/// Message returned in place of internal storage errors.
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// Builds a JSON response carrying `{"error": message}`.
pub fn error_message_response(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorMessage { error: message })
}

/// Builds a `400 Bad Request` response carrying the field error map.
pub fn field_errors_response(errors: &FieldErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(errors)
}
