use actix_web::{HttpResponse, Responder, get};

#[utoipa::path(
    summary = "Check API health",
    description = "Returns 200 OK when the API is running.",
    responses(
        (status = 200, description = "API is healthy", body = String),
    ),
    tag = "Health"
)]
#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
