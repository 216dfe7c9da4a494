use actix_web::{HttpResponse, Responder, get, web::ThinData};
use metrics_exporter_prometheus::PrometheusHandle;

#[utoipa::path(
    summary = "Render metrics",
    description = "Returns the service metrics in the Prometheus text format.",
    responses(
        (status = 200, description = "Metrics rendered", body = String),
    ),
    tag = "Metrics"
)]
#[get("/metrics")]
pub async fn metrics(handle: ThinData<PrometheusHandle>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(handle.render())
}
