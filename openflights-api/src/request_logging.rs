use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::{
    Error,
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::{Instrument, info, warn};
use uuid::Uuid;

/// Response header echoing the id of the request span.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wraps every request in a span keyed by a request id and logs when it starts and ends.
///
/// A well formed `x-request-id` sent by the caller is kept, otherwise a new UUID is minted.
/// The id is echoed back on the response.
pub struct RequestLogging;

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggingMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggingMiddleware { service }))
    }
}

pub struct RequestLoggingMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let request_id = incoming_request_id(req.headers())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let peer = req
            .connection_info()
            .peer_addr()
            .map(str::to_owned)
            .unwrap_or_default();

        let span = tracing::info_span!(
            "request",
            %request_id,
            method = %req.method(),
            route = %req.path(),
            query = %req.query_string(),
            http_version = ?req.version(),
            agent = header_or_empty(req.headers(), "user-agent"),
            peer = %peer,
        );
        span.in_scope(|| info!("request started"));

        let pending = self.service.call(req);

        Box::pin(
            async move {
                let outcome = pending.await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                match outcome {
                    Ok(mut response) => {
                        record_response(&response, elapsed_ms);
                        if let Ok(value) = HeaderValue::from_str(&request_id) {
                            response.headers_mut().insert(REQUEST_ID_HEADER, value);
                        }
                        Ok(response)
                    }
                    Err(error) => {
                        warn!(%error, elapsed_ms, "request aborted");
                        Err(error)
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// Returns the caller supplied request id, if it is usable as a header value again.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_owned)
}

fn header_or_empty<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn record_response<B>(response: &ServiceResponse<B>, elapsed_ms: u64) {
    let status = response.status();
    if status.is_server_error() {
        warn!(status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        info!(status = status.as_u16(), elapsed_ms, "request finished");
    }
}
