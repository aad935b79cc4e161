use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

/// Log lines only carry this much of the body; the client still gets all of it.
const MAX_LOGGED_BODY_BYTES: usize = 1024;

/// Logs the body of every 5xx response before handing it back to the client.
/// Clients only ever see the generic error body, so the method, path and
/// status recorded here are what ties a report back to the handler logs.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                error!("Failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        let shown = &bytes[..bytes.len().min(MAX_LOGGED_BODY_BYTES)];
        error!(
            "Server error - {} {} - Status: {}, Body: {}",
            method,
            path,
            parts.status,
            String::from_utf8_lossy(shown)
        );

        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
