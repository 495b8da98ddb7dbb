use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Logs `METHOD /path - status - Nms` once the response is ready.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::error!("{} {} - {} - {}ms", method, uri, status.as_u16(), elapsed_ms);
    } else {
        tracing::info!("{} {} - {} - {}ms", method, uri, status.as_u16(), elapsed_ms);
    }

    response
}
