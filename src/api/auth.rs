//! Shared-secret token check for the write endpoints.
//!
//! The token is read from the configured header (default `Authorization`,
//! with an optional `Bearer ` scheme) and, failing that, from `X-API-KEY`.
//! No token is 401; a token outside the allow-list is 403.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_auth(
    State(auth): State<Arc<AuthConfig>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = extract_token(request.headers(), &auth.header_name);

    if let Err(e) = authorize(token.as_deref(), &auth.allowed_tokens) {
        tracing::warn!(
            "Rejected {} {}: {}",
            request.method(),
            request.uri().path(),
            e
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Token from `header_name`, falling back to `X-API-KEY`. Blank values count as absent.
pub fn extract_token(headers: &HeaderMap, header_name: &str) -> Option<String> {
    let raw = [header_name, API_KEY_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.trim().is_empty())?;

    let token = match raw.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => &raw[7..],
        _ => raw,
    }
    .trim();

    (!token.is_empty()).then(|| token.to_string())
}

pub fn authorize(token: Option<&str>, allowed: &[String]) -> ApiResult<()> {
    let token = token.ok_or(ApiError::AuthRequired)?;

    if allowed.iter().any(|t| t == token) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
