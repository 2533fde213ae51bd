//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State, rejection::PathRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::application::services::RedirectOutcome;
use crate::domain::entities::RequestMeta;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short key to its destination.
///
/// # Endpoint
///
/// `GET /u/{key}`
///
/// # Request Flow
///
/// 1. Collect client IP, `User-Agent` and `Referer`
/// 2. Resolve the key through [`crate::application::services::RedirectService`]
///    (decode, look up, record the hit)
/// 3. Render the outcome
///
/// # Responses
///
/// - **301 Moved Permanently** with `Location` and `Cache-Control: no-cache`
/// - **404 Not Found** for malformed or unknown keys (indistinguishable),
///   including keys that do not percent-decode to UTF-8
/// - **503 Service Unavailable** when the link store cannot be reached
pub async fn redirect_handler(
    key: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let key = match key {
        Ok(Path(key)) => key,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejecting undecodable short key");
            return RedirectOutcome::NotFound.into_response();
        }
    };

    let meta = RequestMeta::new(
        Some(client_ip(&headers, addr, state.behind_proxy)),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    state.redirect_service.resolve(&key, meta).await.into_response()
}

/// Answers `GET /u` (an empty key) the same way as any other malformed key.
pub async fn missing_key_handler() -> Response {
    RedirectOutcome::NotFound.into_response()
}

impl IntoResponse for RedirectOutcome {
    fn into_response(self) -> Response {
        match self {
            RedirectOutcome::Redirect {
                destination,
                permanent,
                cacheable,
            } => {
                let status = if permanent {
                    StatusCode::MOVED_PERMANENTLY
                } else {
                    StatusCode::TEMPORARY_REDIRECT
                };
                let cache_control = if cacheable { "public" } else { "no-cache" };

                (
                    status,
                    [
                        (header::LOCATION, destination),
                        (header::CACHE_CONTROL, cache_control.to_string()),
                    ],
                )
                    .into_response()
            }
            RedirectOutcome::NotFound => {
                AppError::not_found("Short link not found", json!({})).into_response()
            }
            RedirectOutcome::Unavailable => {
                AppError::unavailable("Link store unavailable", json!({})).into_response()
            }
        }
    }
}
