//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /u/{key}` - Short key redirect (public)
//! - `GET  /u`       - Empty key, always 404
//! - `GET  /health`  - Health check: link store, hit queue, cache
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, missing_key_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Handlers extract `ConnectInfo<SocketAddr>`, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/u", get(missing_key_handler))
        .route("/u/{key}", get(redirect_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockHitRepository, MockLinkRepository};
    use crate::infrastructure::cache::NullCache;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockHitRepository::new()),
            Arc::new(NullCache::new()),
        )
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app_router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_empty_key_is_json_not_found() {
        for uri in ["/u", "/u/"] {
            let (status, json) = get_json(uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(json["error"]["code"], "not_found", "{uri}");
        }
    }
}
