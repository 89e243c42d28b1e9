//! Submission endpoint.
//!
//! The server side of the submission collaborator: acknowledges and logs
//! submitted form data. Nothing is stored.

use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;

pub use openapi::ApiDoc;

/// Path the wizard POSTs its values to
pub const SUBMIT_PATH: &str = "/api/submit";

/// Build the API router with all routes
pub fn build_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route(SUBMIT_PATH, post(routes::submit::submit))
        .route("/api/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(ApiDoc::openapi())
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_listener<F>(listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Submission endpoint listening on http://{}{}", addr, SUBMIT_PATH);

    axum::serve(listener, build_router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Submission endpoint failed")
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_listener(listener, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down submission endpoint");
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_openapi_route() {
        let response = build_router()
            .oneshot(
                Request::builder()
                    .uri("/api/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["paths"].get(SUBMIT_PATH).is_some());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = build_router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_listener_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = serve_listener(listener, async {}).await;
        assert!(result.is_ok());
    }
}
