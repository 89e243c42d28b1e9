//! Liveness check for the submission endpoint.

use axum::Json;

use crate::rest::dto::HealthResponse;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Endpoint is accepting submissions", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
