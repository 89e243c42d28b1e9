//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{HealthResponse, SubmitResponse};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the submission endpoint
#[derive(OpenApi)]
#[openapi(
    info(
        title = "stepform API",
        description = "Receives the values collected by the sign-up wizard.",
        license(name = "MIT")
    ),
    paths(
        crate::rest::routes::health::health,
        crate::rest::routes::submit::submit,
    ),
    components(schemas(HealthResponse, SubmitResponse, ErrorResponse)),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Submission", description = "Form submission"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::json().expect("Failed to generate OpenAPI spec");
        assert!(spec.contains("stepform API"));
        assert!(spec.contains("/api/health"));
        assert!(spec.contains("/api/submit"));
    }

    #[test]
    fn test_openapi_has_all_tags() {
        let spec = ApiDoc::json().expect("Failed to generate OpenAPI spec");
        assert!(spec.contains("\"Health\""));
        assert!(spec.contains("\"Submission\""));
    }
}
