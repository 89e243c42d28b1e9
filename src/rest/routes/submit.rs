//! Form submission endpoint.

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::rest::dto::SubmitResponse;
use crate::rest::error::ApiError;
use crate::submit::DEFAULT_ACK_MESSAGE;
use crate::wizard::schema::SECRET_FIELDS;

const MASK: &str = "********";

/// Copy of a submission with secret values replaced, safe to log
fn masked(payload: &serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    payload
        .iter()
        .map(|(key, value)| {
            let value = if SECRET_FIELDS.contains(&key.as_str()) && !value.is_null() {
                Value::String(MASK.to_string())
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

/// Receive submitted form values.
///
/// The payload is logged and acknowledged. It is not validated or stored.
#[utoipa::path(
    post,
    path = "/api/submit",
    tag = "Submission",
    request_body(
        content = std::collections::HashMap<String, serde_json::Value>,
        description = "Form values keyed by field name"
    ),
    responses(
        (status = 200, description = "Submission received", body = SubmitResponse),
        (status = 400, description = "Body is not a JSON object", body = crate::rest::error::ErrorResponse)
    )
)]
pub async fn submit(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(payload) = payload?;
    let Value::Object(fields) = payload else {
        return Err(ApiError::BadRequest(
            "expected a JSON object of field values".to_string(),
        ));
    };

    let id = Uuid::new_v4();
    let logged = Value::Object(masked(&fields));
    tracing::info!(
        submission = %id,
        fields = fields.len(),
        payload = %logged,
        "Form submission received"
    );

    Ok(Json(SubmitResponse {
        message: DEFAULT_ACK_MESSAGE.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::build_router;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    async fn post(body: &str) -> (StatusCode, Value) {
        let response = build_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_submit_acknowledges_object() {
        let (status, body) = post(r#"{"name":"Jo","terms":true,"phone":null}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Form submitted successfully" }));
    }

    #[tokio::test]
    async fn test_submit_accepts_empty_object() {
        let (status, _) = post("{}").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submit_rejects_non_object() {
        let (status, body) = post("[1, 2, 3]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_json() {
        let (status, body) = post("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[test]
    fn test_masked_hides_secrets() {
        let payload = json!({
            "username": "jo",
            "password": "Abcd1234",
            "confirmPassword": "Abcd1234",
        });
        let Value::Object(fields) = payload else {
            unreachable!()
        };

        let out = masked(&fields);
        assert_eq!(out["username"], "jo");
        assert_eq!(out["password"], MASK);
        assert_eq!(out["confirmPassword"], MASK);
    }

    #[test]
    fn test_masked_leaves_empty_secret_alone() {
        let payload = json!({ "password": null });
        let Value::Object(fields) = payload else {
            unreachable!()
        };
        assert!(masked(&fields)["password"].is_null());
    }
}
