use axum::http::StatusCode;
use axum::response::IntoResponse;
use blog_core::{ApiError, FieldError, ValidationErrorResponse};
use http_body_util::BodyExt;

async fn error_parts(err: ApiError) -> (StatusCode, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn bad_request_has_only_an_error_field() {
    let (status, body) = error_parts(ApiError::BadRequest("invalid input".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "invalid input" }));
}

#[tokio::test]
async fn not_found_status() {
    let (status, body) = error_parts(ApiError::NotFound("nothing here".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "nothing here");
}

#[tokio::test]
async fn validation_carries_summary_and_details() {
    let resp = ValidationErrorResponse {
        message: "title and content are required".into(),
        errors: vec![FieldError {
            field: "title".into(),
            message: "not set".into(),
            code: "validation".into(),
        }],
    };
    let (status, body) = error_parts(ApiError::Validation(resp)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title and content are required");
    assert_eq!(body["details"][0]["field"], "title");
}

#[tokio::test]
async fn internal_exposes_error_and_underlying_message() {
    let err = ApiError::internal("failed to publish article", "connection refused");
    let (status, body) = error_parts(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "failed to publish article");
    assert_eq!(body["message"], "connection refused");
}

#[test]
fn display_formatting() {
    assert_eq!(ApiError::BadRequest("w".into()).to_string(), "Bad Request: w");
    assert_eq!(ApiError::NotFound("x".into()).to_string(), "Not Found: x");
    assert_eq!(
        ApiError::internal("insert failed", "timeout").to_string(),
        "Internal Error: insert failed: timeout"
    );
}
