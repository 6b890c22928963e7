//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Engine errors are classified into the right shape

use std::error::Error as _;

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use query_params::prelude::*;

fn required(key: &str) -> ValidationErrorDetail {
    ValidationErrorDetail::new(key, key, "any.required", format!("\"{}\" is required", key))
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_validation_report_returns_400() {
        let err: QueryParamError =
            EngineError::Validation(ValidationReport::new(vec![required("q")])).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMS");
    }

    #[test]
    fn test_internal_engine_error_returns_500() {
        let err: QueryParamError = EngineError::Internal(anyhow::anyhow!("boom")).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "QUERY_PARAMS_INTERNAL_ERROR");
    }
}

// =============================================================================
// Response Body Tests
// =============================================================================

mod response_tests {
    use super::*;

    #[tokio::test]
    async fn test_400_response_body() {
        let err: QueryParamError = EngineError::Validation(ValidationReport::new(vec![
            required("username"),
        ]))
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "The request contained invalid query params.");
        assert_eq!(body["jsonDetail"]["validationErrors"][0]["type"], "any.required");
        assert_eq!(body["jsonDetail"]["validationErrors"][0]["context"]["key"], "username");
    }

    #[tokio::test]
    async fn test_500_response_body_hides_cause() {
        let err: QueryParamError =
            EngineError::Internal(anyhow::anyhow!("secret connection string")).into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("an unknown error occurred while parsing query params."));
    }
}

// =============================================================================
// Cause Tests
// =============================================================================

mod cause_tests {
    use super::*;

    #[test]
    fn test_validation_cause_is_the_report() {
        let report = ValidationReport::new(vec![required("a"), required("b")]);
        let err: QueryParamError = EngineError::Validation(report.clone()).into();

        let cause = err
            .source()
            .and_then(|e| e.downcast_ref::<ValidationReport>())
            .unwrap();
        assert_eq!(cause, &report);
        assert_eq!(
            cause.to_string(),
            "ValidationError: \"a\" is required. \"b\" is required"
        );
    }

    #[test]
    fn test_internal_cause_keeps_message() {
        let err: QueryParamError = EngineError::Internal(anyhow::anyhow!("timeout")).into();
        assert_eq!(err.source().unwrap().to_string(), "timeout");
    }

    #[test]
    fn test_error_matching() {
        let err: QueryParamError =
            EngineError::Validation(ValidationReport::new(vec![required("q")])).into();

        match err {
            QueryParamError::InvalidParams { report } => {
                assert_eq!(report.details[0].path, "q");
            }
            QueryParamError::Unknown { .. } => panic!("expected a validation error"),
        }
    }
}
