//! Typed errors for query param validation
//!
//! Validation can surface exactly two errors to the request pipeline:
//!
//! - [`QueryParamError::InvalidParams`]: the query failed the schema (400)
//! - [`QueryParamError::Unknown`]: the engine failed for any other reason (500)
//!
//! Both keep the underlying engine error as their `source()`.
//!
//! # Example
//!
//! ```rust,ignore
//! match validator.handle(&mut request).await {
//!     Ok(()) => { /* request carries the parsed query */ }
//!     Err(err) if err.status() == StatusCode::BAD_REQUEST => {
//!         for detail in err.validation_errors() {
//!             println!("{}: {}", detail.path, detail.message);
//!         }
//!     }
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Message carried by every 400 error
pub const INVALID_PARAMS_MESSAGE: &str = "The request contained invalid query params.";

/// Message carried by every 500 error
pub const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred while parsing query params.";

// =============================================================================
// Engine errors
// =============================================================================

/// One field-level failure reported by a schema engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Human-readable message, e.g. `"username" is required`
    pub message: String,

    /// Dotted path to the failing value, e.g. `tags.1`
    pub path: String,

    /// Error type code, e.g. `any.required`
    #[serde(rename = "type")]
    pub kind: String,

    /// Extra data about the failure; always holds `key`
    pub context: Map<String, Value>,
}

impl ValidationErrorDetail {
    /// Detail for the value at `path`, whose own key is `key`
    pub fn new(
        path: impl Into<String>,
        key: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut context = Map::new();
        context.insert("key".to_string(), Value::String(key.into()));
        Self {
            message: message.into(),
            path: path.into(),
            kind: kind.into(),
            context,
        }
    }

    /// Add a context entry
    pub fn with_context(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.context.insert(name.to_string(), value.into());
        self
    }

    /// Key of the failing value
    pub fn key(&self) -> Option<&str> {
        self.context.get("key").and_then(Value::as_str)
    }
}

/// Validation-class failure: the input does not satisfy the schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub details: Vec<ValidationErrorDetail>,
}

impl ValidationReport {
    pub fn new(details: Vec<ValidationErrorDetail>) -> Self {
        Self { details }
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<&str> = self.details.iter().map(|d| d.message.as_str()).collect();
        write!(f, "ValidationError: {}", msgs.join(". "))
    }
}

impl std::error::Error for ValidationReport {}

/// Error returned by a [`SchemaValidator`](crate::core::validation::SchemaValidator)
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationReport),

    /// The engine itself failed
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Errors raised while building a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid pattern /{pattern}/: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid schema rule: {message}")]
    InvalidRule { message: String },
}

// =============================================================================
// Errors surfaced to the request pipeline
// =============================================================================

/// Error handed to the next stage when query validation does not succeed
#[derive(Debug, Error)]
pub enum QueryParamError {
    /// Query params failed the schema
    #[error("The request contained invalid query params.")]
    InvalidParams {
        #[source]
        report: ValidationReport,
    },

    /// The engine failed with a non-validation error
    #[error("an unknown error occurred while parsing query params.")]
    Unknown {
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Machine-readable detail attached to 400 errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDetail {
    #[serde(rename = "validationErrors")]
    pub validation_errors: Vec<ValidationErrorDetail>,
}

/// Body rendered for a [`QueryParamError`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    #[serde(rename = "jsonDetail", skip_serializing_if = "Option::is_none")]
    pub json_detail: Option<JsonDetail>,
}

impl QueryParamError {
    /// Classify an engine error into the 400 or 500 shape
    pub fn from_engine(err: EngineError) -> Self {
        match err {
            EngineError::Validation(report) => QueryParamError::InvalidParams { report },
            EngineError::Internal(cause) => QueryParamError::Unknown {
                cause: cause.into(),
            },
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            QueryParamError::InvalidParams { .. } => StatusCode::BAD_REQUEST,
            QueryParamError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryParamError::InvalidParams { .. } => "INVALID_QUERY_PARAMS",
            QueryParamError::Unknown { .. } => "QUERY_PARAMS_INTERNAL_ERROR",
        }
    }

    /// Field-level detail, only present on 400 errors
    pub fn json_detail(&self) -> Option<JsonDetail> {
        match self {
            QueryParamError::InvalidParams { report } => Some(JsonDetail {
                validation_errors: report.details.clone(),
            }),
            QueryParamError::Unknown { .. } => None,
        }
    }

    /// Field-level failures (empty for 500 errors)
    pub fn validation_errors(&self) -> &[ValidationErrorDetail] {
        match self {
            QueryParamError::InvalidParams { report } => &report.details,
            QueryParamError::Unknown { .. } => &[],
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.to_string(),
            status: self.status().as_u16(),
            json_detail: self.json_detail(),
        }
    }
}

impl From<EngineError> for QueryParamError {
    fn from(err: EngineError) -> Self {
        QueryParamError::from_engine(err)
    }
}

impl IntoResponse for QueryParamError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// A specialized Result type for query param validation
pub type QueryParamResult<T> = Result<T, QueryParamError>;
