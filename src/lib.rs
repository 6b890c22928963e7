//! # Query Params
//!
//! Query parameter validation middleware for axum and tower.
//!
//! ## Features
//!
//! - **Schema-Driven**: Declare expected params once with [`QuerySchema`](core::QuerySchema)
//! - **Type Coercion**: Raw query strings become numbers, booleans and arrays
//! - **Strict by Default**: Unknown params are rejected, fields are required
//! - **Tunable Policy**: Every policy switch can be overridden per validator
//! - **Pluggable Engine**: Bring your own engine through [`SchemaValidator`](core::SchemaValidator)
//! - **Typed Errors**: 400 with field-level detail, 500 for engine failures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use query_params::prelude::*;
//!
//! let validator = QueryParamValidator::new(
//!     QuerySchema::new()
//!         .field("page", FieldSchema::integer().min(1.0))
//!         .field("sort", FieldSchema::string().valid(["asc", "desc"]).optional()),
//! );
//!
//! let app = Router::new()
//!     .route("/items", get(list_items))
//!     .layer(validator.layer());
//!
//! async fn list_items(ParsedQuery(query): ParsedQuery) -> Json<Value> {
//!     // GET /items?page=5  ->  {"page": 5}
//!     Json(query)
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Engine ===
    pub use crate::core::{
        policy::{PolicyOverrides, Presence, ValidationPolicy},
        query::RawQuery,
        validation::{FieldKind, FieldSchema, QuerySchema, SchemaValidator},
    };

    // === Errors ===
    pub use crate::core::error::{
        EngineError, JsonDetail, QueryParamError, QueryParamResult, SchemaError,
        ValidationErrorDetail, ValidationReport,
    };

    // === Extraction ===
    pub use crate::core::extractors::{ExtractorError, ParsedQueries, ParsedQuery};

    // === Config ===
    pub use crate::config::{DEFAULT_DESTINATION_KEY, ValidatorConfig};

    // === Middleware ===
    pub use crate::server::{
        ExtensionPlacement, Placement, QueryParamLayer, QueryParamService, QueryParamValidator,
        create, validate_query,
    };

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::{Json, Router, routing::get};
}
