//! Core module containing the validation engine, policy and error types

pub mod error;
pub mod extractors;
pub mod policy;
pub mod query;
pub mod validation;

pub use error::{
    EngineError, JsonDetail, QueryParamError, QueryParamResult, SchemaError,
    ValidationErrorDetail, ValidationReport,
};
pub use extractors::{ExtractorError, ParsedQueries, ParsedQuery};
pub use policy::{PolicyOverrides, Presence, ValidationPolicy};
pub use query::RawQuery;
pub use validation::{FieldKind, FieldSchema, QuerySchema, SchemaValidator};
