//! Schema validation engines
//!
//! The middleware never validates anything itself: it hands the raw query
//! object to a [`SchemaValidator`] and classifies the result. [`QuerySchema`]
//! is the engine shipped with the crate; any other engine can be plugged in
//! by implementing the trait.

pub mod filters;
pub mod schema;
pub mod validators;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::error::EngineError;
use crate::core::policy::ValidationPolicy;

pub use filters::StringFilter;
pub use schema::{FieldKind, FieldSchema, QuerySchema};

/// A schema engine able to validate and coerce a query object
///
/// Implementations must report input problems as
/// [`EngineError::Validation`]; anything returned as
/// [`EngineError::Internal`] is surfaced to clients as a 500.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    /// Validate `input`, returning the coerced value on success
    async fn validate(
        &self,
        input: Map<String, Value>,
        policy: &ValidationPolicy,
    ) -> Result<Value, EngineError>;
}

#[async_trait]
impl<T> SchemaValidator for Arc<T>
where
    T: SchemaValidator + ?Sized,
{
    async fn validate(
        &self,
        input: Map<String, Value>,
        policy: &ValidationPolicy,
    ) -> Result<Value, EngineError> {
        (**self).validate(input, policy).await
    }
}
