//! Query param validation middleware
//!
//! [`QueryParamValidator`] validates a request's query string against a
//! schema and either stores the coerced result on the request or returns a
//! [`QueryParamError`]. It can be mounted three ways:
//!
//! - [`QueryParamValidator::handle`] directly, from any request pipeline
//! - [`QueryParamLayer`] as a tower layer
//! - [`validate_query`] with `axum::middleware::from_fn_with_state`
//!
//! # Example
//!
//! ```rust,ignore
//! let validator = QueryParamValidator::new(
//!     QuerySchema::new().field("page", FieldSchema::integer().min(1.0)),
//! );
//!
//! let app = Router::new()
//!     .route("/items", get(list_items))
//!     .layer(validator.layer());
//!
//! async fn list_items(ParsedQuery(query): ParsedQuery) -> Json<Value> {
//!     Json(query)
//! }
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{Request, State};
use axum::http::Extensions;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde_json::Value;
use tower::{Layer, Service};

use crate::config::ValidatorConfig;
use crate::core::error::{EngineError, QueryParamError, QueryParamResult};
use crate::core::extractors::ParsedQueries;
use crate::core::policy::{PolicyOverrides, ValidationPolicy};
use crate::core::query::RawQuery;
use crate::core::validation::SchemaValidator;

/// Places a validated value on the request after successful validation
///
/// The default, [`ExtensionPlacement`], stores it in [`ParsedQueries`]
/// under the destination key. Closures with the same signature also work.
pub trait Placement: Send + Sync {
    fn place(&self, extensions: &mut Extensions, destination_key: &str, value: Value);
}

impl<F> Placement for F
where
    F: Fn(&mut Extensions, &str, Value) + Send + Sync,
{
    fn place(&self, extensions: &mut Extensions, destination_key: &str, value: Value) {
        self(extensions, destination_key, value)
    }
}

/// Stores the value in the request's [`ParsedQueries`] extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionPlacement;

impl Placement for ExtensionPlacement {
    fn place(&self, extensions: &mut Extensions, destination_key: &str, value: Value) {
        match extensions.get_mut::<ParsedQueries>() {
            Some(queries) => {
                queries.insert(destination_key, value);
            }
            None => {
                let mut queries = ParsedQueries::new();
                queries.insert(destination_key, value);
                extensions.insert(queries);
            }
        }
    }
}

/// Validates request query params against a schema
///
/// Schema, policy and destination key are fixed at construction and
/// shared by every request; cloning is cheap.
#[derive(Clone)]
pub struct QueryParamValidator {
    engine: Arc<dyn SchemaValidator>,
    policy: ValidationPolicy,
    destination_key: Arc<str>,
    placement: Arc<dyn Placement>,
}

impl std::fmt::Debug for QueryParamValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParamValidator")
            .field("policy", &self.policy)
            .field("destination_key", &self.destination_key)
            .finish_non_exhaustive()
    }
}

/// Build a validator from a schema and construction options
pub fn create<V>(schema: V, config: &ValidatorConfig) -> QueryParamValidator
where
    V: SchemaValidator + 'static,
{
    QueryParamValidator::new(schema).with_config(config)
}

impl QueryParamValidator {
    /// Validator with the default policy and destination key
    pub fn new<V>(schema: V) -> Self
    where
        V: SchemaValidator + 'static,
    {
        let config = ValidatorConfig::default();
        Self {
            engine: Arc::new(schema),
            policy: config.policy(),
            destination_key: Arc::from(config.destination_key()),
            placement: Arc::new(ExtensionPlacement),
        }
    }

    /// Apply a full configuration (destination key and policy overrides)
    pub fn with_config(self, config: &ValidatorConfig) -> Self {
        Self {
            policy: config.policy(),
            destination_key: Arc::from(config.destination_key()),
            ..self
        }
    }

    pub fn with_destination_key(mut self, key: impl AsRef<str>) -> Self {
        let config = ValidatorConfig::new().with_destination_key(key.as_ref());
        self.destination_key = Arc::from(config.destination_key());
        self
    }

    /// Merge `overrides` over the default policy
    pub fn with_policy_overrides(mut self, overrides: &PolicyOverrides) -> Self {
        self.policy = ValidationPolicy::default().merge(overrides);
        self
    }

    /// Replace how validated values are put on the request
    pub fn with_placement<P>(mut self, placement: P) -> Self
    where
        P: Placement + 'static,
    {
        self.placement = Arc::new(placement);
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn destination_key(&self) -> &str {
        &self.destination_key
    }

    /// Validate a decoded query without touching any request
    pub async fn validate(&self, query: RawQuery) -> QueryParamResult<Value> {
        self.engine
            .validate(query.into_inner(), &self.policy)
            .await
            .map_err(|err| {
                match &err {
                    EngineError::Validation(report) => tracing::debug!(
                        destination_key = %self.destination_key,
                        errors = report.details.len(),
                        "query params rejected"
                    ),
                    EngineError::Internal(cause) => tracing::error!(
                        destination_key = %self.destination_key,
                        error = %cause,
                        "query params engine failure"
                    ),
                }
                QueryParamError::from_engine(err)
            })
    }

    /// Validate the request's query string and store the result on it
    ///
    /// `Ok(())` means the request now carries the validated value under the
    /// destination key; on `Err` the request is left untouched.
    pub async fn handle<B>(&self, request: &mut Request<B>) -> QueryParamResult<()> {
        let query = RawQuery::from_uri(request.uri());
        let value = self.validate(query).await?;

        tracing::debug!(
            destination_key = %self.destination_key,
            fields = value.as_object().map(|o| o.len()).unwrap_or_default(),
            "query params validated"
        );
        self.placement
            .place(request.extensions_mut(), &self.destination_key, value);
        Ok(())
    }

    /// Tower layer running this validator in front of a service
    pub fn layer(&self) -> QueryParamLayer {
        QueryParamLayer::new(self.clone())
    }
}

/// Middleware function for `axum::middleware::from_fn_with_state`
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/items", get(list_items))
///     .layer(middleware::from_fn_with_state(validator, validate_query));
/// ```
pub async fn validate_query(
    State(validator): State<QueryParamValidator>,
    mut request: Request,
    next: Next,
) -> Response {
    match validator.handle(&mut request).await {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// [`Layer`] applying a [`QueryParamValidator`] to the wrapped service
#[derive(Debug, Clone)]
pub struct QueryParamLayer {
    validator: QueryParamValidator,
}

impl QueryParamLayer {
    pub fn new(validator: QueryParamValidator) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for QueryParamLayer {
    type Service = QueryParamService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        QueryParamService {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Service produced by [`QueryParamLayer`]
///
/// Invalid requests are answered with the rendered [`QueryParamError`]
/// and never reach the inner service.
#[derive(Debug, Clone)]
pub struct QueryParamService<S> {
    inner: S,
    validator: QueryParamValidator,
}

impl<S, B> Service<Request<B>> for QueryParamService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        // the readied service goes into the future, a fresh clone stays behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = self.validator.clone();

        Box::pin(async move {
            match validator.handle(&mut request).await {
                Ok(()) => inner.call(request).await,
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}
