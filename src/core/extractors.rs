//! Axum extractors for validated query params
//!
//! The middleware stores each validated object in a [`ParsedQueries`]
//! request extension, keyed by the validator's destination key. Handlers
//! read it back with [`ParsedQuery`] (default key) or [`ParsedQueries`]
//! (any key).

use std::collections::HashMap;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Extensions, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::DEFAULT_DESTINATION_KEY;

/// Validated query objects attached to a request, by destination key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQueries(HashMap<String, Value>);

impl ParsedQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the value stored under `key`
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize the value stored under `key`
    pub fn parse<T: DeserializeOwned>(&self, key: &str) -> Result<T, ExtractorError> {
        let value = self.get(key).ok_or_else(|| ExtractorError::Missing {
            key: key.to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| ExtractorError::Deserialize {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Read the store from request extensions
    pub fn from_extensions(extensions: &Extensions) -> Option<&Self> {
        extensions.get::<Self>()
    }
}

/// Errors that can occur during extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Nothing stored under the key; the validation layer is not installed
    Missing { key: String },
    /// The stored value does not fit the requested type
    Deserialize { key: String, message: String },
}

impl std::fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractorError::Missing { key } => {
                write!(f, "No validated query params stored under '{}'", key)
            }
            ExtractorError::Deserialize { key, message } => {
                write!(f, "Validated query params '{}' could not be read: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ExtractorError {}

impl IntoResponse for ExtractorError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "query params extraction failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for ParsedQueries
where
    S: Send + Sync,
{
    type Rejection = ExtractorError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions)
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor for the query params validated under the default key
///
/// # Usage
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Paging { page: u32 }
///
/// async fn list(ParsedQuery(paging): ParsedQuery<Paging>) -> String {
///     format!("page {}", paging.page)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ParsedQuery<T = Value>(pub T);

impl<T: DeserializeOwned> ParsedQuery<T> {
    /// Read the value validated under `key`
    pub fn from_extensions(extensions: &Extensions, key: &str) -> Result<Self, ExtractorError> {
        ParsedQueries::from_extensions(extensions)
            .ok_or_else(|| ExtractorError::Missing {
                key: key.to_string(),
            })?
            .parse(key)
            .map(ParsedQuery)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for ParsedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ParsedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ExtractorError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_extensions(&parts.extensions, DEFAULT_DESTINATION_KEY)
    }
}
