//! Raw query string decoding
//!
//! Turns the query part of a request URI into the mapping handed to a
//! schema engine: a key seen once maps to a string, a repeated key maps to
//! an array of strings.

use axum::http::Uri;
use serde_json::{Map, Value};

/// Decoded, not yet validated, query parameters
///
/// # Example
/// ```rust,ignore
/// // GET /items?page=2&tag=a&tag=b
/// let raw = RawQuery::from_uri(req.uri());
/// // {"page": "2", "tag": ["a", "b"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery(Map<String, Value>);

impl RawQuery {
    /// Decode a `application/x-www-form-urlencoded` query string
    pub fn parse(query: &str) -> Self {
        let mut params = Map::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Value::String(value.into_owned());
            match params.get_mut(&*key) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    params.insert(key.into_owned(), value);
                }
            }
        }

        Self(params)
    }

    /// Decode the query part of a URI (empty when there is none)
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawQuery {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
