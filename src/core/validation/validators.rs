//! Reusable field validators
//!
//! Each validator checks (and with conversion enabled, coerces) one raw
//! value. Failures come back as a [`ValidationErrorDetail`] whose message
//! quotes the key of the failing value.

use crate::core::error::ValidationErrorDetail;
use regex::Regex;
use serde_json::{Number, Value};

pub type Check<T> = Result<T, ValidationErrorDetail>;

/// Location of a value in the query: dotted path plus its own key
///
/// Top-level keys are taken verbatim, dots included; array items are keyed
/// by their index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    path: String,
    key: String,
}

impl FieldPath {
    pub fn root(key: &str) -> Self {
        Self {
            path: key.to_string(),
            key: key.to_string(),
        }
    }

    pub fn item(&self, index: usize) -> Self {
        Self {
            path: format!("{}.{}", self.path, index),
            key: index.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn fail(at: &FieldPath, kind: &str, tail: impl std::fmt::Display) -> ValidationErrorDetail {
    ValidationErrorDetail::new(&at.path, &at.key, kind, format!("\"{}\" {}", at.key, tail))
}

// 2^53: beyond this an f64 no longer holds every integer exactly
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

fn limit_value(limit: f64) -> Value {
    if limit.fract() == 0.0 && limit.abs() < MAX_SAFE_FLOAT {
        Value::from(limit as i64)
    } else {
        Number::from_f64(limit).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Store whole floats (`5.0`) as integers so typed readers accept them
fn normalize(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < MAX_SAFE_FLOAT => Number::from(f as i64),
        _ => n,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validator: field is required but missing
pub fn required(at: &FieldPath) -> ValidationErrorDetail {
    fail(at, "any.required", "is required")
}

/// Validator: field is present but must not be
pub fn forbidden(at: &FieldPath) -> ValidationErrorDetail {
    fail(at, "any.unknown", "is not allowed")
}

/// Validator: key is not declared by the schema
pub fn unknown_key(at: &FieldPath) -> ValidationErrorDetail {
    fail(at, "object.allowUnknown", "is not allowed")
}

/// Validator: value must be a string
pub fn string(at: &FieldPath, value: Value) -> Check<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(fail(at, "string.base", "must be a string").with_context("value", other)),
    }
}

/// Validator: string must not be empty
pub fn non_empty(at: &FieldPath, value: &str) -> Check<()> {
    if value.is_empty() {
        Err(fail(at, "any.empty", "is not allowed to be empty").with_context("value", value))
    } else {
        Ok(())
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Some(Number::from(u));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

/// Validator: value must be a number, parsed from a string when converting
///
/// Whole values come back as integers, so `"5.0"` yields `5`.
pub fn number(at: &FieldPath, value: Value, convert: bool) -> Check<Number> {
    match value {
        Value::Number(n) => Ok(normalize(n)),
        Value::String(s) if convert => parse_number(&s)
            .map(normalize)
            .ok_or_else(|| fail(at, "number.base", "must be a number").with_context("value", s)),
        other => Err(fail(at, "number.base", "must be a number").with_context("value", other)),
    }
}

/// Validator: number must have no fractional part
pub fn integer(at: &FieldPath, value: Number) -> Check<Number> {
    let value = normalize(value);
    if value.is_i64() || value.is_u64() {
        return Ok(value);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 => Ok(value),
        _ => Err(fail(at, "number.integer", "must be an integer")
            .with_context("value", Value::Number(value))),
    }
}

/// Validator: value must be a boolean, parsed from `true`/`false` when converting
pub fn boolean(at: &FieldPath, value: Value, convert: bool) -> Check<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::String(ref s) if convert && s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(ref s) if convert && s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(fail(at, "boolean.base", "must be a boolean").with_context("value", other)),
    }
}

/// Validator: value must be an array; `single` wraps a lone value when converting
pub fn array(at: &FieldPath, value: Value, convert: bool, single: bool) -> Check<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other if convert && single => Ok(vec![other]),
        other => Err(fail(at, "array.base", "must be an array").with_context("value", other)),
    }
}

/// Validator: number must not be below `limit`
pub fn number_min(at: &FieldPath, value: f64, limit: f64) -> Check<()> {
    if value < limit {
        Err(fail(
            at,
            "number.min",
            format!("must be larger than or equal to {}", limit),
        )
        .with_context("limit", limit_value(limit))
        .with_context("value", limit_value(value)))
    } else {
        Ok(())
    }
}

/// Validator: number must not exceed `limit`
pub fn number_max(at: &FieldPath, value: f64, limit: f64) -> Check<()> {
    if value > limit {
        Err(fail(
            at,
            "number.max",
            format!("must be less than or equal to {}", limit),
        )
        .with_context("limit", limit_value(limit))
        .with_context("value", limit_value(value)))
    } else {
        Ok(())
    }
}

/// Validator: string must have at least `limit` characters
pub fn string_min(at: &FieldPath, value: &str, limit: usize) -> Check<()> {
    if value.chars().count() < limit {
        Err(fail(
            at,
            "string.min",
            format!("length must be at least {} characters long", limit),
        )
        .with_context("limit", limit)
        .with_context("value", value))
    } else {
        Ok(())
    }
}

/// Validator: string must have at most `limit` characters
pub fn string_max(at: &FieldPath, value: &str, limit: usize) -> Check<()> {
    if value.chars().count() > limit {
        Err(fail(
            at,
            "string.max",
            format!("length must be less than or equal to {} characters long", limit),
        )
        .with_context("limit", limit)
        .with_context("value", value))
    } else {
        Ok(())
    }
}

/// Validator: array must have at least `limit` items
pub fn array_min(at: &FieldPath, len: usize, limit: usize) -> Check<()> {
    if len < limit {
        Err(fail(at, "array.min", format!("must contain at least {} items", limit))
            .with_context("limit", limit))
    } else {
        Ok(())
    }
}

/// Validator: array must have at most `limit` items
pub fn array_max(at: &FieldPath, len: usize, limit: usize) -> Check<()> {
    if len > limit {
        Err(fail(
            at,
            "array.max",
            format!("must contain less than or equal to {} items", limit),
        )
        .with_context("limit", limit))
    } else {
        Ok(())
    }
}

/// Validator: value must be in the allowed list
pub fn one_of(at: &FieldPath, value: &Value, valids: &[Value]) -> Check<()> {
    if valids.is_empty() || valids.contains(value) {
        return Ok(());
    }
    let listed: Vec<String> = valids.iter().map(display_value).collect();
    Err(
        fail(at, "any.allowOnly", format!("must be one of [{}]", listed.join(", ")))
            .with_context("value", value.clone())
            .with_context("valids", Value::Array(valids.to_vec())),
    )
}

/// Validator: string must match the pattern
pub fn pattern(at: &FieldPath, value: &str, re: &Regex) -> Check<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(fail(
            at,
            "string.regex.base",
            format!(
                "with value \"{}\" fails to match the required pattern: /{}/",
                value,
                re.as_str()
            ),
        )
        .with_context("pattern", re.as_str())
        .with_context("value", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(key: &str) -> FieldPath {
        FieldPath::root(key)
    }

    // === required() / forbidden() / unknown_key() ===

    #[test]
    fn test_required_message() {
        let detail = required(&at("username"));
        assert_eq!(detail.kind, "any.required");
        assert_eq!(detail.message, "\"username\" is required");
        assert_eq!(detail.key(), Some("username"));
    }

    #[test]
    fn test_unknown_key_message() {
        let detail = unknown_key(&at("debug"));
        assert_eq!(detail.kind, "object.allowUnknown");
        assert_eq!(detail.message, "\"debug\" is not allowed");
    }

    #[test]
    fn test_forbidden_message() {
        assert_eq!(forbidden(&at("token")).kind, "any.unknown");
    }

    // === string() ===

    #[test]
    fn test_string_accepts_string() {
        assert_eq!(string(&at("name"), json!("bob")).unwrap(), "bob");
    }

    #[test]
    fn test_string_rejects_array() {
        let err = string(&at("name"), json!(["a", "b"])).unwrap_err();
        assert_eq!(err.kind, "string.base");
        assert_eq!(err.message, "\"name\" must be a string");
    }

    #[test]
    fn test_non_empty_rejects_empty() {
        assert_eq!(non_empty(&at("name"), "").unwrap_err().kind, "any.empty");
        assert!(non_empty(&at("name"), "x").is_ok());
    }

    // === number() ===

    #[test]
    fn test_number_converts_integer_string() {
        let n = number(&at("page"), json!("5"), true).unwrap();
        assert_eq!(Value::Number(n), json!(5));
    }

    #[test]
    fn test_number_converts_float_string() {
        let n = number(&at("ratio"), json!("2.5"), true).unwrap();
        assert_eq!(Value::Number(n), json!(2.5));
    }

    #[test]
    fn test_number_without_convert_rejects_string() {
        let err = number(&at("page"), json!("5"), false).unwrap_err();
        assert_eq!(err.kind, "number.base");
        assert_eq!(err.message, "\"page\" must be a number");
    }

    #[test]
    fn test_number_rejects_garbage_and_empty() {
        assert!(number(&at("page"), json!("abc"), true).is_err());
        assert!(number(&at("page"), json!(""), true).is_err());
        assert!(number(&at("page"), json!("NaN"), true).is_err());
        assert!(number(&at("page"), json!("inf"), true).is_err());
    }

    #[test]
    fn test_number_passes_json_number() {
        assert!(number(&at("page"), json!(7), false).is_ok());
    }

    // === integer() ===

    #[test]
    fn test_integer_checks_fraction() {
        assert!(integer(&at("page"), Number::from(3)).is_ok());
        let half = Number::from_f64(3.5).unwrap();
        assert_eq!(integer(&at("page"), half).unwrap_err().kind, "number.integer");
    }

    #[test]
    fn test_whole_floats_become_integers() {
        let n = number(&at("page"), json!("5.0"), true).unwrap();
        assert!(n.is_u64());
        assert_eq!(Value::Number(n), json!(5));

        let n = number(&at("offset"), json!("-2.0"), true).unwrap();
        assert_eq!(n.as_i64(), Some(-2));

        let whole = Number::from_f64(3.0).unwrap();
        assert_eq!(integer(&at("page"), whole).unwrap().as_u64(), Some(3));
    }

    // === boolean() ===

    #[test]
    fn test_boolean_converts_case_insensitive() {
        assert!(boolean(&at("active"), json!("TRUE"), true).unwrap());
        assert!(!boolean(&at("active"), json!("false"), true).unwrap());
    }

    #[test]
    fn test_boolean_rejects_other_strings() {
        assert_eq!(
            boolean(&at("active"), json!("yes"), true).unwrap_err().kind,
            "boolean.base"
        );
        assert!(boolean(&at("active"), json!("true"), false).is_err());
    }

    // === array() ===

    #[test]
    fn test_array_single_wraps_when_converting() {
        assert_eq!(array(&at("tag"), json!("a"), true, true).unwrap(), vec![json!("a")]);
        assert_eq!(
            array(&at("tag"), json!("a"), true, false).unwrap_err().kind,
            "array.base"
        );
        assert!(array(&at("tag"), json!("a"), false, true).is_err());
    }

    // === limits ===

    #[test]
    fn test_number_min_max() {
        let err = number_min(&at("page"), 0.0, 1.0).unwrap_err();
        assert_eq!(err.message, "\"page\" must be larger than or equal to 1");
        assert_eq!(err.context["limit"], json!(1));

        let err = number_max(&at("limit"), 101.0, 100.0).unwrap_err();
        assert_eq!(err.message, "\"limit\" must be less than or equal to 100");

        assert!(number_min(&at("page"), 1.0, 1.0).is_ok());
        assert!(number_max(&at("page"), 100.0, 100.0).is_ok());
    }

    #[test]
    fn test_string_length_limits() {
        let err = string_min(&at("name"), "ab", 3).unwrap_err();
        assert_eq!(err.message, "\"name\" length must be at least 3 characters long");
        let err = string_max(&at("name"), "abcdef", 5).unwrap_err();
        assert_eq!(
            err.message,
            "\"name\" length must be less than or equal to 5 characters long"
        );
        assert!(string_min(&at("name"), "éàü", 3).is_ok());
    }

    #[test]
    fn test_array_length_limits() {
        assert_eq!(array_min(&at("tag"), 0, 1).unwrap_err().kind, "array.min");
        assert_eq!(array_max(&at("tag"), 3, 2).unwrap_err().kind, "array.max");
        assert!(array_max(&at("tag"), 2, 2).is_ok());
    }

    // === one_of() ===

    #[test]
    fn test_one_of() {
        let valids = vec![json!("asc"), json!("desc")];
        assert!(one_of(&at("order"), &json!("asc"), &valids).is_ok());
        let err = one_of(&at("order"), &json!("up"), &valids).unwrap_err();
        assert_eq!(err.kind, "any.allowOnly");
        assert_eq!(err.message, "\"order\" must be one of [asc, desc]");
    }

    // === pattern() ===

    #[test]
    fn test_pattern() {
        let re = Regex::new("^[a-z]+$").unwrap();
        assert!(pattern(&at("slug"), "abc", &re).is_ok());
        let err = pattern(&at("slug"), "ABC", &re).unwrap_err();
        assert_eq!(err.kind, "string.regex.base");
        assert_eq!(
            err.message,
            "\"slug\" with value \"ABC\" fails to match the required pattern: /^[a-z]+$/"
        );
    }

    // === FieldPath ===

    #[test]
    fn test_dotted_root_key_is_kept_whole() {
        let detail = required(&at("filter.status"));
        assert_eq!(detail.path, "filter.status");
        assert_eq!(detail.key(), Some("filter.status"));
        assert_eq!(detail.message, "\"filter.status\" is required");
    }

    #[test]
    fn test_item_path_is_keyed_by_index() {
        let item = at("tags").item(2);
        assert_eq!(item.path(), "tags.2");
        assert_eq!(item.key(), "2");

        let err = string(&item, json!(1)).unwrap_err();
        assert_eq!(err.message, "\"2\" must be a string");
        assert_eq!(err.key(), Some("2"));
    }
}
