//! Built-in query schema engine
//!
//! A [`QuerySchema`] is an ordered set of named [`FieldSchema`]s. Validation
//! walks the declared fields in order, then looks at undeclared keys, and
//! either returns the coerced object or a [`ValidationReport`].
//!
//! # Example
//!
//! ```rust,ignore
//! let schema = QuerySchema::new()
//!     .field("page", FieldSchema::integer().min(1.0).optional())
//!     .field("sort", FieldSchema::string().valid(["asc", "desc"]).optional())
//!     .field("tag", FieldSchema::array(FieldSchema::string()).single().optional());
//! ```

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use super::filters::{self, StringFilter};
use super::validators::{self, Check, FieldPath};
use super::SchemaValidator;
use crate::core::error::{EngineError, SchemaError, ValidationErrorDetail, ValidationReport};
use crate::core::policy::{Presence, ValidationPolicy};

/// Declared type of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldSchema>),
    Any,
}

/// Rules for a single query parameter
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: FieldKind,
    presence: Option<Presence>,
    default: Option<Value>,
    min: Option<f64>,
    max: Option<f64>,
    valids: Vec<Value>,
    pattern: Option<Regex>,
    filters: Vec<StringFilter>,
    single: bool,
    allow_empty: bool,
}

impl FieldSchema {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            presence: None,
            default: None,
            min: None,
            max: None,
            valids: Vec::new(),
            pattern: None,
            filters: Vec::new(),
            single: false,
            allow_empty: false,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::of(FieldKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn array(items: FieldSchema) -> Self {
        Self::of(FieldKind::Array(Box::new(items)))
    }

    pub fn any() -> Self {
        Self::of(FieldKind::Any)
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Field must be present, whatever the policy says
    pub fn required(mut self) -> Self {
        self.presence = Some(Presence::Required);
        self
    }

    /// Field may be omitted, whatever the policy says
    pub fn optional(mut self) -> Self {
        self.presence = Some(Presence::Optional);
        self
    }

    /// Field must not be present
    pub fn forbidden(mut self) -> Self {
        self.presence = Some(Presence::Forbidden);
        self
    }

    /// Value used for a missing optional field when defaults are enabled
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Lower bound: value for numbers, length for strings and arrays
    ///
    /// A fractional length bound is rounded inward: `min(2.5)` needs 3.
    pub fn min(mut self, limit: f64) -> Self {
        self.min = Some(limit);
        self
    }

    /// Upper bound: value for numbers, length for strings and arrays
    ///
    /// A fractional length bound is rounded inward: `max(2.5)` allows 2.
    pub fn max(mut self, limit: f64) -> Self {
        self.max = Some(limit);
        self
    }

    /// Restrict the (converted) value to a list
    pub fn valid<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.valids.extend(values.into_iter().map(Into::into));
        self
    }

    /// String must match a regular expression
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        if !matches!(self.kind, FieldKind::String) {
            return Err(SchemaError::InvalidRule {
                message: format!("pattern /{}/ requires a string field", pattern),
            });
        }
        let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(re);
        Ok(self)
    }

    pub fn trim(mut self) -> Self {
        self.filters.push(StringFilter::Trim);
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.filters.push(StringFilter::Lowercase);
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.filters.push(StringFilter::Uppercase);
        self
    }

    /// Accept a lone value for an array field by wrapping it
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Accept the empty string for a string field
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    fn length_limits(&self) -> (Option<usize>, Option<usize>) {
        let to_len = |f: f64| if f <= 0.0 { 0 } else { f as usize };
        (
            self.min.map(|f| to_len(f.ceil())),
            self.max.map(|f| to_len(f.floor())),
        )
    }

    /// Check one present value, returning the coerced value
    fn check(
        &self,
        at: &FieldPath,
        value: Value,
        policy: &ValidationPolicy,
    ) -> Result<Value, Vec<ValidationErrorDetail>> {
        let checked = match &self.kind {
            FieldKind::String => self.check_string(at, value, policy.convert),
            FieldKind::Number => self.check_number(at, value, policy.convert, false),
            FieldKind::Integer => self.check_number(at, value, policy.convert, true),
            FieldKind::Boolean => validators::boolean(at, value, policy.convert).map(Value::Bool),
            FieldKind::Any => Ok(value),
            FieldKind::Array(items) => return self.check_array(at, items, value, policy),
        };
        let checked = checked.map_err(|e| vec![e])?;
        validators::one_of(at, &checked, &self.valids).map_err(|e| vec![e])?;
        Ok(checked)
    }

    fn check_string(&self, at: &FieldPath, value: Value, convert: bool) -> Check<Value> {
        let mut s = validators::string(at, value)?;
        if convert {
            s = filters::apply_all(&self.filters, s);
        }
        if !self.allow_empty {
            validators::non_empty(at, &s)?;
        }
        let (min, max) = self.length_limits();
        if let Some(limit) = min {
            validators::string_min(at, &s, limit)?;
        }
        if let Some(limit) = max {
            validators::string_max(at, &s, limit)?;
        }
        if let Some(re) = &self.pattern {
            validators::pattern(at, &s, re)?;
        }
        Ok(Value::String(s))
    }

    fn check_number(
        &self,
        at: &FieldPath,
        value: Value,
        convert: bool,
        integer: bool,
    ) -> Check<Value> {
        let mut n = validators::number(at, value, convert)?;
        if integer {
            n = validators::integer(at, n)?;
        }
        let f = n.as_f64().unwrap_or_default();
        if let Some(limit) = self.min {
            validators::number_min(at, f, limit)?;
        }
        if let Some(limit) = self.max {
            validators::number_max(at, f, limit)?;
        }
        Ok(Value::Number(n))
    }

    fn check_array(
        &self,
        at: &FieldPath,
        items: &FieldSchema,
        value: Value,
        policy: &ValidationPolicy,
    ) -> Result<Value, Vec<ValidationErrorDetail>> {
        let values = validators::array(at, value, policy.convert, self.single)
            .map_err(|e| vec![e])?;

        let (min, max) = self.length_limits();
        if let Some(limit) = min {
            validators::array_min(at, values.len(), limit).map_err(|e| vec![e])?;
        }
        if let Some(limit) = max {
            validators::array_max(at, values.len(), limit).map_err(|e| vec![e])?;
        }

        let mut out = Vec::with_capacity(values.len());
        let mut errors = Vec::new();
        for (i, item) in values.into_iter().enumerate() {
            match items.check(&at.item(i), item, policy) {
                Ok(v) => out.push(v),
                Err(mut errs) => {
                    errors.append(&mut errs);
                    if policy.abort_early {
                        return Err(errors);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Array(out))
        } else {
            Err(errors)
        }
    }
}

/// Ordered object schema for a request's query parameters
#[derive(Debug, Clone, Default)]
pub struct QuerySchema {
    fields: IndexMap<String, FieldSchema>,
}

impl QuerySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field; redeclaring a name replaces its rules
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate an object against this schema under `policy`
    pub fn validate_object(
        &self,
        input: &Map<String, Value>,
        policy: &ValidationPolicy,
    ) -> Result<Value, ValidationReport> {
        let mut out = Map::new();
        let mut errors: Vec<ValidationErrorDetail> = Vec::new();

        for (name, field) in &self.fields {
            let at = FieldPath::root(name);
            let presence = field.presence.unwrap_or(policy.presence);

            match (input.get(name), presence) {
                (None, Presence::Required) => errors.push(validators::required(&at)),
                (None, Presence::Optional) => {
                    if !policy.no_defaults {
                        if let Some(default) = &field.default {
                            out.insert(name.clone(), default.clone());
                        }
                    }
                }
                (None, Presence::Forbidden) => {}
                (Some(_), Presence::Forbidden) => errors.push(validators::forbidden(&at)),
                (Some(raw), _) => match field.check(&at, raw.clone(), policy) {
                    Ok(value) => {
                        out.insert(name.clone(), value);
                    }
                    Err(mut errs) => errors.append(&mut errs),
                },
            }

            if policy.abort_early && !errors.is_empty() {
                errors.truncate(1);
                return Err(ValidationReport::new(errors));
            }
        }

        for (key, value) in input {
            if self.fields.contains_key(key) || policy.strip_unknown {
                continue;
            }
            if policy.allow_unknown {
                out.insert(key.clone(), value.clone());
                continue;
            }
            errors.push(validators::unknown_key(&FieldPath::root(key)));
            if policy.abort_early {
                return Err(ValidationReport::new(errors));
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(ValidationReport::new(errors))
        }
    }
}

#[async_trait]
impl SchemaValidator for QuerySchema {
    async fn validate(
        &self,
        input: Map<String, Value>,
        policy: &ValidationPolicy,
    ) -> Result<Value, EngineError> {
        self.validate_object(&input, policy).map_err(EngineError::from)
    }
}
