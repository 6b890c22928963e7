//! Validation policy switches
//!
//! A [`ValidationPolicy`] is fixed when a validator is built and shared by
//! every request it handles. Callers tune it through [`PolicyOverrides`],
//! which is merged field by field over the defaults.

use serde::{Deserialize, Serialize};

/// Presence applied to schema fields that do not declare their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Field must be present unless marked optional
    #[default]
    Required,
    /// Field may be omitted unless marked required
    Optional,
    /// Field must not be present unless marked otherwise
    Forbidden,
}

/// Behavioral switches controlling how query params are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPolicy {
    /// Stop at the first failure instead of collecting all of them
    pub abort_early: bool,

    /// Coerce raw strings to the declared field types
    pub convert: bool,

    /// Keep keys that the schema does not declare
    pub allow_unknown: bool,

    /// Silently drop keys that the schema does not declare
    pub strip_unknown: bool,

    /// Default presence for fields without an explicit one
    pub presence: Presence,

    /// Never inject schema defaults into the result
    pub no_defaults: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            allow_unknown: false,
            strip_unknown: false,
            presence: Presence::Required,
            no_defaults: true,
        }
    }
}

impl ValidationPolicy {
    /// Apply every override that is set, leaving the other fields alone
    pub fn merge(mut self, overrides: &PolicyOverrides) -> Self {
        if let Some(v) = overrides.abort_early {
            self.abort_early = v;
        }
        if let Some(v) = overrides.convert {
            self.convert = v;
        }
        if let Some(v) = overrides.allow_unknown {
            self.allow_unknown = v;
        }
        if let Some(v) = overrides.strip_unknown {
            self.strip_unknown = v;
        }
        if let Some(v) = overrides.presence {
            self.presence = v;
        }
        if let Some(v) = overrides.no_defaults {
            self.no_defaults = v;
        }
        self
    }
}

/// Caller-supplied policy changes; `None` keeps the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyOverrides {
    pub abort_early: Option<bool>,
    pub convert: Option<bool>,
    pub allow_unknown: Option<bool>,
    pub strip_unknown: Option<bool>,
    pub presence: Option<Presence>,
    pub no_defaults: Option<bool>,
}

impl PolicyOverrides {
    pub fn abort_early(mut self, value: bool) -> Self {
        self.abort_early = Some(value);
        self
    }

    pub fn convert(mut self, value: bool) -> Self {
        self.convert = Some(value);
        self
    }

    pub fn allow_unknown(mut self, value: bool) -> Self {
        self.allow_unknown = Some(value);
        self
    }

    pub fn strip_unknown(mut self, value: bool) -> Self {
        self.strip_unknown = Some(value);
        self
    }

    pub fn presence(mut self, value: Presence) -> Self {
        self.presence = Some(value);
        self
    }

    pub fn no_defaults(mut self, value: bool) -> Self {
        self.no_defaults = Some(value);
        self
    }
}
