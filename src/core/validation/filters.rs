//! String conversions
//!
//! Applied to string fields before their rules are checked, and only when
//! the policy allows conversion.

/// A conversion applied to string values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFilter {
    /// Remove leading and trailing whitespace
    Trim,
    /// Convert to lowercase
    Lowercase,
    /// Convert to uppercase
    Uppercase,
}

impl StringFilter {
    pub fn apply(self, value: &str) -> String {
        match self {
            StringFilter::Trim => value.trim().to_string(),
            StringFilter::Lowercase => value.to_lowercase(),
            StringFilter::Uppercase => value.to_uppercase(),
        }
    }
}

/// Run every filter in order
pub fn apply_all(filters: &[StringFilter], value: String) -> String {
    filters.iter().fold(value, |acc, f| f.apply(&acc))
}
