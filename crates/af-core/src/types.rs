//! Core type definitions for AutoFiller
//!
//! A [`Rule`] maps one-to-one onto the objects persisted under the
//! `autoFillRules` storage key, so the serde representation is the wire
//! format shared by the popup, the content script and the CLI.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Rule
// =============================================================================

/// One user-defined autofill directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Substring matched against the full page URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_pattern: String,
    /// CSS selector for candidate elements.
    #[serde(default, deserialize_with = "lenient_string")]
    pub selector: String,
    /// Value written into matching empty elements.
    #[serde(default, deserialize_with = "lenient_string")]
    pub default_value: String,
}

impl Rule {
    pub fn new(
        url_pattern: impl Into<String>,
        selector: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            selector: selector.into(),
            default_value: default_value.into(),
        }
    }

    /// A rule is usable only when all three fields are non-empty.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Name of the first empty field, in declaration order.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.url_pattern.is_empty() {
            Some("urlPattern")
        } else if self.selector.is_empty() {
            Some("selector")
        } else if self.default_value.is_empty() {
            Some("defaultValue")
        } else {
            None
        }
    }

    /// Case-sensitive substring test against the full URL.
    #[inline]
    pub fn matches_url(&self, url: &str) -> bool {
        url.contains(self.url_pattern.as_str())
    }

    /// Valid and matching. This is the filler's rule selection.
    #[inline]
    pub fn applies_to(&self, url: &str) -> bool {
        self.is_valid() && self.matches_url(url)
    }

    /// Decode a single stored entry. Anything that is not an object decodes
    /// to an all-empty (invalid) rule so it keeps its position.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

// =============================================================================
// Collection helpers
// =============================================================================

/// Decode a stored collection. Absent or non-array values read as empty.
pub fn decode_rules(value: Value) -> Vec<Rule> {
    match value {
        Value::Array(items) => items.into_iter().map(Rule::from_value).collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!("Stored rule collection is not a sequence: {}", other);
            Vec::new()
        }
    }
}

/// Remove the rule at `index`. Out-of-range indices leave the collection
/// untouched.
pub fn remove_at(rules: &mut Vec<Rule>, index: usize) -> Option<Rule> {
    if index < rules.len() {
        Some(rules.remove(index))
    } else {
        None
    }
}
