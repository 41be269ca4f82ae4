//! Live field values for one in-progress submission

use std::collections::HashMap;

use super::marker::MarkerRegistry;

/// Mapping from field name to the text currently entered for it.
///
/// Values are free-form; nothing is validated, trimmed or coerced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: HashMap<String, String>,
}

impl FormState {
    /// Start with an empty value for every declared field
    pub fn for_registry(registry: &MarkerRegistry) -> Self {
        Self {
            values: registry
                .names()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        }
    }

    /// Current value, empty when the field was never set
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Mutable handle for binding a text control to a field
    pub fn value_mut(&mut self, name: &str) -> &mut String {
        self.values.entry(name.to_string()).or_default()
    }

    /// Reset every value to empty
    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
    }

    /// Whether any field holds non-whitespace text
    pub fn has_input(&self) -> bool {
        self.values.values().any(|v| !v.trim().is_empty())
    }
}
