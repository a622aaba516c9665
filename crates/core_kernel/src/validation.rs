//! Field-keyed validation errors
//!
//! Every rejected mutation surfaces as a mapping from the conceptual
//! field (`name`, `amount`, `account`, ...) to one or more human-readable
//! messages. Nothing is persisted when a mutation is rejected; the
//! caller renders the mapping as-is.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Accumulates validation failures keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`, the shape the request
/// layer renders directly.
///
/// # Example
///
/// ```rust
/// use core_kernel::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("amount", "must be greater than 0");
/// assert!(!errors.is_empty());
/// assert_eq!(errors.messages("amount"), ["must be greater than 0"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty set of validation errors
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set containing a single field/message pair
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a failure message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns true if no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the messages recorded against a field
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if any message was recorded against a field
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Merges another set of failures into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Iterates over `(field, messages)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Consumes the set, returning the underlying map
    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}
