//! Field-scoped validation errors.
//!
//! Forms (checkout shipping, billing, registration) report one message per
//! offending field. The errors are local and recoverable: they block the
//! action that triggered validation and are cleared as the user edits the
//! field.

use core::fmt;

/// Ordered collection of per-field validation messages.
///
/// Fields are keyed by their wire name (`fullName`, `postalCode`, ...) and
/// keep the order in which they were reported, which is form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a message for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        if let Some(entry) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = message;
        } else {
            self.entries.push((field, message));
        }
    }

    /// Drop the message for `field`, if any.
    pub fn clear_field(&mut self, field: &str) {
        self.entries.retain(|(f, _)| *f != field);
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(field, message)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field has an error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .entries
            .iter()
            .map(|(_, message)| message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}
