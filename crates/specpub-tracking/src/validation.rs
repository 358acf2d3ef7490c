//! Validation diagnostics collected during expansion.

use std::fmt;

/// Severity of a validation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Informational note.
    Information,
    /// Something looks wrong but the page is still usable.
    Warning,
    /// A real defect in the published content.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A diagnostic recorded by a resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationMessage {
    /// Severity.
    pub severity: Severity,
    /// Where the problem was found (usually the page file, optionally with a path).
    pub location: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.location, self.message)
    }
}

/// Process-wide list of validation messages, in the order they were raised.
#[derive(Debug, Default, Clone)]
pub struct ValidationLog {
    messages: Vec<ValidationMessage>,
}

impl ValidationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(
        &mut self,
        severity: Severity,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.messages.push(ValidationMessage {
            severity,
            location: location.into(),
            message: message.into(),
        });
    }

    /// Append an informational message.
    pub fn info(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Information, location, message);
    }

    /// Append a warning.
    pub fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, location, message);
    }

    /// Append an error.
    pub fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, location, message);
    }

    /// All messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Number of messages with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    /// True if any error-level message was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no messages were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
