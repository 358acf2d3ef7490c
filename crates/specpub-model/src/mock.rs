//! Mock collaborators for testing.
//!
//! Provides [`MockTerminology`] and [`MockMarkdown`] for exercising the
//! degraded paths of resolvers without a terminology server.

use std::sync::{Mutex, PoisonError};

use crate::definitions::ValueSetDefn;
use crate::error::{MarkdownError, TerminologyError};
use crate::markdown::{CommonMark, Markdown};
use crate::terminology::{Expansion, OfflineTerminology, Terminology};

/// Terminology double that records requests and can be told to fail.
///
/// # Example
///
/// ```ignore
/// use specpub_model::{MockTerminology, Terminology};
///
/// let tx = MockTerminology::failing("server down");
/// assert!(tx.expand(&value_set, true, false).is_err());
/// assert_eq!(tx.requests(), ["http://example.org/vs/gender"]);
/// ```
#[derive(Debug, Default)]
pub struct MockTerminology {
    failure: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl MockTerminology {
    /// Mock that expands offline from enumerated concepts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose every expansion fails with a request error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// URLs of every value set requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Terminology for MockTerminology {
    fn expand(
        &self,
        value_set: &ValueSetDefn,
        include_hierarchy: bool,
        include_designations: bool,
    ) -> Result<Expansion, TerminologyError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value_set.url.clone());
        if let Some(message) = &self.failure {
            return Err(TerminologyError::Request {
                url: value_set.url.clone(),
                message: message.clone(),
            });
        }
        OfflineTerminology.expand(value_set, include_hierarchy, include_designations)
    }
}

/// Markdown double that either renders normally or always fails.
#[derive(Debug, Default)]
pub struct MockMarkdown {
    failure: Option<String>,
}

impl MockMarkdown {
    /// Mock whose every render fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }
}

impl Markdown for MockMarkdown {
    fn render(&self, source: &str) -> Result<String, MarkdownError> {
        match &self.failure {
            Some(message) => Err(MarkdownError(message.clone())),
            None => CommonMark::new().render(source),
        }
    }
}
