//! Search parameter usage and the search index.

use std::collections::{BTreeSet, HashSet};

use crate::error::ConsistencyError;

/// Set of `name:searchType` tokens recorded during expansion.
///
/// Parameters the model flags as "possibly unused for type X" must not show
/// up here by the end of the run; [`check_unused`](Self::check_unused)
/// enforces that.
#[derive(Debug, Default, Clone)]
pub struct SearchTypeUsage {
    used: BTreeSet<String>,
}

impl SearchTypeUsage {
    /// Create an empty usage set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` was used with `search_type`.
    pub fn record(&mut self, name: &str, search_type: &str) {
        self.used.insert(token(name, search_type));
    }

    /// True if the combination was recorded.
    #[must_use]
    pub fn contains(&self, name: &str, search_type: &str) -> bool {
        self.used.contains(&token(name, search_type))
    }

    /// Recorded tokens in sorted order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.used.iter().map(String::as_str)
    }

    /// Number of recorded tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Assert that every suspected-unused `(name, type)` pair is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::SearchParameterUsed`] listing every pair
    /// that was in fact used.
    pub fn check_unused<'a>(
        &self,
        suspects: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), ConsistencyError> {
        let violations: Vec<String> = suspects
            .into_iter()
            .map(|(name, search_type)| token(name, search_type))
            .filter(|t| self.used.contains(t))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConsistencyError::SearchParameterUsed { violations })
        }
    }
}

fn token(name: &str, search_type: &str) -> String {
    format!("{name}:{search_type}")
}

/// One entry of the machine-readable search index.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchIndexEntry {
    /// Page title.
    pub title: String,
    /// Link to the page.
    pub link: String,
    /// Page kind (e.g., `page`, `resource`).
    pub kind: String,
    /// Free-text description, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    /// Code of the responsible work group, if one was recorded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub work_group: Option<String>,
}

/// Accumulated search index, one entry per link, in registration order.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchIndexEntry>,
    seen: HashSet<String>,
}

impl SearchIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its link is already indexed. Returns whether it was added.
    pub fn add(&mut self, entry: SearchIndexEntry) -> bool {
        if !self.seen.insert(entry.link.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
