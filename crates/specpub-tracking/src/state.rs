//! The bundle of trackers owned by one publishing run.

use std::collections::HashMap;

use crate::breadcrumbs::BreadCrumbManager;
use crate::normative::NormativeRegistry;
use crate::search::{SearchIndex, SearchTypeUsage};
use crate::toc::TableOfContents;
use crate::validation::ValidationLog;

/// All cross-page state for one run.
///
/// Created once by the publisher, populated incrementally while pages are
/// expanded in document order, and read once every page is done.
#[derive(Debug, Default)]
pub struct PublishState {
    /// Table of contents.
    pub toc: TableOfContents,
    /// Normative package membership.
    pub normative: NormativeRegistry,
    /// `name:type` search parameter usage.
    pub search_usage: SearchTypeUsage,
    /// Machine-readable search index.
    pub search_index: SearchIndex,
    /// QA diagnostics.
    pub validation: ValidationLog,
    /// Page hierarchy for breadcrumbs.
    pub breadcrumbs: BreadCrumbManager,
}

/// Tracker contents captured before a page is expanded.
///
/// Covers everything a resolver may write. The search index is only
/// written by the publisher once a page has succeeded, and the page
/// hierarchy is fixed, so neither is captured.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    toc: TableOfContents,
    normative: NormativeRegistry,
    search_usage: SearchTypeUsage,
    validation: ValidationLog,
    work_groups: HashMap<String, String>,
}

impl PublishState {
    /// Create state around a prebuilt page hierarchy.
    #[must_use]
    pub fn with_breadcrumbs(breadcrumbs: BreadCrumbManager) -> Self {
        Self {
            breadcrumbs,
            ..Self::default()
        }
    }

    /// Capture the trackers resolvers write to.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            toc: self.toc.clone(),
            normative: self.normative.clone(),
            search_usage: self.search_usage.clone(),
            validation: self.validation.clone(),
            work_groups: self.breadcrumbs.work_groups.clone(),
        }
    }

    /// Discard everything recorded since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.toc = checkpoint.toc;
        self.normative = checkpoint.normative;
        self.search_usage = checkpoint.search_usage;
        self.validation = checkpoint.validation;
        self.breadcrumbs.work_groups = checkpoint.work_groups;
    }
}
