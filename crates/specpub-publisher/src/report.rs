//! Outcome of a publishing run.

use specpub_template::ExpandError;

/// A page that failed to expand. Nothing was written for it.
#[derive(Debug)]
pub struct PageFailure {
    /// Output filename of the page.
    pub file: String,
    /// Why expansion stopped.
    pub error: ExpandError,
}

/// Pages written and pages that failed, in document order.
#[derive(Debug, Default)]
pub struct PublishReport {
    written: Vec<String>,
    failures: Vec<PageFailure>,
}

impl PublishReport {
    pub(crate) fn record_written(&mut self, file: impl Into<String>) {
        self.written.push(file.into());
    }

    pub(crate) fn record_failure(&mut self, file: impl Into<String>, error: ExpandError) {
        self.failures.push(PageFailure {
            file: file.into(),
            error,
        });
    }

    /// Files written, including index pages and side artifacts.
    #[must_use]
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Whether `file` was written in this run.
    #[must_use]
    pub fn was_written(&self, file: &str) -> bool {
        self.written.iter().any(|w| w == file)
    }

    /// Pages that failed to expand.
    #[must_use]
    pub fn failures(&self) -> &[PageFailure] {
        &self.failures
    }

    /// True when every page expanded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
