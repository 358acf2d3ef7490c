//! End-of-run consistency errors.

/// A structural defect found after every page has been expanded.
///
/// These are fatal for the whole run.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    /// Search parameters flagged as possibly unused for a type were used with it.
    #[error("search parameters flagged as unused were used: {}", violations.join(", "))]
    SearchParameterUsed {
        /// `name:type` tokens that were used.
        violations: Vec<String>,
    },
    /// Table of contents entries point at pages that were never published.
    #[error("table of contents links to unpublished pages: {}", links.join(", "))]
    DanglingTocLinks {
        /// Offending links.
        links: Vec<String>,
    },
    /// Pages were recorded under packages the model does not declare.
    #[error("pages recorded under undeclared normative packages: {}", packages.join(", "))]
    UnknownPackages {
        /// Offending package names.
        packages: Vec<String>,
    },
}
