//! Run-level errors.

use std::path::PathBuf;

use specpub_tracking::ConsistencyError;

/// Error that stops a publishing run.
///
/// Page expansion failures are not among them; those are collected in the
/// [`PublishReport`](crate::PublishReport).
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] specpub_config::ConfigError),
    /// Specification model could not be loaded.
    #[error(transparent)]
    Model(#[from] specpub_model::ModelError),
    /// Macro dictionary could not be loaded.
    #[error(transparent)]
    Macros(#[from] specpub_template::MacroError),
    /// Output could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Search index could not be serialized.
    #[error("cannot serialize search index: {0}")]
    SearchIndex(#[from] serde_json::Error),
    /// End-of-run invariant violated.
    #[error("consistency check failed: {0}")]
    Consistency(#[from] ConsistencyError),
}
