//! CLI error types.

use specpub_config::ConfigError;
use specpub_publisher::PublishError;
use specpub_template::ExpandError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Expand(#[from] ExpandError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{count} page(s) failed to publish")]
    PagesFailed { count: usize },

    #[error("{0}")]
    Validation(String),
}
