//! Error types for the model and its collaborators.

use std::path::PathBuf;

/// Failure loading the specification model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be read.
    #[error("cannot read model {}: {source}", path.display())]
    Io {
        /// Model path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The YAML model is malformed.
    #[error("invalid YAML model {}: {source}", path.display())]
    Yaml {
        /// Model path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The JSON model is malformed.
    #[error("invalid JSON model {}: {source}", path.display())]
    Json {
        /// Model path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of the value set expansion collaborator.
#[derive(Debug, thiserror::Error)]
pub enum TerminologyError {
    /// Network-level failure (connection, timeout).
    #[error("terminology request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error.
        message: String,
    },
    /// The server answered with an error status.
    #[error("terminology server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The response could not be understood.
    #[error("unreadable expansion for {url}: {message}")]
    Parse {
        /// Value set URL.
        url: String,
        /// Parser message.
        message: String,
    },
    /// The value set has no enumerated content to expand locally.
    #[error("value set {url} cannot be expanded without a terminology server")]
    Unsupported {
        /// Value set URL.
        url: String,
    },
}

/// Failure of the Markdown collaborator.
#[derive(Debug, thiserror::Error)]
#[error("markdown rendering failed: {0}")]
pub struct MarkdownError(pub String);

/// Failure of a sub-renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The rendered artifact does not exist in the model.
    #[error("{renderer}: no artifact named `{target}`")]
    NotFound {
        /// Renderer name.
        renderer: String,
        /// Requested artifact.
        target: String,
    },
    /// No renderer is registered under the name.
    #[error("no renderer registered for `{0}`")]
    Unavailable(String),
    /// The renderer failed.
    #[error("{renderer} failed: {message}")]
    Failed {
        /// Renderer name.
        renderer: String,
        /// Failure message.
        message: String,
    },
}
