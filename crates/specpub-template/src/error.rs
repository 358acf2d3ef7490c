//! Error types for scanning, dispatch and expansion.

use std::path::PathBuf;

/// Malformed delimiters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// An opener without a matching closer.
    #[error("unterminated directive: `{opener}` at byte {offset} has no closer")]
    Unterminated {
        /// The opener found (`<%` or `[%`).
        opener: &'static str,
        /// Byte offset of the opener in the buffer being scanned.
        offset: usize,
    },
}

/// Precondition failure inside a resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A required positional argument is absent.
    #[error("`{command}` requires argument `{argument}`")]
    MissingArgument {
        /// Command name.
        command: String,
        /// Argument name.
        argument: &'static str,
    },
    /// The model has no such artifact.
    #[error("no {kind} named `{name}`")]
    NotFound {
        /// Artifact kind (`resource`, `value set`, ...).
        kind: &'static str,
        /// Requested name.
        name: String,
    },
    /// The command needs context the current page does not have.
    #[error("`{command}` needs {needs}")]
    WrongContext {
        /// Command name.
        command: String,
        /// What is missing (`a current resource`, ...).
        needs: &'static str,
    },
    /// An argument has an unusable value.
    #[error("invalid argument for `{command}`: {message}")]
    Invalid {
        /// Command name.
        command: String,
        /// What is wrong.
        message: String,
    },
    /// An end-of-run invariant checked by a resolver does not hold.
    #[error(transparent)]
    Consistency(#[from] specpub_tracking::ConsistencyError),
    /// A nested expansion failed.
    #[error(transparent)]
    Nested(Box<ExpandError>),
}

impl From<ExpandError> for ResolveError {
    fn from(err: ExpandError) -> Self {
        Self::Nested(Box::new(err))
    }
}

/// Failure expanding one page. The page is not written.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// Malformed delimiters.
    #[error("{file}: {source}")]
    Scan {
        /// Page being expanded.
        file: String,
        /// Scanner error.
        #[source]
        source: ScanError,
    },
    /// No resolver, override or macro for the command.
    #[error("{file}: directive not understood: `{command}` in {raw}")]
    Dispatch {
        /// Page being expanded.
        file: String,
        /// Unknown command.
        command: String,
        /// Directive as written.
        raw: String,
    },
    /// A resolver failed.
    #[error("{file}: {raw}: {source}")]
    Resolve {
        /// Page being expanded.
        file: String,
        /// Directive as written.
        raw: String,
        /// Resolver error.
        #[source]
        source: ResolveError,
    },
    /// The iteration cap was reached.
    #[error("{file}: runaway expansion after {limit} directives, last was {raw}")]
    Runaway {
        /// Page being expanded.
        file: String,
        /// Last directive resolved.
        raw: String,
        /// Iteration cap.
        limit: usize,
    },
    /// Nested template inclusion went too deep.
    #[error("{file}: including `{target}` exceeds the include depth of {limit}")]
    IncludeDepth {
        /// Page being expanded.
        file: String,
        /// Template that was to be included.
        target: String,
        /// Depth limit.
        limit: usize,
    },
    /// A template could not be loaded.
    #[error("{file}: template `{name}` not found")]
    TemplateNotFound {
        /// Page being expanded.
        file: String,
        /// Template name.
        name: String,
    },
    /// The post-pass could not parse the expanded page.
    #[error("{file}: post-processing failed: {message}")]
    PostPass {
        /// Page being expanded.
        file: String,
        /// Parser message.
        message: String,
    },
}

impl ExpandError {
    /// Page the error occurred on.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Scan { file, .. }
            | Self::Dispatch { file, .. }
            | Self::Resolve { file, .. }
            | Self::Runaway { file, .. }
            | Self::IncludeDepth { file, .. }
            | Self::TemplateNotFound { file, .. }
            | Self::PostPass { file, .. } => file,
        }
    }

    /// Raw directive text, when a directive was involved.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Dispatch { raw, .. } | Self::Resolve { raw, .. } | Self::Runaway { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}

/// Failure loading the macro dictionary.
#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    /// The macro directory pattern is invalid.
    #[error("invalid macro directory {}: {source}", dir.display())]
    Pattern {
        /// Macro directory.
        dir: PathBuf,
        /// Glob error.
        #[source]
        source: glob::PatternError,
    },
    /// A macro file could not be read.
    #[error("cannot read macro {}: {source}", path.display())]
    Io {
        /// Macro file.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
}
