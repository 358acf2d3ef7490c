//! Macro dictionary: HTML fragments used as the last dispatch fallback.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::MacroError;

/// Fragments keyed by file stem, loaded once at startup.
///
/// A macro's text replaces the directive and is scanned again, so fragments
/// may contain directives of their own.
#[derive(Debug, Default, Clone)]
pub struct MacroDictionary {
    macros: BTreeMap<String, String>,
}

impl MacroDictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.html` file directly inside `dir`.
    ///
    /// A missing directory yields an empty dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError`] if a fragment cannot be read.
    pub fn load(dir: &Path) -> Result<Self, MacroError> {
        let mut dictionary = Self::new();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "Macro directory not found, no macros loaded");
            return Ok(dictionary);
        }

        let pattern = dir.join("*.html");
        let paths = glob::glob(&pattern.to_string_lossy()).map_err(|source| MacroError::Pattern {
            dir: dir.to_path_buf(),
            source,
        })?;

        for path in paths.flatten() {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|source| MacroError::Io {
                path: path.clone(),
                source,
            })?;
            dictionary.macros.insert(name.to_owned(), text);
        }

        tracing::debug!(dir = %dir.display(), count = dictionary.len(), "Loaded macros");
        Ok(dictionary)
    }

    /// Add a macro.
    #[must_use]
    pub fn with_macro(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.macros.insert(name.into(), text.into());
        self
    }

    /// Fragment for a command.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    /// Macro names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }

    /// Number of macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// True if no macros are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
