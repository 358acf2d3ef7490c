//! Where page templates are read from.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Supplies template text by name.
pub trait TemplateSource: Send + Sync {
    /// Read a template.
    ///
    /// # Errors
    ///
    /// Returns an I/O error; [`io::ErrorKind::NotFound`] for unknown names.
    fn read(&self, name: &str) -> io::Result<String>;
}

/// Templates stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirectorySource {
    fn read(&self, name: &str) -> io::Result<String> {
        let relative = Path::new(name);
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("template name `{name}` leaves the template directory"),
            ));
        }
        std::fs::read_to_string(self.root.join(relative))
    }
}

/// Templates held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template.
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn read(&self, name: &str) -> io::Result<String> {
        self.templates.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no template `{name}`"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_directory_source_reads_nested() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/intro.html"), "hi").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.read("parts/intro.html").unwrap(), "hi");
        assert_eq!(
            source.read("missing.html").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_directory_source_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path().join("pages"));
        assert!(source.read("../secret.html").is_err());
        assert!(source.read("/etc/passwd").is_err());
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_template("a.html", "A");
        assert_eq!(source.read("a.html").unwrap(), "A");
        assert!(source.read("b.html").is_err());
    }
}
