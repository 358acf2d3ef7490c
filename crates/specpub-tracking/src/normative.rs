//! Normative package membership.
//!
//! Pages marked as standards-track declare the package they belong to while
//! they are expanded. The registry remembers the first declaration per file
//! and never moves a file to another package afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// What kind of page was registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageKind {
    /// Narrative page.
    #[default]
    Page,
    /// Resource definition page.
    Resource,
    /// Operation definitions.
    Operations,
    /// Value set page.
    ValueSet,
    /// Code system page.
    CodeSystem,
    /// Profile page.
    Profile,
    /// Extension definition page.
    Extension,
}

impl PageKind {
    /// Lowercase name used in directives and index pages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Resource => "resource",
            Self::Operations => "operations",
            Self::ValueSet => "valueset",
            Self::CodeSystem => "codesystem",
            Self::Profile => "profile",
            Self::Extension => "extension",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "resource" => Ok(Self::Resource),
            "operations" => Ok(Self::Operations),
            "valueset" | "value-set" => Ok(Self::ValueSet),
            "codesystem" | "code-system" => Ok(Self::CodeSystem),
            "profile" => Ok(Self::Profile),
            "extension" => Ok(Self::Extension),
            other => Err(format!("unknown page kind `{other}`")),
        }
    }
}

/// A page recorded as a member of a normative package.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageInfo {
    /// Page kind.
    pub kind: PageKind,
    /// Output filename (e.g., `patient.html`).
    pub filename: String,
    /// Page title.
    pub title: String,
}

impl PageInfo {
    /// Create a page record.
    #[must_use]
    pub fn new(kind: PageKind, filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            filename: filename.into(),
            title: title.into(),
        }
    }
}

/// Outcome of [`NormativeRegistry::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First declaration for this file; stored.
    Recorded,
    /// The file was already recorded, possibly under a different package.
    AlreadyRecorded {
        /// Package holding the file.
        package: String,
    },
    /// The file is a `-definitions` appendix of another page and is never recorded.
    Excluded,
}

/// Mapping package name to its member pages.
#[derive(Debug, Default, Clone)]
pub struct NormativeRegistry {
    packages: BTreeMap<String, BTreeMap<String, PageInfo>>,
    owners: HashMap<String, String>,
}

impl NormativeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that a page belongs to `package`.
    ///
    /// The first declaration for a filename wins; later ones are reported
    /// but leave the registry untouched.
    pub fn record(&mut self, package: &str, page: PageInfo) -> Registration {
        if page.filename.contains("-definitions") {
            return Registration::Excluded;
        }
        if let Some(owner) = self.owners.get(&page.filename) {
            if owner != package {
                tracing::debug!(
                    file = %page.filename,
                    kept = %owner,
                    ignored = %package,
                    "Page already belongs to another normative package"
                );
            }
            return Registration::AlreadyRecorded {
                package: owner.clone(),
            };
        }
        self.owners
            .insert(page.filename.clone(), package.to_owned());
        self.packages
            .entry(package.to_owned())
            .or_default()
            .insert(page.filename.clone(), page);
        Registration::Recorded
    }

    /// Package owning a file, if any.
    #[must_use]
    pub fn package_of(&self, filename: &str) -> Option<&str> {
        self.owners.get(filename).map(String::as_str)
    }

    /// Member pages of a package, ordered by filename.
    #[must_use]
    pub fn pages(&self, package: &str) -> Option<&BTreeMap<String, PageInfo>> {
        self.packages.get(package)
    }

    /// Package names in sorted order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Total number of recorded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
