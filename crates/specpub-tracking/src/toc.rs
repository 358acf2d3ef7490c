//! Table of contents accumulation.

use std::collections::{BTreeMap, HashSet};

use crate::section::SectionNumber;

/// Deepest section level shown in the rendered contents tree.
///
/// Deeper entries are still stored and addressable by section number.
pub const MAX_RENDERED_DEPTH: usize = 4;

/// A single table of contents registration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocEntry {
    /// Dotted section number (trailing `.0` already collapsed).
    pub section: SectionNumber,
    /// Display text.
    pub text: String,
    /// Link target, relative to the publication root.
    pub link: String,
    /// Icon image name shown next to the entry (empty for none).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub icon: String,
    /// Standards status label, if the page declares one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub status: Option<String>,
}

impl TocEntry {
    /// Create an entry without icon or status.
    #[must_use]
    pub fn new(section: SectionNumber, text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            section,
            text: text.into(),
            link: link.into(),
            icon: String::new(),
            status: None,
        }
    }

    /// Set the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the standards status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Nesting depth of the entry.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.section.depth()
    }
}

/// Outcome of [`TableOfContents::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocInsert {
    /// The entry was stored.
    Added,
    /// Another entry already points at the same page; the new one was dropped.
    DuplicateLink,
    /// The section number is already taken; the first registration stays.
    DuplicateSection,
}

/// Process-wide table of contents, keyed by section number.
///
/// Insertion is set-like per normalized link: two registrations pointing at
/// the same effective page keep only the first. Iteration is always in
/// numeric section order regardless of insertion order.
#[derive(Debug, Default, Clone)]
pub struct TableOfContents {
    entries: BTreeMap<SectionNumber, TocEntry>,
    links: HashSet<String>,
}

impl TableOfContents {
    /// Create an empty table of contents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry.
    pub fn insert(&mut self, entry: TocEntry) -> TocInsert {
        let link = normalize_link(&entry.link);
        if self.links.contains(&link) {
            return TocInsert::DuplicateLink;
        }
        if self.entries.contains_key(&entry.section) {
            tracing::debug!(
                section = %entry.section,
                link = %entry.link,
                "Section number already registered, keeping first entry"
            );
            return TocInsert::DuplicateSection;
        }
        self.links.insert(link);
        self.entries.insert(entry.section.clone(), entry);
        TocInsert::Added
    }

    /// Look up an entry by section number.
    #[must_use]
    pub fn get(&self, section: &SectionNumber) -> Option<&TocEntry> {
        self.entries.get(section)
    }

    /// Find the entry registered for a link.
    #[must_use]
    pub fn find_by_link(&self, link: &str) -> Option<&TocEntry> {
        let link = normalize_link(link);
        if !self.links.contains(&link) {
            return None;
        }
        self.entries
            .values()
            .find(|entry| normalize_link(&entry.link) == link)
    }

    /// True if an entry already points at the link.
    #[must_use]
    pub fn contains_link(&self, link: &str) -> bool {
        self.links.contains(&normalize_link(link))
    }

    /// All entries in numeric section order.
    pub fn entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.values()
    }

    /// Entries shown in the rendered contents tree.
    pub fn visible(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries
            .values()
            .filter(|entry| entry.depth() <= MAX_RENDERED_DEPTH)
    }

    /// Direct and indirect subsections of `section`, in order.
    pub fn within<'a>(&'a self, section: &'a SectionNumber) -> impl Iterator<Item = &'a TocEntry> {
        self.entries
            .range(section.clone()..)
            .skip_while(move |(key, _)| *key == section)
            .take_while(move |(key, _)| key.is_within(section))
            .map(|(_, entry)| entry)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a link for duplicate detection.
///
/// Leading `./`, surrounding whitespace and an empty trailing fragment are
/// ignored; comparison is case-insensitive.
#[must_use]
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    let link = link.strip_prefix("./").unwrap_or(link);
    let link = link.strip_suffix('#').unwrap_or(link);
    link.to_ascii_lowercase()
}
