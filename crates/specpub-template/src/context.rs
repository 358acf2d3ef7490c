//! Ambient state for one page expansion.

use std::collections::HashMap;

use specpub_model::{EntryPoint, PageEntry};
use specpub_tracking::SectionNumber;

/// Read-mostly state threaded through the expansion of one page.
///
/// Created per page (and per included template) and never shared between
/// pages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageContext {
    /// Output filename of the page (e.g., `patient.html`).
    pub current_file: String,
    /// Driver configuration.
    pub entry: EntryPoint,
    /// Page title from the model.
    pub title: String,
    /// Title set by a directive, used instead of `title`.
    pub working_title: Option<String>,
    /// Section number of the page.
    pub section: Option<SectionNumber>,
    /// Resource shown on a resource page.
    pub current_resource: Option<String>,
    /// Profile or extension shown on a profile page.
    pub current_profile: Option<String>,
    /// Implementation guide the page belongs to.
    pub current_ig: Option<String>,
    /// Responsible work group code.
    pub current_work_group: Option<String>,
    /// Normative package declared by the model for the page.
    pub normative_package: Option<String>,
    /// Depth of the page below the publication root.
    pub navigation_level: usize,
    /// Tabs shown in the page header, in order.
    pub active_tabs: Vec<String>,
    /// Page-local command overrides, consulted when the registry misses.
    pub overrides: HashMap<String, String>,
}

impl PageContext {
    /// Context for a narrative page.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            current_file: file.into(),
            ..Self::default()
        }
    }

    /// Context for a page entry of the model.
    #[must_use]
    pub fn for_page(page: &PageEntry) -> Self {
        Self {
            current_file: page.file.clone(),
            entry: page.entry,
            title: page.title.clone(),
            section: page.section_number(),
            current_resource: page.resource.clone(),
            current_profile: page.profile.clone(),
            current_work_group: page.work_group.clone(),
            normative_package: page.normative_package.clone(),
            navigation_level: page.level,
            ..Self::default()
        }
    }

    /// Context for a template included from this page.
    ///
    /// The child sees the same page identity but starts without overrides,
    /// tabs or a working title.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            working_title: None,
            active_tabs: Vec::new(),
            overrides: HashMap::new(),
            ..self.clone()
        }
    }

    /// Set the entry point.
    #[must_use]
    pub fn with_entry(mut self, entry: EntryPoint) -> Self {
        self.entry = entry;
        self
    }

    /// Set the page title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the current resource.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.current_resource = Some(resource.into());
        self
    }

    /// Set the current profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.current_profile = Some(profile.into());
        self
    }

    /// Set the section number.
    #[must_use]
    pub fn with_section(mut self, section: SectionNumber) -> Self {
        self.section = Some(section);
        self
    }

    /// Set the navigation level.
    #[must_use]
    pub fn with_level(mut self, level: usize) -> Self {
        self.navigation_level = level;
        self
    }

    /// Add a page-local override.
    #[must_use]
    pub fn with_override(mut self, command: impl Into<String>, text: impl Into<String>) -> Self {
        self.overrides.insert(command.into(), text.into());
        self
    }

    /// Title to print: the working title if one was set, else the page title.
    #[must_use]
    pub fn effective_title(&self) -> &str {
        self.working_title.as_deref().unwrap_or(&self.title)
    }

    /// Page identifier: the filename without `.html`, cut at `|` if present.
    #[must_use]
    pub fn page_id(&self) -> &str {
        let name = self
            .current_file
            .split('|')
            .next()
            .unwrap_or(&self.current_file);
        name.strip_suffix(".html").unwrap_or(name)
    }

    /// Prefix that leads from this page back to the publication root.
    #[must_use]
    pub fn root_prefix(&self) -> String {
        "../".repeat(self.navigation_level)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_id() {
        assert_eq!(PageContext::new("patient.html").page_id(), "patient");
        assert_eq!(PageContext::new("patient.html|tab").page_id(), "patient");
        assert_eq!(PageContext::new("notes.txt").page_id(), "notes.txt");
    }

    #[test]
    fn test_effective_title() {
        let mut page = PageContext::new("a.html").with_title("Model title");
        assert_eq!(page.effective_title(), "Model title");
        page.working_title = Some("Set by page".to_owned());
        assert_eq!(page.effective_title(), "Set by page");
    }

    #[test]
    fn test_for_page() {
        let entry = PageEntry::new("patient.html", "Patient")
            .with_section("8.1")
            .with_resource("Patient")
            .with_work_group("pa");
        let page = PageContext::for_page(&entry);
        assert_eq!(page.entry, EntryPoint::Resource);
        assert_eq!(page.current_resource.as_deref(), Some("Patient"));
        assert_eq!(page.section.unwrap().to_string(), "8.1");
        assert_eq!(page.current_work_group.as_deref(), Some("pa"));
    }

    #[test]
    fn test_child_drops_page_local_state() {
        let mut page = PageContext::new("a.html").with_override("x", "y");
        page.active_tabs.push("Content".to_owned());
        page.working_title = Some("T".to_owned());
        let child = page.child();
        assert_eq!(child.current_file, "a.html");
        assert!(child.overrides.is_empty());
        assert!(child.active_tabs.is_empty());
        assert_eq!(child.working_title, None);
    }

    #[test]
    fn test_root_prefix() {
        assert_eq!(PageContext::new("a.html").root_prefix(), "");
        assert_eq!(PageContext::new("a.html").with_level(2).root_prefix(), "../../");
    }
}
