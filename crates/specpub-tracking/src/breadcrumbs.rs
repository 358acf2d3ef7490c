//! Breadcrumb trails built from the publication's page hierarchy.
//!
//! The hierarchy is fixed when the publisher starts: every page with a
//! section number becomes a node, and a page's ancestors are the nodes whose
//! section numbers are prefixes of its own. The only thing written during
//! expansion is the work group side channel, which the publisher copies into
//! the search index.

use std::collections::{BTreeMap, HashMap};

use crate::section::SectionNumber;
use crate::toc::normalize_link;

/// A page in the navigation hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavNode {
    /// Section number of the page.
    pub section: SectionNumber,
    /// Page title.
    pub title: String,
    /// Page link (output filename).
    pub link: String,
}

/// Breadcrumb navigation item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbItem {
    /// Display title.
    pub title: String,
    /// Link target; `None` for the current page.
    pub link: Option<String>,
}

impl BreadcrumbItem {
    fn linked(title: &str, link: &str) -> Self {
        Self {
            title: title.to_owned(),
            link: Some(link.to_owned()),
        }
    }

    fn current(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            link: None,
        }
    }
}

/// Read-only page hierarchy with a work group side channel.
#[derive(Debug, Default)]
pub struct BreadCrumbManager {
    home_title: String,
    home_link: String,
    nodes: BTreeMap<SectionNumber, NavNode>,
    by_link: HashMap<String, SectionNumber>,
    pub(crate) work_groups: HashMap<String, String>,
}

impl BreadCrumbManager {
    /// Build the hierarchy from page nodes.
    ///
    /// When two nodes share a section number the first one is kept.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = NavNode>) -> Self {
        let mut manager = Self {
            home_title: "Home".to_owned(),
            home_link: "index.html".to_owned(),
            ..Self::default()
        };
        for node in nodes {
            if manager.nodes.contains_key(&node.section) {
                tracing::warn!(
                    section = %node.section,
                    link = %node.link,
                    "Duplicate section number in page hierarchy"
                );
                continue;
            }
            manager
                .by_link
                .insert(normalize_link(&node.link), node.section.clone());
            manager.nodes.insert(node.section.clone(), node);
        }
        manager
    }

    /// Override the title and link of the leading "Home" crumb.
    #[must_use]
    pub fn with_home(mut self, title: impl Into<String>, link: impl Into<String>) -> Self {
        self.home_title = title.into();
        self.home_link = link.into();
        self
    }

    /// Section number of the page at `link`, if it is part of the hierarchy.
    #[must_use]
    pub fn section_of(&self, link: &str) -> Option<&SectionNumber> {
        self.by_link.get(&normalize_link(link))
    }

    /// Node for a section number.
    #[must_use]
    pub fn node(&self, section: &SectionNumber) -> Option<&NavNode> {
        self.nodes.get(section)
    }

    /// Breadcrumbs for a page: "Home", every ancestor, then the page itself.
    ///
    /// Unknown pages get just the "Home" crumb. The home page itself gets
    /// an empty trail.
    #[must_use]
    pub fn crumbs(&self, link: &str) -> Vec<BreadcrumbItem> {
        if normalize_link(link) == normalize_link(&self.home_link) {
            return Vec::new();
        }
        let mut items = vec![BreadcrumbItem::linked(&self.home_title, &self.home_link)];
        let Some(section) = self.section_of(link) else {
            return items;
        };
        items.extend(
            section
                .ancestors()
                .iter()
                .filter_map(|ancestor| self.nodes.get(ancestor))
                .map(|node| BreadcrumbItem::linked(&node.title, &node.link)),
        );
        if let Some(node) = self.nodes.get(section) {
            items.push(BreadcrumbItem::current(&node.title));
        }
        items
    }

    /// Breadcrumbs for a resource page and one of its tabs.
    ///
    /// The trail runs through the resource's own page, which becomes a link
    /// when a tab other than the main content is shown.
    #[must_use]
    pub fn resource_crumbs(
        &self,
        resource_link: &str,
        resource_title: &str,
        tab: Option<&str>,
    ) -> Vec<BreadcrumbItem> {
        let mut items = self.crumbs(resource_link);
        let known = self.section_of(resource_link).is_some();
        match tab {
            Some(tab) => {
                if known {
                    items.pop();
                }
                items.push(BreadcrumbItem::linked(resource_title, resource_link));
                items.push(BreadcrumbItem::current(tab));
            }
            None if !known => items.push(BreadcrumbItem::current(resource_title)),
            None => {}
        }
        items
    }

    /// Record the work group responsible for a page.
    pub fn record_work_group(&mut self, link: &str, code: &str) {
        self.work_groups
            .insert(normalize_link(link), code.to_owned());
    }

    /// Work group recorded for a page.
    #[must_use]
    pub fn work_group(&self, link: &str) -> Option<&str> {
        self.work_groups
            .get(&normalize_link(link))
            .map(String::as_str)
    }

    /// Number of pages in the hierarchy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the hierarchy is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
