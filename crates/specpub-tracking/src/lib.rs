//! Cross-page bookkeeping for specpub.
//!
//! Directive resolvers record facts about the pages they expand while the
//! publisher walks the page set. The facts are read back only once every page
//! has been expanded, to build the contents page, the normative index pages,
//! the QA page and the search index.
//!
//! # Trackers
//!
//! - [`TableOfContents`]: section registrations, ordered numerically per segment
//! - [`NormativeRegistry`]: package membership, first write wins
//! - [`SearchTypeUsage`]: `name:type` tokens checked at the end of the run
//! - [`SearchIndex`]: per-page entries for the machine-readable search index
//! - [`ValidationLog`]: diagnostics rendered into the QA page
//! - [`BreadCrumbManager`]: the read-only page hierarchy (plus the work group side channel)
//!
//! [`PublishState`] bundles them. It is owned by the publisher and passed by
//! reference into each expansion, so separate runs never share state.
//!
//! # Example
//!
//! ```
//! use specpub_tracking::{PublishState, SectionNumber, TocEntry};
//!
//! let mut state = PublishState::default();
//! let section: SectionNumber = "1.10".parse().unwrap();
//! state.toc.insert(TocEntry::new(section, "Later", "later.html"));
//! state.toc.insert(TocEntry::new("1.9".parse().unwrap(), "Earlier", "earlier.html"));
//!
//! let order: Vec<String> = state.toc.entries().map(|e| e.section.to_string()).collect();
//! assert_eq!(order, ["1.9", "1.10"]);
//! ```

mod breadcrumbs;
mod error;
mod normative;
mod search;
mod section;
mod state;
mod toc;
mod validation;

pub use breadcrumbs::{BreadCrumbManager, BreadcrumbItem, NavNode};
pub use error::ConsistencyError;
pub use normative::{NormativeRegistry, PageInfo, PageKind, Registration};
pub use search::{SearchIndex, SearchIndexEntry, SearchTypeUsage};
pub use section::{SectionNumber, SectionNumberError};
pub use state::{Checkpoint, PublishState};
pub use toc::{MAX_RENDERED_DEPTH, TableOfContents, TocEntry, TocInsert, normalize_link};
pub use validation::{Severity, ValidationLog, ValidationMessage};
