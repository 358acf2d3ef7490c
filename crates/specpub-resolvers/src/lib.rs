//! Content resolvers for the specpub directive engine.
//!
//! Each module holds one family of commands and registers it with
//! [`ResolverRegistry`]. [`standard_registry`] builds the full command table
//! used by the publisher.
//!
//! | Module | Commands |
//! |---|---|
//! | `page` | `id`, `file`, `include`, `title`, `settitle`, `xtitle`, `level`, `setlevel`, `settabs`, `tabs`, `version`, `gendate`, `pagepath`, `wg` |
//! | `navigation` | `breadcrumb`, `breadcrumblist`, `navlist`, `pageheader` |
//! | `toc` | `sect`, `toc` |
//! | `normative` | `normative`, `fmm`, `sstatus`, `normative-pages` |
//! | `terminology` | `vsexpansion`, `vsdesc`, `vsref`, `codelist` |
//! | `resource` | `name`, `resdesc`, `search`, `search-usage`, `examples`, `profiles`, `tree`, `xml`, `json`, `ttl`, `uml` |
//! | `profile` | `profile-title`, `profile-url`, `profile-desc`, `profile-base`, `ext-context` |
//! | `qa` | `qa-warn`, `qa`, `search-check` |
//! | `index` | `res-list`, `dt-list`, `vs-list` |
//!
//! Resolvers that record bookkeeping build the record first with a pure
//! function ([`section_entry`], [`membership`]) and only then write it to the
//! trackers. The publisher reuses [`membership`] for pages the model declares
//! normative.
//!
//! Text taken from the model is escaped so it can never open a directive of
//! its own; only templates, macros and `settitle` text are scanned.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use specpub_model::InMemorySpecification;
//! use specpub_resolvers::standard_registry;
//! use specpub_template::{Engine, PageContext};
//! use specpub_tracking::PublishState;
//!
//! let engine = Engine::new(Arc::new(InMemorySpecification::new("5.0.0")), standard_registry());
//! let mut page = PageContext::new("patient.html");
//! let mut state = PublishState::default();
//!
//! let html = engine.expand_page("<a>1<% id %>0</a>", &mut page, &mut state).unwrap();
//! assert_eq!(html, "<a>1patient0</a>");
//! ```

mod html;
mod index;
mod navigation;
mod normative;
mod page;
mod profile;
mod qa;
mod resource;
mod terminology;
mod toc;

#[cfg(test)]
mod testing;

use specpub_template::ResolverRegistry;

pub use normative::membership;
pub use qa::check_search_usage;
pub use toc::{render_toc, section_entry};

/// The full command table.
#[must_use]
pub fn standard_registry() -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();
    page::register(&mut registry);
    navigation::register(&mut registry);
    toc::register(&mut registry);
    normative::register(&mut registry);
    terminology::register(&mut registry);
    resource::register(&mut registry);
    profile::register(&mut registry);
    qa::register(&mut registry);
    index::register(&mut registry);
    tracing::debug!(commands = registry.len(), "Built resolver registry");
    registry
}
