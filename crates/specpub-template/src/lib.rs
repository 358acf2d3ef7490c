//! Directive expansion engine for specpub page templates.
//!
//! Page templates are HTML with embedded directives (`<% command args %>` or
//! `[% command args %]`). The [`Engine`] expands a template by resolving the
//! first directive in the buffer, splicing in its output and scanning again,
//! until none remain.
//!
//! # Dispatch
//!
//! A command is looked up in order:
//!
//! 1. the [`ResolverRegistry`], if the command supports the page's entry point
//! 2. the page's override texts ([`PageContext::overrides`])
//! 3. the [`MacroDictionary`]
//!
//! Anything else fails the page with [`ExpandError::Dispatch`].
//!
//! Resolvers receive a [`Scope`] giving access to the page context, the
//! cross-page trackers and the collaborators held by the engine.
//!
//! # Post-pass
//!
//! Pages with a section number get their `h2`..`h4` headings numbered and
//! registered in the table of contents once expansion is done.

pub mod directive;

mod context;
mod engine;
mod error;
mod macros;
mod post_pass;
mod registry;
mod source;

pub use context::PageContext;
pub use directive::Directive;
pub use engine::{DEFAULT_MAX_INCLUDE_DEPTH, DEFAULT_MAX_ITERATIONS, Engine, EngineConfig, Scope};
pub use error::{ExpandError, MacroError, ResolveError, ScanError};
pub use macros::MacroDictionary;
pub use post_pass::number_headings;
pub use registry::{
    ALL_ENTRY_POINTS, CommandInfo, NAVIGABLE, RegistryEntry, Resolver, ResolverRegistry,
};
pub use source::{DirectorySource, MemorySource, TemplateSource};
