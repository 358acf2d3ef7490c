//! Specification model and collaborator interfaces for specpub.
//!
//! Directive resolvers read everything they print from a [`Specification`]:
//! pages, resources, data types, value sets, profiles and work groups. The
//! model is immutable for the whole publishing run.
//!
//! Three collaborators sit next to the model and may fail:
//!
//! - [`Terminology`] expands value sets ([`OfflineTerminology`] from the
//!   model's own concepts, [`HttpTerminology`] through a terminology server)
//! - [`Markdown`] turns descriptions into HTML ([`CommonMark`])
//! - [`SubRenderer`] produces structure views, collected in [`Renderers`]
//!
//! Resolvers turn collaborator failures into inline placeholders instead of
//! failing the page.
//!
//! Test doubles for the collaborators are available behind the `mock` feature.

mod definitions;
mod error;
mod http;
mod markdown;
mod memory;
#[cfg(feature = "mock")]
mod mock;
mod render;
mod specification;
mod terminology;

pub use definitions::{
    Concept, DataTypeDefn, DataTypeKind, Designation, ElementDefn, EntryPoint, ExampleRef,
    PageEntry, ProfileDefn, ProfileKind, ResourceDefn, SearchParam, StandardsStatus,
    ValueSetDefn, WorkGroup,
};
pub use error::{MarkdownError, ModelError, RenderError, TerminologyError};
pub use http::{DEFAULT_MAX_EXPANSION_SIZE, DEFAULT_TIMEOUT, HttpTerminology};
pub use markdown::{CommonMark, Markdown};
pub use memory::InMemorySpecification;
#[cfg(feature = "mock")]
pub use mock::{MockMarkdown, MockTerminology};
pub use render::{ElementTreeRenderer, Renderers, SubRenderer, escape_html};
pub use specification::Specification;
pub use terminology::{Expansion, ExpansionItem, OfflineTerminology, Terminology};
