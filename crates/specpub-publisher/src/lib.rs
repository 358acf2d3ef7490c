//! Whole-run publishing for specpub.
//!
//! [`Publisher`] owns one expansion [`Engine`](specpub_template::Engine) and
//! the cross-page [`PublishState`](specpub_tracking::PublishState). It walks
//! the model's pages in document order, writes every page that expands
//! cleanly, records the ones that don't in a [`PublishReport`], renders the
//! index pages once all pages are known and finally runs the end-of-run
//! consistency checks.

mod error;
mod publisher;
mod report;

pub use error::PublishError;
pub use publisher::{Publisher, SEARCH_INDEX_FILE};
pub use report::{PageFailure, PublishReport};
