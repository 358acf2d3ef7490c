//! Template directive syntax.
//!
//! Templates are HTML with embedded directives in one of two delimiter
//! styles:
//!
//! ```text
//! <% command arg1 arg2 %>
//! [% command arg1 %]
//! [%! comment, removed from the output %]
//! ```
//!
//! # Example
//!
//! ```
//! use specpub_template::directive::{Directive, find_directive};
//!
//! let buffer = "<h1><% title %></h1>";
//! let span = find_directive(buffer).unwrap().unwrap();
//! let directive = Directive::parse(span.style, span.body);
//!
//! assert_eq!(directive.command, "title");
//! assert_eq!(span.before(buffer), "<h1>");
//! ```

mod escape;
mod parser;
mod scanner;

pub use escape::{escape_delimiters, unescape_delimiters};
pub use parser::Directive;
pub use scanner::{DelimiterStyle, DirectiveSpan, count_openers, find_directive, find_directive_from};
