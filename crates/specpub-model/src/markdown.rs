//! Markdown collaborator.

use pulldown_cmark::{Options, Parser, html};

use crate::error::MarkdownError;

/// Converts Markdown descriptions from the model into HTML.
pub trait Markdown: Send + Sync {
    /// Render a block of Markdown.
    ///
    /// # Errors
    ///
    /// Returns [`MarkdownError`] if the source cannot be rendered.
    fn render(&self, source: &str) -> Result<String, MarkdownError>;

    /// Render Markdown for use inside a table cell or a sentence.
    ///
    /// A single wrapping paragraph is removed.
    fn render_inline(&self, source: &str) -> Result<String, MarkdownError> {
        let html = self.render(source)?;
        let trimmed = html.trim_end();
        if let Some(inner) = trimmed
            .strip_prefix("<p>")
            .and_then(|rest| rest.strip_suffix("</p>"))
            && !inner.contains("<p>")
        {
            return Ok(inner.to_owned());
        }
        Ok(html)
    }
}

/// `CommonMark` renderer with tables and strikethrough.
#[derive(Debug, Clone, Copy)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        Self::new()
    }
}

impl CommonMark {
    /// Create a renderer with the extensions used by specification text.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }
}

impl Markdown for CommonMark {
    fn render(&self, source: &str) -> Result<String, MarkdownError> {
        let parser = Parser::new_ext(source, self.options);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
