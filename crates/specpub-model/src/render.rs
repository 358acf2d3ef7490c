//! Sub-renderers for structure views (tree, XML, JSON, Turtle, UML).

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::definitions::ElementDefn;
use crate::error::RenderError;
use crate::specification::Specification;

/// Produces one HTML view of a model artifact.
pub trait SubRenderer: Send + Sync {
    /// Name the renderer is registered under (`tree`, `xml`, ...).
    fn name(&self) -> &str;

    /// Render the view of `target` (a resource or data type name).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the target is unknown or rendering fails.
    fn render(&self, target: &str, spec: &dyn Specification) -> Result<String, RenderError>;
}

/// Sub-renderers keyed by name.
#[derive(Default)]
pub struct Renderers {
    renderers: BTreeMap<String, Box<dyn SubRenderer>>,
}

impl std::fmt::Debug for Renderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.renderers.keys()).finish()
    }
}

impl Renderers {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in renderers.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with(ElementTreeRenderer)
    }

    /// Register a renderer, replacing any with the same name.
    #[must_use]
    pub fn with(mut self, renderer: impl SubRenderer + 'static) -> Self {
        self.renderers
            .insert(renderer.name().to_owned(), Box::new(renderer));
        self
    }

    /// Render `target` with the named renderer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unavailable`] when nothing is registered under
    /// `name`, or the renderer's own error.
    pub fn render(
        &self,
        name: &str,
        target: &str,
        spec: &dyn Specification,
    ) -> Result<String, RenderError> {
        let renderer = self
            .renderers
            .get(name)
            .ok_or_else(|| RenderError::Unavailable(name.to_owned()))?;
        renderer.render(target, spec)
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

/// Element table of a resource or data type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementTreeRenderer;

impl SubRenderer for ElementTreeRenderer {
    fn name(&self) -> &str {
        "tree"
    }

    fn render(&self, target: &str, spec: &dyn Specification) -> Result<String, RenderError> {
        let elements: &[ElementDefn] = if let Some(resource) = spec.resource(target) {
            &resource.elements
        } else if let Some(data_type) = spec.data_type(target) {
            &data_type.elements
        } else {
            return Err(RenderError::NotFound {
                renderer: self.name().to_owned(),
                target: target.to_owned(),
            });
        };

        let mut html = String::from(
            "<table class=\"grid\">\n<tr><th>Name</th><th>Card.</th><th>Type</th><th>Description</th></tr>\n",
        );
        for element in elements {
            let _ = writeln!(
                html,
                "<tr><td style=\"padding-left: {}em\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                element.depth(),
                escape_html(element.name()),
                escape_html(&element.card),
                escape_html(&element.types.join(" | ")),
                escape_html(&element.short),
            );
        }
        html.push_str("</table>\n");
        Ok(html)
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
