//! Expansion driver.
//!
//! The driver repeatedly finds the first directive in the buffer, resolves it
//! and splices the result in place, until no directive is left. Resolver
//! output is scanned again, so a resolver may emit further directives; one
//! that keeps reproducing itself is stopped by the iteration cap.

use std::sync::Arc;

use specpub_model::{
    CommonMark, Markdown, OfflineTerminology, Renderers, Specification, Terminology, escape_html,
};
use specpub_tracking::PublishState;

use crate::context::PageContext;
use crate::directive::{Directive, escape_delimiters, find_directive_from, unescape_delimiters};
use crate::error::{ExpandError, ResolveError};
use crate::macros::MacroDictionary;
use crate::post_pass;
use crate::registry::ResolverRegistry;
use crate::source::{MemorySource, TemplateSource};

/// Default cap on directives resolved per expansion.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Default cap on nested template inclusion.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 8;

/// Driver limits and switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directives resolved per expansion before giving up.
    pub max_iterations: usize,
    /// Nested `expand_file` depth.
    pub max_include_depth: usize,
    /// Number headings and register them in the contents after expansion.
    pub post_pass: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            post_pass: true,
        }
    }
}

/// Template expansion engine.
///
/// Built once per run; owns the command table, the macro dictionary and the
/// collaborators. Cross-page state is passed in by the caller on every call.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use specpub_model::InMemorySpecification;
/// use specpub_template::{Engine, PageContext, ResolverRegistry};
/// use specpub_tracking::PublishState;
///
/// let engine = Engine::new(Arc::new(InMemorySpecification::new("1.0")), ResolverRegistry::new());
/// let mut page = PageContext::new("index.html");
/// let mut state = PublishState::default();
///
/// let html = engine.expand_page("[%! note %]<p>Hi</p>", &mut page, &mut state).unwrap();
/// assert_eq!(html, "<p>Hi</p>");
/// ```
pub struct Engine {
    registry: ResolverRegistry,
    macros: MacroDictionary,
    spec: Arc<dyn Specification>,
    terminology: Arc<dyn Terminology>,
    markdown: Box<dyn Markdown>,
    renderers: Renderers,
    templates: Box<dyn TemplateSource>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with offline collaborators and no templates or macros.
    #[must_use]
    pub fn new(spec: Arc<dyn Specification>, registry: ResolverRegistry) -> Self {
        Self {
            registry,
            macros: MacroDictionary::new(),
            spec,
            terminology: Arc::new(OfflineTerminology::new()),
            markdown: Box::new(CommonMark::new()),
            renderers: Renderers::builtin(),
            templates: Box::new(MemorySource::new()),
            config: EngineConfig::default(),
        }
    }

    /// Set the terminology collaborator.
    #[must_use]
    pub fn with_terminology(mut self, terminology: Arc<dyn Terminology>) -> Self {
        self.terminology = terminology;
        self
    }

    /// Set the Markdown collaborator.
    #[must_use]
    pub fn with_markdown(mut self, markdown: impl Markdown + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    /// Set the sub-renderers.
    #[must_use]
    pub fn with_renderers(mut self, renderers: Renderers) -> Self {
        self.renderers = renderers;
        self
    }

    /// Set where templates are read from.
    #[must_use]
    pub fn with_templates(mut self, templates: impl TemplateSource + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    /// Set the macro dictionary.
    #[must_use]
    pub fn with_macros(mut self, macros: MacroDictionary) -> Self {
        self.macros = macros;
        self
    }

    /// Set limits and switches.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Command table.
    #[must_use]
    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Macro dictionary.
    #[must_use]
    pub fn macros(&self) -> &MacroDictionary {
        &self.macros
    }

    /// Specification model.
    #[must_use]
    pub fn spec(&self) -> &dyn Specification {
        self.spec.as_ref()
    }

    /// Limits and switches.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand a page template by name.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::TemplateNotFound`] if the template cannot be
    /// read, or any error from [`expand_page`](Self::expand_page).
    pub fn expand_template(
        &self,
        name: &str,
        page: &mut PageContext,
        state: &mut PublishState,
    ) -> Result<String, ExpandError> {
        let text = self.load_template(name, &page.current_file)?;
        self.expand_page(&text, page, state)
    }

    /// Expand a whole page.
    ///
    /// Runs the directive loop, turns escaped delimiters into literal ones and
    /// applies the post-pass when enabled and the page has a section number.
    /// A page either succeeds or leaves `state` exactly as it found it.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError`] on the first failure; nothing of the page
    /// should be written then.
    pub fn expand_page(
        &self,
        template: &str,
        page: &mut PageContext,
        state: &mut PublishState,
    ) -> Result<String, ExpandError> {
        tracing::debug!(page = %page.current_file, entry = %page.entry, "Expanding page");
        let checkpoint = state.checkpoint();
        let result = self.expand_whole(template, page, state);
        if result.is_err() {
            tracing::debug!(page = %page.current_file, "Discarding tracker writes of failed page");
            state.rollback(checkpoint);
        }
        result
    }

    fn expand_whole(
        &self,
        template: &str,
        page: &mut PageContext,
        state: &mut PublishState,
    ) -> Result<String, ExpandError> {
        let expanded = self.expand(template.to_owned(), page, state, 0)?;
        let html = unescape_delimiters(&expanded);

        if self.config.post_pass
            && let Some(section) = page.section.clone()
        {
            return post_pass::number_headings(&html, &section, &page.current_file, &mut state.toc);
        }
        Ok(html)
    }

    fn load_template(&self, name: &str, file: &str) -> Result<String, ExpandError> {
        self.templates.read(name).map_err(|e| {
            tracing::debug!(page = file, template = name, error = %e, "Template not readable");
            ExpandError::TemplateNotFound {
                file: file.to_owned(),
                name: name.to_owned(),
            }
        })
    }

    /// The directive loop. Escaped delimiters are left as they are.
    fn expand(
        &self,
        text: String,
        page: &mut PageContext,
        state: &mut PublishState,
        depth: usize,
    ) -> Result<String, ExpandError> {
        let mut buffer = text;
        let mut from = 0;
        let mut iterations = 0;

        loop {
            let found = find_directive_from(&buffer, from).map_err(|source| ExpandError::Scan {
                file: page.current_file.clone(),
                source,
            })?;
            let Some(span) = found else {
                break;
            };
            let (start, end) = (span.start, span.end);
            let resume = span.resume_at();
            let directive = Directive::parse(span.style, span.body);
            let raw = buffer[start..end].to_owned();

            iterations += 1;
            if iterations > self.config.max_iterations {
                return Err(ExpandError::Runaway {
                    file: page.current_file.clone(),
                    raw,
                    limit: self.config.max_iterations,
                });
            }

            let output = if directive.is_comment() {
                String::new()
            } else {
                self.dispatch(&directive, &raw, page, state, depth)?
            };
            buffer.replace_range(start..end, &output);

            // Text before `resume` holds no opener; back up one character so
            // an opener split across the boundary is still found.
            from = resume.saturating_sub(1);
            while !buffer.is_char_boundary(from) {
                from -= 1;
            }
        }

        Ok(buffer)
    }

    /// Resolve one directive: command table, page overrides, macros, error.
    fn dispatch(
        &self,
        directive: &Directive,
        raw: &str,
        page: &mut PageContext,
        state: &mut PublishState,
        depth: usize,
    ) -> Result<String, ExpandError> {
        if let Some(entry) = self.registry.lookup(&directive.command, page.entry) {
            let file = page.current_file.clone();
            let mut scope = Scope {
                engine: self,
                page,
                state,
                depth,
            };
            return entry
                .resolver()
                .resolve(directive, &mut scope)
                .map_err(|source| ExpandError::Resolve {
                    file,
                    raw: raw.to_owned(),
                    source,
                });
        }
        if let Some(text) = page.overrides.get(&directive.command) {
            return Ok(text.clone());
        }
        if let Some(text) = self.macros.get(&directive.command) {
            return Ok(text.to_owned());
        }
        Err(ExpandError::Dispatch {
            file: page.current_file.clone(),
            command: directive.command.clone(),
            raw: raw.to_owned(),
        })
    }
}

/// What a resolver can reach while resolving one directive.
pub struct Scope<'a> {
    engine: &'a Engine,
    /// The page being expanded.
    pub page: &'a mut PageContext,
    /// Cross-page trackers.
    pub state: &'a mut PublishState,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    /// Specification model.
    #[must_use]
    pub fn spec(&self) -> &'a dyn Specification {
        self.engine.spec.as_ref()
    }

    /// Terminology collaborator.
    #[must_use]
    pub fn terminology(&self) -> &'a dyn Terminology {
        self.engine.terminology.as_ref()
    }

    /// Markdown collaborator.
    #[must_use]
    pub fn markdown(&self) -> &'a dyn Markdown {
        self.engine.markdown.as_ref()
    }

    /// Sub-renderers.
    #[must_use]
    pub fn renderers(&self) -> &'a Renderers {
        &self.engine.renderers
    }

    /// Current include depth (0 for the page itself).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Expand another template with its own page context.
    ///
    /// The result has been through the full directive loop; escaped
    /// delimiters stay escaped until the outer page is done.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Nested`] when the include depth is exceeded,
    /// the template is missing or its expansion fails.
    pub fn expand_file(&mut self, name: &str, page: &mut PageContext) -> Result<String, ResolveError> {
        let limit = self.engine.config.max_include_depth;
        if self.depth >= limit {
            return Err(ExpandError::IncludeDepth {
                file: self.page.current_file.clone(),
                target: name.to_owned(),
                limit,
            }
            .into());
        }
        let text = self.engine.load_template(name, &self.page.current_file)?;
        Ok(self.engine.expand(text, page, self.state, self.depth + 1)?)
    }

    /// Raw text of a template, not expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Nested`] if the template cannot be read.
    pub fn read_template(&self, name: &str) -> Result<String, ResolveError> {
        Ok(self.engine.load_template(name, &self.page.current_file)?)
    }

    /// Record a validation warning against the current page.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.state
            .validation
            .warning(self.page.current_file.clone(), message);
    }

    /// Degrade a collaborator failure to an inline placeholder.
    ///
    /// Logs the failure, records a validation warning and returns the
    /// placeholder HTML.
    pub fn unavailable(&mut self, what: &str, error: &dyn std::error::Error) -> String {
        tracing::warn!(
            page = %self.page.current_file,
            what,
            error = %error,
            "Collaborator failed, rendering placeholder"
        );
        self.warn(format!("{what} unavailable: {error}"));
        escape_delimiters(&format!(
            "<p class=\"expansion-unavailable\">{} unavailable: {}</p>",
            escape_html(what),
            escape_html(&error.to_string())
        ))
    }
}
