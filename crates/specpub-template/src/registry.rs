//! Resolver registry.
//!
//! Maps command names to resolvers. Lookup tries exact names first, then
//! prefix entries in registration order. An entry registered for other entry
//! points than the current one counts as a miss, so the engine falls through
//! to page overrides and macros exactly as for an unknown command.

use std::collections::BTreeMap;

use specpub_model::EntryPoint;

use crate::directive::Directive;
use crate::engine::Scope;
use crate::error::ResolveError;

/// Computes the replacement text of a directive.
///
/// The returned text is scanned again, so it must not contain unescaped
/// delimiters unless they are meant to be expanded.
pub trait Resolver: Send + Sync {
    /// Resolve one directive.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when a precondition fails. The page is
    /// abandoned.
    fn resolve(&self, directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError>;
}

impl<F> Resolver for F
where
    F: Fn(&Directive, &mut Scope<'_>) -> Result<String, ResolveError> + Send + Sync,
{
    fn resolve(&self, directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
        self(directive, scope)
    }
}

/// Entry points a command is available in.
pub const ALL_ENTRY_POINTS: &[EntryPoint] = &EntryPoint::ALL;

/// Entry points that carry navigation chrome.
pub const NAVIGABLE: &[EntryPoint] = &[EntryPoint::Page, EntryPoint::Resource, EntryPoint::Profile];

/// One registered command.
pub struct RegistryEntry {
    resolver: Box<dyn Resolver>,
    entries: Vec<EntryPoint>,
    summary: &'static str,
}

impl RegistryEntry {
    /// True if the command may be used in `entry`.
    #[must_use]
    pub fn supports(&self, entry: EntryPoint) -> bool {
        self.entries.contains(&entry)
    }

    /// Entry points the command is available in.
    #[must_use]
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entries
    }

    /// One-line description.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// The resolver.
    #[must_use]
    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("entries", &self.entries)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Listing row for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    /// Command name or prefix.
    pub name: String,
    /// True for prefix entries.
    pub prefix: bool,
    /// Entry points.
    pub entries: Vec<EntryPoint>,
    /// Description.
    pub summary: &'static str,
}

/// Command table built once at startup.
#[derive(Debug, Default)]
pub struct ResolverRegistry {
    exact: BTreeMap<String, RegistryEntry>,
    prefixes: Vec<(String, RegistryEntry)>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command available in `entries`. A later registration of the
    /// same name replaces the earlier one.
    pub fn register(
        &mut self,
        name: &str,
        entries: &[EntryPoint],
        summary: &'static str,
        resolver: impl Resolver + 'static,
    ) {
        if self.exact.contains_key(name) {
            tracing::debug!(command = name, "Replacing registered resolver");
        }
        self.exact.insert(
            name.to_owned(),
            RegistryEntry {
                resolver: Box::new(resolver),
                entries: entries.to_vec(),
                summary,
            },
        );
    }

    /// Register a command matched by prefix (e.g., `settitle` for `settitle:Text`).
    pub fn register_prefix(
        &mut self,
        prefix: &str,
        entries: &[EntryPoint],
        summary: &'static str,
        resolver: impl Resolver + 'static,
    ) {
        self.prefixes.push((
            prefix.to_owned(),
            RegistryEntry {
                resolver: Box::new(resolver),
                entries: entries.to_vec(),
                summary,
            },
        ));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(
        mut self,
        name: &str,
        entries: &[EntryPoint],
        summary: &'static str,
        resolver: impl Resolver + 'static,
    ) -> Self {
        self.register(name, entries, summary, resolver);
        self
    }

    /// Find the resolver for a command in an entry point.
    #[must_use]
    pub fn lookup(&self, command: &str, entry: EntryPoint) -> Option<&RegistryEntry> {
        if let Some(found) = self.exact.get(command)
            && found.supports(entry)
        {
            return Some(found);
        }
        self.prefixes
            .iter()
            .find(|(prefix, found)| command.starts_with(prefix.as_str()) && found.supports(entry))
            .map(|(_, found)| found)
    }

    /// True if the command is registered for any entry point.
    #[must_use]
    pub fn contains(&self, command: &str) -> bool {
        self.exact.contains_key(command)
            || self
                .prefixes
                .iter()
                .any(|(prefix, _)| command.starts_with(prefix.as_str()))
    }

    /// Every registered command, exact names sorted, then prefixes.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandInfo> {
        let exact = self.exact.iter().map(|(name, entry)| (name, entry, false));
        let prefixes = self.prefixes.iter().map(|(name, entry)| (name, entry, true));
        exact
            .chain(prefixes)
            .map(|(name, entry, prefix)| CommandInfo {
                name: name.clone(),
                prefix,
                entries: entry.entries.clone(),
                summary: entry.summary,
            })
            .collect()
    }

    /// Number of registered commands and prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }
}
