//! Small HTML helpers shared by the resolver families.

use specpub_model::{ResourceDefn, Specification, escape_html};
use specpub_template::directive::escape_delimiters;
use specpub_template::{PageContext, ResolveError, Scope};

/// Text as HTML that the directive loop leaves alone.
pub(crate) fn escape_text(text: &str) -> String {
    escape_delimiters(&escape_html(text))
}

/// `<a href="...">text</a>` with both parts escaped.
pub(crate) fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_text(href), escape_text(text))
}

/// The title a page prints.
///
/// A `settitle` text is returned as set so its directives run; a model title
/// keeps its markup but cannot start a directive.
pub(crate) fn printed_title(page: &PageContext) -> String {
    match &page.working_title {
        Some(text) => text.clone(),
        None => escape_delimiters(&page.title),
    }
}

/// Output filename of a resource page.
pub(crate) fn resource_file(name: &str) -> String {
    format!("{}.html", name.to_lowercase())
}

/// Text with markup removed.
pub(crate) fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// The resource named by the first argument, or the page's current resource.
pub(crate) fn target_resource<'s>(
    command: &str,
    explicit: Option<&str>,
    scope: &Scope<'s>,
) -> Result<&'s ResourceDefn, ResolveError> {
    let name = match explicit {
        Some(name) => name.to_owned(),
        None => scope
            .page
            .current_resource
            .clone()
            .ok_or_else(|| ResolveError::WrongContext {
                command: command.to_owned(),
                needs: "a current resource",
            })?,
    };
    lookup_resource(scope.spec(), &name)
}

pub(crate) fn lookup_resource<'s>(
    spec: &'s dyn Specification,
    name: &str,
) -> Result<&'s ResourceDefn, ResolveError> {
    spec.resource(name).ok_or_else(|| ResolveError::NotFound {
        kind: "resource",
        name: name.to_owned(),
    })
}
