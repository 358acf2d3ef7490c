//! Commands of the `Resource` entry point. All of them work on the page's
//! current resource.

use std::fmt::Write;

use specpub_model::{EntryPoint, ResourceDefn};
use specpub_template::directive::escape_delimiters;
use specpub_template::{Directive, ResolveError, ResolverRegistry, Scope};

use crate::html::{escape_text, link, target_resource};

const RESOURCE: &[EntryPoint] = &[EntryPoint::Resource];

/// Structure views delegated to sub-renderers, keyed by command name.
const VIEWS: [&str; 5] = ["tree", "xml", "json", "ttl", "uml"];

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("name", RESOURCE, "Resource name", name);
    registry.register("resdesc", RESOURCE, "Resource description", description);
    registry.register("search", RESOURCE, "Search parameter table", search);
    registry.register("search-usage", RESOURCE, "Record a search parameter used with a type", search_usage);
    registry.register("examples", RESOURCE, "Example instances", examples);
    registry.register("profiles", RESOURCE, "Profiles on the resource", profiles);
    for view in VIEWS {
        registry.register(view, RESOURCE, "Structure view from a sub-renderer", structure_view);
    }
}

fn current<'s>(directive: &Directive, scope: &Scope<'s>) -> Result<&'s ResourceDefn, ResolveError> {
    target_resource(&directive.command, None, scope)
}

fn name(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(&current(directive, scope)?.name))
}

fn description(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = current(directive, scope)?;
    match scope.markdown().render(&resource.description) {
        Ok(html) => Ok(escape_delimiters(&html)),
        Err(err) => Ok(scope.unavailable(&format!("description of {}", resource.name), &err)),
    }
}

fn search(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = current(directive, scope)?;
    if resource.search.is_empty() {
        return Ok(String::new());
    }
    let mut html = String::from(
        "<table class=\"grid\">\n<tr><th>Name</th><th>Type</th><th>Description</th><th>Expression</th></tr>\n",
    );
    for param in &resource.search {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_text(&param.code),
            escape_text(&param.kind),
            escape_text(&param.description),
            escape_text(param.expression.as_deref().unwrap_or_default()),
        );
    }
    html.push_str("</table>\n");
    Ok(html)
}

/// `search-usage <param> <type>`: produces no output.
fn search_usage(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let param = directive.require(0, "parameter")?;
    let type_name = directive.require(1, "type")?;
    scope.state.search_usage.record(param, type_name);
    Ok(String::new())
}

fn examples(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = current(directive, scope)?;
    if resource.examples.is_empty() {
        return Ok("<p>No examples.</p>".to_owned());
    }
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<table class=\"list\">\n");
    for example in &resource.examples {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            link(&format!("{prefix}{}", example.file), &example.id),
            escape_text(&example.description)
        );
    }
    html.push_str("</table>\n");
    Ok(html)
}

/// Profiles listed on the resource. Unknown ids are shown unlinked and
/// reported as warnings.
fn profiles(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = current(directive, scope)?;
    if resource.profiles.is_empty() {
        return Ok(String::new());
    }
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<ul class=\"profiles\">");
    for id in &resource.profiles {
        match scope.spec().profile(id) {
            Some(profile) => {
                let _ = write!(
                    html,
                    "<li>{}</li>",
                    link(&format!("{prefix}{}", profile.page_file()), &profile.title)
                );
            }
            None => {
                scope.warn(format!("{} lists unknown profile {id}", resource.name));
                let _ = write!(html, "<li>{}</li>", escape_text(id));
            }
        }
    }
    html.push_str("</ul>");
    Ok(html)
}

/// `tree`, `xml`, `json`, `ttl`, `uml`: the named sub-renderer's view.
fn structure_view(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = current(directive, scope)?;
    match scope.renderers().render(&directive.command, &resource.name, scope.spec()) {
        Ok(html) => Ok(escape_delimiters(&html)),
        Err(err) => Ok(scope.unavailable(&format!("{} view of {}", directive.command, resource.name), &err)),
    }
}
