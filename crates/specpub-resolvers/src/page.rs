//! Page-level commands: identity, titles, levels, tabs and inclusion.

use std::fmt::Write;

use specpub_template::{ALL_ENTRY_POINTS, Directive, PageContext, ResolveError, ResolverRegistry, Scope};

use crate::html::{escape_text, link, printed_title, strip_tags};

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("id", ALL_ENTRY_POINTS, "Page file name without extension", id);
    registry.register("file", ALL_ENTRY_POINTS, "Insert a template verbatim", file);
    registry.register("include", ALL_ENTRY_POINTS, "Expand another template in its own context", include);
    registry.register("title", ALL_ENTRY_POINTS, "Page title", title);
    registry.register_prefix("settitle", ALL_ENTRY_POINTS, "Set the page title from free text", set_title);
    registry.register("xtitle", ALL_ENTRY_POINTS, "Model title as plain text", plain_title);
    registry.register("level", ALL_ENTRY_POINTS, "Relative prefix to the publication root", level);
    registry.register("setlevel", ALL_ENTRY_POINTS, "Set the navigation level", set_level);
    registry.register("settabs", ALL_ENTRY_POINTS, "Set the page tabs", set_tabs);
    registry.register("tabs", ALL_ENTRY_POINTS, "Render the page tabs", tabs);
    registry.register("version", ALL_ENTRY_POINTS, "Specification version", version);
    registry.register("gendate", ALL_ENTRY_POINTS, "Publication date", gen_date);
    registry.register("pagepath", ALL_ENTRY_POINTS, "Output file of the page", page_path);
    registry.register("wg", ALL_ENTRY_POINTS, "Responsible work group", work_group);
}

fn id(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(scope.page.page_id()))
}

/// `file <template>`: the raw template text, expanded as part of this page.
fn file(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let name = directive.require(0, "template")?;
    scope.read_template(name)
}

/// `include <template> [key=value ...]`
///
/// The template is expanded with a child context; each `key=value` pair
/// becomes an override for command `key` inside it.
fn include(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let name = directive.require(0, "template")?;
    let mut child = scope.page.child();
    for pair in &directive.args[1..] {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ResolveError::Invalid {
                command: directive.command.clone(),
                message: format!("expected key=value, found `{pair}`"),
            });
        };
        child.overrides.insert(key.to_owned(), value.to_owned());
    }
    scope.expand_file(name, &mut child)
}

fn title(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(printed_title(scope.page))
}

/// `settitle:Free text` or `settitle Free text`.
///
/// `{` and `}` in the text become directive delimiters, so a title can carry
/// directives of its own (`settitle:Release {version}`).
fn set_title(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let text = working_title(directive.text_after("settitle"));
    scope.page.working_title = Some(text);
    Ok(String::new())
}

fn working_title(text: &str) -> String {
    text.replace('{', "<%").replace('}', "%>")
}

/// Title from the model with markup removed, for `<title>` and similar.
fn plain_title(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(&strip_tags(&scope.page.title)))
}

fn level(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(scope.page.root_prefix())
}

fn set_level(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let value = directive.require(0, "level")?;
    let level = value.parse().map_err(|_| ResolveError::Invalid {
        command: directive.command.clone(),
        message: format!("`{value}` is not a level"),
    })?;
    scope.page.navigation_level = level;
    Ok(String::new())
}

/// `settabs <file> ...`: tabs shown by `tabs`, in order.
fn set_tabs(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    scope.page.active_tabs.clone_from(&directive.args);
    Ok(String::new())
}

fn tabs(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(render_tabs(scope.page, scope.spec()))
}

fn render_tabs(page: &PageContext, spec: &dyn specpub_model::Specification) -> String {
    if page.active_tabs.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul class=\"nav nav-tabs\">");
    for tab in &page.active_tabs {
        let label = spec
            .page(tab)
            .map_or_else(|| tab.trim_end_matches(".html").to_owned(), |p| p.title.clone());
        let class = if *tab == page.current_file { " class=\"active\"" } else { "" };
        let _ = write!(html, "<li{class}>{}</li>", link(tab, &label));
    }
    html.push_str("</ul>");
    html
}

fn version(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(scope.spec().version()))
}

fn gen_date(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(scope.spec().publication_date()))
}

fn page_path(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(escape_text(&scope.page.current_file))
}

/// `wg [code]`: link to the work group, which is also recorded for the page.
fn work_group(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let code = directive
        .arg(0)
        .map(str::to_owned)
        .or_else(|| scope.page.current_work_group.clone())
        .or_else(|| {
            let resource = scope.page.current_resource.as_deref()?;
            scope.spec().resource(resource)?.work_group.clone()
        })
        .ok_or_else(|| ResolveError::WrongContext {
            command: directive.command.clone(),
            needs: "a work group",
        })?;
    let group = scope.spec().work_group(&code).ok_or_else(|| ResolveError::NotFound {
        kind: "work group",
        name: code.clone(),
    })?;

    let html = link(&group.url, &group.name);
    let file = scope.page.current_file.clone();
    scope.state.breadcrumbs.record_work_group(&file, &code);
    Ok(html)
}
