//! Value set commands. Expansion goes through the terminology collaborator
//! and degrades to a placeholder when it fails.

use std::fmt::Write;

use specpub_model::{Concept, ExpansionItem, ValueSetDefn};
use specpub_template::directive::escape_delimiters;
use specpub_template::{ALL_ENTRY_POINTS, Directive, ResolveError, ResolverRegistry, Scope};

use crate::html::{escape_text, link};

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("vsexpansion", ALL_ENTRY_POINTS, "Expanded codes of a value set", expansion);
    registry.register("vsdesc", ALL_ENTRY_POINTS, "Value set description", description);
    registry.register("vsref", ALL_ENTRY_POINTS, "Link to a value set page", reference);
    registry.register("codelist", ALL_ENTRY_POINTS, "Concepts enumerated by a value set", code_list);
}

fn value_set<'s>(directive: &Directive, scope: &Scope<'s>) -> Result<&'s ValueSetDefn, ResolveError> {
    let key = directive.require(0, "value set")?;
    scope.spec().value_set(key).ok_or_else(|| ResolveError::NotFound {
        kind: "value set",
        name: key.to_owned(),
    })
}

/// `vsexpansion <url-or-id>`
fn expansion(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let value_set = value_set(directive, scope)?;
    let expansion = match scope.terminology().expand(value_set, true, false) {
        Ok(expansion) => expansion,
        Err(err) => {
            return Ok(scope.unavailable(&format!("expansion of {}", value_set.url), &err));
        }
    };

    let mut html = String::from(
        "<table class=\"codes\">\n<tr><th>System</th><th>Code</th><th>Display</th></tr>\n",
    );
    for item in &expansion.contains {
        push_item(&mut html, item, 0);
    }
    html.push_str("</table>\n");
    if expansion.truncated {
        let _ = writeln!(
            html,
            "<p class=\"expansion-truncated\">This expansion shows {} of {} codes.</p>",
            expansion.len(),
            expansion.total
        );
    }
    Ok(html)
}

fn push_item(html: &mut String, item: &ExpansionItem, depth: usize) {
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td style=\"padding-left: {}em\">{}</td><td>{}</td></tr>",
        escape_text(&item.system),
        depth,
        escape_text(&item.code),
        escape_text(&item.display),
    );
    for child in &item.contains {
        push_item(html, child, depth + 1);
    }
}

/// `vsdesc <url-or-id>`: the description rendered from Markdown.
fn description(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let value_set = value_set(directive, scope)?;
    match scope.markdown().render(&value_set.description) {
        Ok(html) => Ok(escape_delimiters(&html)),
        Err(err) => Ok(scope.unavailable(&format!("description of {}", value_set.id), &err)),
    }
}

/// `vsref <url-or-id>`
fn reference(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let value_set = value_set(directive, scope)?;
    let href = format!("{}{}", scope.page.root_prefix(), value_set.page_file());
    Ok(link(&href, &value_set.title))
}

/// `codelist <url-or-id>`: the concepts as defined in the model, not expanded.
fn code_list(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let value_set = value_set(directive, scope)?;
    if value_set.concepts.is_empty() {
        return Err(ResolveError::Invalid {
            command: directive.command.clone(),
            message: format!("value set `{}` enumerates no concepts", value_set.id),
        });
    }
    let mut html = String::from(
        "<table class=\"codes\">\n<tr><th>Code</th><th>Display</th><th>Definition</th></tr>\n",
    );
    for concept in &value_set.concepts {
        push_concept(&mut html, concept, 0);
    }
    html.push_str("</table>\n");
    Ok(html)
}

fn push_concept(html: &mut String, concept: &Concept, depth: usize) {
    let _ = writeln!(
        html,
        "<tr><td style=\"padding-left: {}em\">{}</td><td>{}</td><td>{}</td></tr>",
        depth,
        escape_text(&concept.code),
        escape_text(&concept.display),
        escape_text(concept.definition.as_deref().unwrap_or_default()),
    );
    for child in &concept.children {
        push_concept(html, child, depth + 1);
    }
}
