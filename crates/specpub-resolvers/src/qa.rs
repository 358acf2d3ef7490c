//! QA commands: raising diagnostics, rendering them, end-of-run checks.

use std::fmt::Write;

use specpub_model::Specification;
use specpub_template::{ALL_ENTRY_POINTS, Directive, ResolveError, ResolverRegistry, Scope};
use specpub_tracking::{ConsistencyError, SearchTypeUsage, ValidationLog};

use crate::html::escape_text;

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("qa-warn", ALL_ENTRY_POINTS, "Record a validation warning", warn);
    registry.register("qa", ALL_ENTRY_POINTS, "Validation messages raised so far", report);
    registry.register("search-check", ALL_ENTRY_POINTS, "Assert suspected-unused search parameters are unused", search_check);
}

/// Assert that no search parameter flagged as unused for a type was used with it.
///
/// # Errors
///
/// Returns [`ConsistencyError::SearchParameterUsed`] listing the offending
/// `name:type` tokens.
pub fn check_search_usage(usage: &SearchTypeUsage, spec: &dyn Specification) -> Result<usize, ConsistencyError> {
    let suspects = spec.suspected_unused_search_params();
    usage.check_unused(suspects.iter().map(|(name, kind)| (name.as_str(), kind.as_str())))?;
    Ok(suspects.len())
}

/// `qa-warn <message...>`: no output.
fn warn(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let message = directive.remainder();
    if message.is_empty() {
        return Err(ResolveError::MissingArgument {
            command: directive.command.clone(),
            argument: "message",
        });
    }
    scope.warn(message);
    Ok(String::new())
}

fn report(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    Ok(render_log(&scope.state.validation))
}

fn render_log(log: &ValidationLog) -> String {
    if log.is_empty() {
        return "<p class=\"qa\">No issues found.</p>".to_owned();
    }
    let mut html = String::from(
        "<table class=\"qa\">\n<tr><th>Severity</th><th>Location</th><th>Message</th></tr>\n",
    );
    for message in log.messages() {
        let _ = writeln!(
            html,
            "<tr class=\"qa-{}\"><td>{}</td><td>{}</td><td>{}</td></tr>",
            message.severity,
            message.severity,
            escape_text(&message.location),
            escape_text(&message.message),
        );
    }
    html.push_str("</table>\n");
    html
}

/// Fails the page with a consistency error when the check does not hold.
fn search_check(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let checked = check_search_usage(&scope.state.search_usage, scope.spec())?;
    Ok(format!(
        "<p class=\"search-check\">{checked} suspected unused search parameters confirmed unused.</p>"
    ))
}
