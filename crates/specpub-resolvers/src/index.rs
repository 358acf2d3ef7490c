//! Index lists of resources, data types and value sets.

use std::fmt::Write;

use specpub_model::DataTypeKind;
use specpub_template::{ALL_ENTRY_POINTS, Directive, ResolveError, ResolverRegistry, Scope};

use crate::html::{escape_text, link, resource_file};

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("res-list", ALL_ENTRY_POINTS, "All resources with maturity", resource_list);
    registry.register("dt-list", ALL_ENTRY_POINTS, "Data types, optionally `primitive` or `complex` only", data_type_list);
    registry.register("vs-list", ALL_ENTRY_POINTS, "All value sets", value_set_list);
}

fn resource_list(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let spec = scope.spec();
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<ul class=\"res-list\">");
    for name in spec.resource_names() {
        let Some(resource) = spec.resource(name) else {
            continue;
        };
        let _ = write!(
            html,
            "<li>{} <span class=\"fmm\">FMM {}</span></li>",
            link(&format!("{prefix}{}", resource_file(name)), name),
            resource.fmm
        );
    }
    html.push_str("</ul>");
    Ok(html)
}

/// `dt-list [primitive|complex]`
fn data_type_list(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let filter = match directive.arg(0) {
        None => None,
        Some("primitive") => Some(DataTypeKind::Primitive),
        Some("complex") => Some(DataTypeKind::Complex),
        Some(other) => {
            return Err(ResolveError::Invalid {
                command: directive.command.clone(),
                message: format!("expected `primitive` or `complex`, found `{other}`"),
            });
        }
    };
    let spec = scope.spec();
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<ul class=\"dt-list\">");
    for name in spec.data_type_names() {
        let Some(data_type) = spec.data_type(name) else {
            continue;
        };
        if filter.is_some_and(|kind| kind != data_type.kind) {
            continue;
        }
        let _ = write!(
            html,
            "<li>{}</li>",
            link(&format!("{prefix}datatypes.html#{name}"), name)
        );
    }
    html.push_str("</ul>");
    Ok(html)
}

fn value_set_list(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<table class=\"vs-list\">\n");
    for value_set in scope.spec().value_sets() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td><code>{}</code></td></tr>",
            link(&format!("{prefix}{}", value_set.page_file()), &value_set.title),
            escape_text(&value_set.url)
        );
    }
    html.push_str("</table>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use specpub_template::PageContext;

    use super::*;
    use crate::testing::{engine, expand, expand_ok};

    #[test]
    fn test_res_list() {
        let html = expand_ok(&engine(), PageContext::new("resourcelist.html"), "<% res-list %>");
        assert_eq!(
            html,
            "<ul class=\"res-list\"><li><a href=\"patient.html\">Patient</a> \
             <span class=\"fmm\">FMM 5</span></li></ul>"
        );
    }

    #[test]
    fn test_dt_list_filters() {
        let page = || PageContext::new("datatypes.html");
        assert_eq!(
            expand_ok(&engine(), page(), "<% dt-list primitive %>"),
            "<ul class=\"dt-list\"><li><a href=\"datatypes.html#string\">string</a></li></ul>"
        );
        assert_eq!(
            expand_ok(&engine(), page(), "<% dt-list %>"),
            "<ul class=\"dt-list\"><li><a href=\"datatypes.html#HumanName\">HumanName</a></li>\
             <li><a href=\"datatypes.html#string\">string</a></li></ul>"
        );
        assert!(expand(&engine(), page(), "<% dt-list fancy %>").is_err());
    }

    #[test]
    fn test_vs_list() {
        let html = expand_ok(&engine(), PageContext::new("terminologies.html"), "<% vs-list %>");
        assert!(html.contains(
            "<tr><td><a href=\"valueset-languages.html\">languages</a></td>\
             <td><code>http://hl7.org/fhir/ValueSet/languages</code></td></tr>"
        ));
        assert_eq!(html.lines().count(), 4);
    }
}
