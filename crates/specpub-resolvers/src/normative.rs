//! Normative package membership, maturity and standards status.

use std::fmt::Write;

use specpub_model::{EntryPoint, StandardsStatus};
use specpub_template::{ALL_ENTRY_POINTS, Directive, PageContext, ResolveError, ResolverRegistry, Scope};
use specpub_tracking::{PageInfo, PageKind, Registration};

use crate::html::{escape_text, link, target_resource};

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("normative", ALL_ENTRY_POINTS, "Declare package membership and show the banner", normative);
    registry.register("fmm", ALL_ENTRY_POINTS, "Maturity level of a resource", maturity);
    registry.register("sstatus", ALL_ENTRY_POINTS, "Standards status of a resource or profile", standards_status);
    registry.register("normative-pages", ALL_ENTRY_POINTS, "Pages recorded under a package", normative_pages);
}

/// The record a page contributes to a normative package.
///
/// Uses the title the page prints, so a `settitle` is honoured.
#[must_use]
pub fn membership(page: &PageContext, kind: PageKind) -> PageInfo {
    PageInfo::new(kind, page.current_file.clone(), page.effective_title())
}

/// `normative <package> [kind]`
fn normative(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let package = directive.require(0, "package")?.to_owned();
    let kind = match directive.arg(1) {
        Some(kind) => kind.parse::<PageKind>().map_err(|message| ResolveError::Invalid {
            command: directive.command.clone(),
            message,
        })?,
        None => default_kind(scope),
    };

    let info = membership(scope.page, kind);
    match scope.state.normative.record(&package, info) {
        Registration::AlreadyRecorded { package: existing } if existing != package => {
            let message = format!("page is already in package {existing}, not moved to {package}");
            scope.warn(message);
        }
        _ => {}
    }
    scope.page.normative_package = Some(package.clone());

    let prefix = scope.page.root_prefix();
    Ok(format!(
        "<div class=\"normative-banner\">This page is part of the {} normative package.</div>",
        link(&format!("{prefix}normative-{package}.html"), &package)
    ))
}

fn default_kind(scope: &Scope<'_>) -> PageKind {
    match scope.page.entry {
        EntryPoint::Resource => PageKind::Resource,
        EntryPoint::Profile => {
            let is_extension = scope
                .page
                .current_profile
                .as_deref()
                .is_some_and(|id| scope.spec().extension(id).is_some());
            if is_extension { PageKind::Extension } else { PageKind::Profile }
        }
        EntryPoint::Page | EntryPoint::Book => PageKind::Page,
    }
}

/// `fmm [resource]`
fn maturity(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let resource = target_resource(&directive.command, directive.arg(0), scope)?;
    Ok(format!(
        "<a href=\"{}versions.html#maturity\">Maturity Level</a>: {}",
        scope.page.root_prefix(),
        resource.fmm
    ))
}

/// `sstatus [resource]`: the named resource, else the page's profile or resource.
fn standards_status(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let profile_status = match (directive.arg(0), scope.page.current_profile.as_deref()) {
        (None, Some(id)) => scope
            .spec()
            .profile(id)
            .or_else(|| scope.spec().extension(id))
            .map(|p| p.status),
        _ => None,
    };
    let status = match profile_status {
        Some(status) => status,
        None => target_resource(&directive.command, directive.arg(0), scope)?.status,
    };
    Ok(status_html(status, &scope.page.root_prefix()))
}

fn status_html(status: StandardsStatus, prefix: &str) -> String {
    format!(
        "<a href=\"{prefix}versions.html#std-process\">Standards Status</a>: \
         <span class=\"sstatus-{}\">{}</span>",
        status.as_str(),
        status.label()
    )
}

/// `normative-pages <package>`: the pages recorded so far, grouped by kind.
fn normative_pages(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let package = directive.require(0, "package")?;
    let Some(pages) = scope.state.normative.pages(package) else {
        return Ok(format!(
            "<p class=\"normative-pages\">No pages recorded for {}.</p>",
            escape_text(package)
        ));
    };

    let mut sorted: Vec<&PageInfo> = pages.values().collect();
    sorted.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.filename.cmp(&b.filename)));

    let prefix = scope.page.root_prefix();
    let mut html = String::from("<table class=\"normative-pages\">\n");
    for page in sorted {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            page.kind,
            link(&format!("{prefix}{}", page.filename), &page.title)
        );
    }
    html.push_str("</table>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use specpub_template::PageContext;
    use specpub_tracking::PublishState;

    use super::*;
    use crate::testing::{engine, expand, expand_ok, resource_page};

    #[test]
    fn test_membership_uses_printed_title() {
        let mut page = PageContext::new("x.html").with_title("Model title");
        assert_eq!(
            membership(&page, PageKind::Page),
            PageInfo::new(PageKind::Page, "x.html", "Model title")
        );
        page.working_title = Some("Set by page".to_owned());
        assert_eq!(membership(&page, PageKind::Page).title, "Set by page");
    }

    #[test]
    fn test_settitle_reaches_recorded_title() {
        let (_, state) = expand(
            &engine(),
            PageContext::new("x.html").with_title("Model title"),
            "<% settitle:Set by page %><% normative Foundation %>",
        )
        .unwrap();
        assert_eq!(state.normative.pages("Foundation").unwrap()["x.html"].title, "Set by page");
    }

    #[test]
    fn test_failed_page_not_recorded() {
        let engine = engine();
        let mut state = PublishState::default();
        let mut page = PageContext::new("overview.html");
        assert!(engine
            .expand_page("<% normative p1 %><% nosuchthing %>", &mut page, &mut state)
            .is_err());
        assert_eq!(state.normative.pages("p1"), None);
        assert!(state.validation.is_empty());
    }

    #[test]
    fn test_normative_directive_records_and_warns_on_move() {
        let engine = engine();
        let mut state = PublishState::default();

        let mut page = resource_page();
        let html = engine
            .expand_page("<% normative Foundation %>", &mut page, &mut state)
            .unwrap();
        assert_eq!(
            html,
            "<div class=\"normative-banner\">This page is part of the \
             <a href=\"normative-Foundation.html\">Foundation</a> normative package.</div>"
        );
        assert_eq!(page.normative_package.as_deref(), Some("Foundation"));

        let mut again = resource_page();
        engine
            .expand_page("<% normative Other %>", &mut again, &mut state)
            .unwrap();

        assert_eq!(state.normative.package_of("patient.html"), Some("Foundation"));
        let info = &state.normative.pages("Foundation").unwrap()["patient.html"];
        assert_eq!(info.kind, PageKind::Resource);
        assert_eq!(state.validation.len(), 1);
    }

    #[test]
    fn test_definitions_page_excluded() {
        let page = PageContext::new("patient-definitions.html");
        let (_, state) = expand(&engine(), page, "<% normative Foundation %>").unwrap();
        assert!(state.normative.is_empty());
    }

    #[test]
    fn test_explicit_kind_must_parse() {
        let err = expand(&engine(), PageContext::new("a.html"), "<% normative Foundation widget %>").unwrap_err();
        assert!(err.to_string().contains("unknown page kind `widget`"));
    }

    #[test]
    fn test_fmm_and_sstatus() {
        let html = expand_ok(&engine(), resource_page(), "<% fmm %> | <% sstatus %>");
        assert_eq!(
            html,
            "<a href=\"versions.html#maturity\">Maturity Level</a>: 5 | \
             <a href=\"versions.html#std-process\">Standards Status</a>: \
             <span class=\"sstatus-normative\">Normative</span>"
        );
    }

    #[test]
    fn test_fmm_needs_resource() {
        let err = expand(&engine(), PageContext::new("a.html"), "<% fmm %>").unwrap_err();
        assert!(err.to_string().ends_with("`fmm` needs a current resource"));

        let err = expand(&engine(), PageContext::new("a.html"), "<% fmm Nothing %>").unwrap_err();
        assert!(err.to_string().ends_with("no resource named `Nothing`"));
    }

    #[test]
    fn test_sstatus_on_profile_page() {
        let mut page = PageContext::new("us-patient.html").with_profile("us-patient");
        page.entry = EntryPoint::Profile;
        let html = expand_ok(&engine(), page, "<% sstatus %>");
        assert!(html.ends_with("<span class=\"sstatus-draft\">Draft</span>"));
    }

    #[test]
    fn test_normative_pages_listing() {
        let engine = engine();
        let mut state = PublishState::default();
        for (file, template) in [
            ("b.html", "<% normative Foundation %>"),
            ("a.html", "<% normative Foundation %>"),
        ] {
            let mut page = PageContext::new(file).with_title(file.to_uppercase());
            engine.expand_page(template, &mut page, &mut state).unwrap();
        }
        let mut index = PageContext::new("normative-Foundation.html");
        let html = engine
            .expand_page("<% normative-pages Foundation %><% normative-pages Empty %>", &mut index, &mut state)
            .unwrap();
        assert_eq!(
            html,
            "<table class=\"normative-pages\">\n\
             <tr><td>page</td><td><a href=\"a.html\">A.HTML</a></td></tr>\n\
             <tr><td>page</td><td><a href=\"b.html\">B.HTML</a></td></tr>\n\
             </table>\n<p class=\"normative-pages\">No pages recorded for Empty.</p>"
        );
    }
}
