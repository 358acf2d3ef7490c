//! Navigation chrome: breadcrumbs, sub-page lists and the page header.
//!
//! Every command here renders nothing in the `Book` entry point.

use std::fmt::Write;

use serde_json::json;
use specpub_model::EntryPoint;
use specpub_template::directive::escape_delimiters;
use specpub_template::{ALL_ENTRY_POINTS, Directive, PageContext, ResolveError, ResolverRegistry, Scope};
use specpub_tracking::{BreadcrumbItem, PublishState};

use crate::html::{escape_text, link, printed_title, resource_file};

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("breadcrumb", ALL_ENTRY_POINTS, "Breadcrumb trail", breadcrumb);
    registry.register("breadcrumblist", ALL_ENTRY_POINTS, "Breadcrumb trail as JSON-LD", breadcrumb_list);
    registry.register("navlist", ALL_ENTRY_POINTS, "Links to the sub-pages of this page", nav_list);
    registry.register("pageheader", ALL_ENTRY_POINTS, "Numbered page heading", page_header);
}

/// Trail for the current page. Resource pages showing a tab run through the
/// resource's main page.
fn trail(page: &PageContext, state: &PublishState) -> Vec<BreadcrumbItem> {
    if page.entry == EntryPoint::Resource
        && let Some(resource) = &page.current_resource
    {
        let main = resource_file(resource);
        let tab = (page.current_file != main).then(|| page.effective_title());
        return state.breadcrumbs.resource_crumbs(&main, resource, tab);
    }
    state.breadcrumbs.crumbs(&page.current_file)
}

fn breadcrumb(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    if scope.page.entry == EntryPoint::Book {
        return Ok(String::new());
    }
    let items = trail(scope.page, scope.state);
    if items.is_empty() {
        return Ok(String::new());
    }
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<ul class=\"breadcrumb\">");
    for item in &items {
        match &item.link {
            Some(target) => {
                let _ = write!(html, "<li>{}</li>", link(&format!("{prefix}{target}"), &item.title));
            }
            None => {
                let _ = write!(html, "<li class=\"active\">{}</li>", escape_text(&item.title));
            }
        }
    }
    html.push_str("</ul>");
    Ok(html)
}

/// schema.org `BreadcrumbList` for search engines.
fn breadcrumb_list(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    if scope.page.entry == EntryPoint::Book {
        return Ok(String::new());
    }
    let items = trail(scope.page, scope.state);
    if items.is_empty() {
        return Ok(String::new());
    }
    let elements: Vec<serde_json::Value> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut element = json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": item.title,
            });
            if let Some(target) = &item.link {
                element["item"] = json!(target);
            }
            element
        })
        .collect();
    let list = json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    });
    let body = escape_delimiters(&list.to_string().replace("</", "<\\/"));
    Ok(format!("<script type=\"application/ld+json\">{body}</script>"))
}

/// Direct sub-pages of the current page, in document order.
fn nav_list(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    if scope.page.entry == EntryPoint::Book {
        return Ok(String::new());
    }
    let Some(section) = &scope.page.section else {
        return Ok(String::new());
    };
    let children: Vec<_> = scope
        .spec()
        .pages()
        .iter()
        .filter(|p| {
            p.section_number()
                .is_some_and(|s| s.parent().as_ref() == Some(section))
        })
        .collect();
    if children.is_empty() {
        return Ok(String::new());
    }
    let prefix = scope.page.root_prefix();
    let mut html = String::from("<ul class=\"nav-list\">");
    for child in children {
        let _ = write!(html, "<li>{}</li>", link(&format!("{prefix}{}", child.file), &child.title));
    }
    html.push_str("</ul>");
    Ok(html)
}

fn page_header(_: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    if scope.page.entry == EntryPoint::Book {
        return Ok(String::new());
    }
    let number = scope
        .page
        .section
        .as_ref()
        .map(|s| format!("{s} "))
        .unwrap_or_default();
    Ok(format!(
        "<div class=\"page-header\"><h1>{number}{}</h1></div>",
        printed_title(scope.page)
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use specpub_model::Specification;
    use specpub_tracking::{BreadCrumbManager, NavNode};

    use super::*;
    use crate::testing::{engine, expand_ok, resource_page, sample_spec};

    fn hierarchy() -> BreadCrumbManager {
        let spec = sample_spec();
        BreadCrumbManager::from_nodes(spec.pages().iter().filter_map(|p| {
            Some(NavNode {
                section: p.section_number()?,
                title: p.title.clone(),
                link: p.file.clone(),
            })
        }))
        .with_home("Home", "index.html")
    }

    fn expand_with_hierarchy(page: PageContext, template: &str) -> String {
        let mut page = page;
        let mut state = PublishState::with_breadcrumbs(hierarchy());
        engine().expand_page(template, &mut page, &mut state).unwrap()
    }

    #[test]
    fn test_breadcrumb_for_nested_page() {
        let html = expand_with_hierarchy(PageContext::new("overview.html"), "<% breadcrumb %>");
        assert_eq!(
            html,
            "<ul class=\"breadcrumb\"><li><a href=\"index.html\">Home</a></li>\
             <li><a href=\"foundation.html\">Foundation</a></li>\
             <li class=\"active\">Overview</li></ul>"
        );
    }

    #[test]
    fn test_breadcrumb_for_resource_tab() {
        let page = PageContext::new("patient-examples.html")
            .with_entry(EntryPoint::Resource)
            .with_resource("Patient")
            .with_title("Examples")
            .with_level(1);
        let html = expand_with_hierarchy(page, "<% breadcrumb %>");
        assert_eq!(
            html,
            "<ul class=\"breadcrumb\"><li><a href=\"../index.html\">Home</a></li>\
             <li><a href=\"../foundation.html\">Foundation</a></li>\
             <li><a href=\"../patient.html\">Patient</a></li>\
             <li class=\"active\">Examples</li></ul>"
        );
    }

    #[test]
    fn test_book_renders_no_chrome() {
        let page = PageContext::new("overview.html").with_entry(EntryPoint::Book);
        let html = expand_with_hierarchy(page, "<% breadcrumb %><% breadcrumblist %><% navlist %><% pageheader %>");
        assert_eq!(html, "");
    }

    #[test]
    fn test_breadcrumb_list_json_ld() {
        let html = expand_with_hierarchy(PageContext::new("overview.html"), "<% breadcrumblist %>");
        let json = html
            .strip_prefix("<script type=\"application/ld+json\">")
            .and_then(|s| s.strip_suffix("</script>"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["@type"], "BreadcrumbList");
        assert_eq!(value["itemListElement"][0]["item"], "index.html");
        assert_eq!(value["itemListElement"][2]["name"], "Overview");
        assert!(value["itemListElement"][2].get("item").is_none());
    }

    #[test]
    fn test_navlist_lists_children() {
        let page = PageContext::new("foundation.html").with_section("1".parse().unwrap());
        let html = expand_ok(&engine(), page, "<% navlist %>");
        assert_eq!(
            html,
            "<ul class=\"nav-list\"><li><a href=\"overview.html\">Overview</a></li>\
             <li><a href=\"terminologies.html\">Terminologies</a></li>\
             <li><a href=\"patient.html\">Patient</a></li></ul>"
        );
    }

    #[test]
    fn test_model_title_with_delimiters_stays_literal() {
        let page = || resource_page().with_title("Patient [% draft %]").with_section("1.3".parse().unwrap());
        assert_eq!(
            expand_ok(&engine(), page(), "<% pageheader %>|<% title %>"),
            "<div class=\"page-header\"><h1>1.3 Patient [% draft %]</h1></div>|Patient [% draft %]"
        );

        let mut state = PublishState::with_breadcrumbs(BreadCrumbManager::from_nodes([NavNode {
            section: "1".parse().unwrap(),
            title: "Intro <% id %>".to_owned(),
            link: "intro.html".to_owned(),
        }]));
        let mut intro = PageContext::new("intro.html");
        let html = engine()
            .expand_page("<% breadcrumblist %>", &mut intro, &mut state)
            .unwrap();
        assert!(html.contains("\"name\":\"Intro <% id %>\""));
    }

    #[test]
    fn test_page_header() {
        let page = resource_page().with_section("1.3".parse().unwrap());
        let html = expand_ok(&engine(), page, "<% pageheader %>");
        assert_eq!(html, "<div class=\"page-header\"><h1>1.3 Patient</h1></div>");
    }
}
