//! Table of contents: section registration and the contents tree.

use std::fmt::Write;

use specpub_model::{Specification, StandardsStatus, escape_html};
use specpub_template::directive::escape_delimiters;
use specpub_template::{ALL_ENTRY_POINTS, Directive, PageContext, ResolveError, ResolverRegistry, Scope};
use specpub_tracking::{MAX_RENDERED_DEPTH, SectionNumber, TableOfContents, TocEntry, TocInsert};

use crate::html::escape_text;

pub(crate) fn register(registry: &mut ResolverRegistry) {
    registry.register("sect", ALL_ENTRY_POINTS, "Register the page section and print its number", sect);
    registry.register("toc", ALL_ENTRY_POINTS, "Contents tree, optionally below a section", toc);
}

/// `sect`: register the page in the contents and print its number.
///
/// A second page claiming an already registered section number is reported
/// as a duplicate and not stored.
fn sect(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let Some(entry) = section_entry(scope.page, scope.spec()) else {
        return Err(ResolveError::WrongContext {
            command: directive.command.clone(),
            needs: "a section number",
        });
    };
    let number = entry.section.to_string();

    if scope.state.toc.insert(entry) == TocInsert::DuplicateSection {
        scope.warn(format!("section {number} is already registered by another page"));
    }
    Ok(number)
}

/// The contents entry a page registers, or `None` without a section number.
///
/// The icon comes from the model's page entry; the status from the page's
/// resource, or "Normative" for a page in a normative package.
#[must_use]
pub fn section_entry(page: &PageContext, spec: &dyn Specification) -> Option<TocEntry> {
    let section = page.section.clone()?;
    let mut entry = TocEntry::new(section, escape_html(page.effective_title()), page.current_file.clone());
    if let Some(icon) = spec.page(&page.current_file).and_then(|p| p.icon.clone()) {
        entry = entry.with_icon(icon);
    }
    let status = page
        .current_resource
        .as_deref()
        .and_then(|name| spec.resource(name))
        .map(|r| r.status)
        .or_else(|| page.normative_package.as_ref().map(|_| StandardsStatus::Normative));
    if let Some(status) = status {
        entry = entry.with_status(status.label());
    }
    Some(entry)
}

/// `toc [section]`: the whole contents tree, or the part below `section`.
fn toc(directive: &Directive, scope: &mut Scope<'_>) -> Result<String, ResolveError> {
    let root = directive
        .arg(0)
        .map(|s| {
            s.parse::<SectionNumber>().map_err(|e| ResolveError::Invalid {
                command: directive.command.clone(),
                message: e.to_string(),
            })
        })
        .transpose()?;
    Ok(render_toc(&scope.state.toc, root.as_ref(), &scope.page.root_prefix()))
}

/// Render contents entries as a table, one row per entry.
///
/// Entries deeper than [`MAX_RENDERED_DEPTH`] are left out. Entry text is
/// already HTML.
#[must_use]
pub fn render_toc(toc: &TableOfContents, root: Option<&SectionNumber>, prefix: &str) -> String {
    let entries: Vec<&TocEntry> = match root {
        Some(root) => toc
            .within(root)
            .filter(|e| e.depth() <= MAX_RENDERED_DEPTH)
            .collect(),
        None => toc.visible().collect(),
    };
    if entries.is_empty() {
        return String::new();
    }

    let mut html = String::from("<table class=\"toc\">\n");
    for entry in entries {
        let icon = if entry.icon.is_empty() {
            String::new()
        } else {
            format!("<img src=\"{prefix}{}\" alt=\"\"/> ", escape_text(&entry.icon))
        };
        let status = entry
            .status
            .as_deref()
            .map(|s| format!(" <span class=\"toc-status\">{}</span>", escape_text(s)))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><td class=\"toc-level-{}\">{icon}<a href=\"{prefix}{}\">{}</a> {}{status}</td></tr>",
            entry.depth(),
            escape_text(&entry.link),
            entry.section,
            escape_delimiters(&entry.text),
        );
    }
    html.push_str("</table>\n");
    html
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use specpub_tracking::PublishState;

    use super::*;
    use crate::testing::{engine, expand, resource_page, sample_spec};

    fn section(s: &str) -> SectionNumber {
        s.parse().unwrap()
    }

    #[test]
    fn test_sect_records_and_prints() {
        let page = resource_page().with_section(section("1.3"));
        let (html, state) = expand(&engine(), page, "<% sect %> Patient").unwrap();

        assert_eq!(html, "1.3 Patient");
        let entry = state.toc.get(&section("1.3")).unwrap();
        assert_eq!(entry.link, "patient.html");
        assert_eq!(entry.status.as_deref(), Some("Normative"));
    }

    #[test]
    fn test_sect_without_section() {
        let err = expand(&engine(), PageContext::new("a.html"), "<% sect %>").unwrap_err();
        assert_eq!(err.to_string(), "a.html: <% sect %>: `sect` needs a section number");
    }

    #[test]
    fn test_duplicate_section_warns() {
        let engine = engine();
        let mut state = PublishState::default();
        for file in ["a.html", "b.html"] {
            let mut page = PageContext::new(file).with_title(file).with_section(section("2"));
            engine.expand_page("<% sect %>", &mut page, &mut state).unwrap();
        }
        assert_eq!(state.toc.get(&section("2")).unwrap().link, "a.html");
        assert_eq!(state.validation.len(), 1);
    }

    #[test]
    fn test_section_entry_is_computed_without_state() {
        let mut page = resource_page().with_section(section("1.3"));
        page.working_title = Some("Patient & Co".to_owned());
        let entry = section_entry(&page, &sample_spec()).unwrap();
        assert_eq!(entry.section, section("1.3"));
        assert_eq!(entry.text, "Patient &amp; Co");
        assert_eq!(entry.status.as_deref(), Some("Normative"));

        assert_eq!(section_entry(&PageContext::new("a.html"), &sample_spec()), None);
    }

    #[test]
    fn test_failed_page_does_not_register_section() {
        let engine = engine();
        let mut state = PublishState::default();
        let mut page = PageContext::new("a.html").with_title("A").with_section(section("2"));
        assert!(engine
            .expand_page("<% sect %><% nosuchthing %>", &mut page, &mut state)
            .is_err());
        assert!(state.toc.is_empty());
    }

    #[test]
    fn test_render_toc_numeric_order_and_depth_limit() {
        let mut toc = TableOfContents::new();
        for (number, link) in [
            ("1.10", "ten.html"),
            ("1.9", "nine.html"),
            ("2.1.0", "two.html"),
            ("1.9.1.1.1", "deep.html"),
        ] {
            toc.insert(TocEntry::new(section(number), number, link));
        }

        let html = render_toc(&toc, None, "");
        let links: Vec<&str> = html
            .lines()
            .filter_map(|l| l.split("href=\"").nth(1))
            .filter_map(|l| l.split('"').next())
            .collect();
        assert_eq!(links, ["nine.html", "ten.html", "two.html"]);
    }

    #[test]
    fn test_render_toc_below_section() {
        let mut toc = TableOfContents::new();
        toc.insert(TocEntry::new(section("1"), "One", "one.html"));
        toc.insert(TocEntry::new(section("1.1"), "Sub", "sub.html").with_icon("icon.png"));
        toc.insert(TocEntry::new(section("2"), "Two", "two.html"));

        assert_eq!(
            render_toc(&toc, Some(&section("1")), "../"),
            "<table class=\"toc\">\n<tr><td class=\"toc-level-2\"><img src=\"../icon.png\" alt=\"\"/> \
             <a href=\"../sub.html\">1.1</a> Sub</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn test_literal_heading_text_is_not_rescanned_in_contents() {
        let engine = engine();
        let mut state = PublishState::default();
        let mut page = PageContext::new("a.html").with_title("A").with_section(section("3"));
        engine
            .expand_page(r"<% sect %><h2>Share \[% x %]</h2>", &mut page, &mut state)
            .unwrap();
        assert_eq!(state.toc.get(&section("3.1")).unwrap().text, "Share [% x %]");

        let mut contents = PageContext::new("toc.html");
        let html = engine.expand_page("<% toc %>", &mut contents, &mut state).unwrap();
        assert!(html.contains("<a href=\"a.html#3.1\">3.1</a> Share [% x %]</td>"));
    }

    #[test]
    fn test_toc_directive_with_bad_root() {
        let err = expand(&engine(), PageContext::new("toc.html"), "<% toc x.y %>").unwrap_err();
        assert!(err.to_string().contains("invalid section number"));
    }
}
