//! The publishing run: pages, index pages, side artifacts, consistency.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use specpub_config::{CliSettings, Config};
use specpub_model::{
    HttpTerminology, InMemorySpecification, OfflineTerminology, PageEntry, Specification,
    Terminology,
};
use specpub_resolvers::{check_search_usage, membership, standard_registry};
use specpub_template::{DirectorySource, Engine, EngineConfig, ExpandError, MacroDictionary, PageContext};
use specpub_tracking::{
    BreadCrumbManager, ConsistencyError, NavNode, PublishState, Registration,
    SearchIndexEntry, normalize_link,
};

use crate::error::PublishError;
use crate::report::PublishReport;

/// Machine-readable search index written next to the pages.
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

const TOC_FILE: &str = "toc.html";
const QA_FILE: &str = "qa.html";

const TOC_TEMPLATE: &str = "<h1>Table of Contents</h1>\n<% toc %>\n";
const QA_TEMPLATE: &str = "<h1>QA Report</h1>\n<% qa %>\n";

/// Publishes a specification's page set.
///
/// # Example
///
/// ```no_run
/// use specpub_publisher::Publisher;
///
/// let mut publisher = Publisher::load(None, None)?;
/// let report = publisher.publish_all()?;
/// assert!(report.is_success());
/// # Ok::<(), specpub_publisher::PublishError>(())
/// ```
pub struct Publisher {
    engine: Engine,
    spec: Arc<dyn Specification>,
    output_dir: PathBuf,
    state: PublishState,
    report: PublishReport,
}

impl Publisher {
    /// Build a publisher from an already loaded model and terminology service.
    ///
    /// The engine is built once here: standard command table, macro
    /// dictionary from `config.paths.macros_dir`, page templates from
    /// `config.paths.pages_dir`, and the page hierarchy for breadcrumbs.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Macros`] if the macro dictionary cannot be read.
    pub fn new(
        config: &Config,
        spec: Arc<dyn Specification>,
        terminology: Arc<dyn Terminology>,
    ) -> Result<Self, PublishError> {
        let macros = MacroDictionary::load(&config.paths.macros_dir)?;
        let engine = Engine::new(Arc::clone(&spec), standard_registry())
            .with_terminology(terminology)
            .with_templates(DirectorySource::new(&config.paths.pages_dir))
            .with_macros(macros)
            .with_config(EngineConfig {
                max_iterations: config.expansion.max_iterations,
                max_include_depth: config.expansion.max_include_depth,
                post_pass: config.expansion.post_pass,
            });
        let state = PublishState::with_breadcrumbs(page_hierarchy(spec.pages()));

        Ok(Self {
            engine,
            spec,
            output_dir: config.paths.output_dir.clone(),
            state,
            report: PublishReport::default(),
        })
    }

    /// Load configuration, then build the publisher with [`from_config`](Self::from_config).
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Config`] if the configuration cannot be loaded,
    /// or any error from [`from_config`](Self::from_config).
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, PublishError> {
        let config = Config::load(config_path, cli_settings)?;
        Self::from_config(&config)
    }

    /// Load the model and connect the terminology service named in `config`.
    ///
    /// Expansion is offline unless the configuration names a terminology server.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Model`] if the model cannot be loaded, or any
    /// error from [`new`](Self::new).
    pub fn from_config(config: &Config) -> Result<Self, PublishError> {
        let spec = InMemorySpecification::load(&config.paths.model)?;
        let terminology: Arc<dyn Terminology> = match &config.terminology {
            Some(tx) => {
                tracing::info!(server = %tx.server, "Using terminology server");
                Arc::new(
                    HttpTerminology::new(tx.server.clone())
                        .with_timeout(tx.timeout())
                        .with_max_expansion_size(tx.max_expansion_size),
                )
            }
            None => Arc::new(OfflineTerminology::new()),
        };
        Self::new(config, Arc::new(spec), terminology)
    }

    /// The expansion engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Cross-page state accumulated so far.
    #[must_use]
    pub fn state(&self) -> &PublishState {
        &self.state
    }

    /// Report of the run so far.
    #[must_use]
    pub fn report(&self) -> &PublishReport {
        &self.report
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run pages, index pages and the consistency checks.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] when output cannot be written and
    /// [`PublishError::Consistency`] when an end-of-run check fails. The
    /// report stays available through [`report`](Self::report) in both cases.
    pub fn publish_all(&mut self) -> Result<&PublishReport, PublishError> {
        self.publish_pages()?;
        self.publish_index_pages()?;
        self.check_consistency()?;

        tracing::info!(
            written = self.report.written().len(),
            failed = self.report.failures().len(),
            warnings = self.state.validation.len(),
            "Publishing finished"
        );
        Ok(&self.report)
    }

    /// Expand and write every page of the model in document order.
    ///
    /// A page that fails to expand is recorded in the report; nothing is
    /// written for it and nothing it recorded in the trackers is kept. The
    /// remaining pages still run.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] if a page cannot be written.
    pub fn publish_pages(&mut self) -> Result<(), PublishError> {
        let spec = Arc::clone(&self.spec);
        for page in spec.pages() {
            self.publish_page(page)?;
        }
        Ok(())
    }

    fn publish_page(&mut self, page: &PageEntry) -> Result<(), PublishError> {
        tracing::debug!(page = %page.file, template = page.template_name(), "Publishing page");
        let mut context = PageContext::for_page(page);
        let html = match self
            .engine
            .expand_template(page.template_name(), &mut context, &mut self.state)
        {
            Ok(html) => html,
            Err(error) => {
                tracing::warn!(page = %page.file, error = %error, "Page failed");
                self.report.record_failure(&page.file, error);
                return Ok(());
            }
        };

        self.write_output(&page.file, &html)?;

        if let Some(package) = &page.normative_package {
            let info = membership(&context, page.kind);
            if let Registration::AlreadyRecorded { package: owner } = self.state.normative.record(package, info)
                && owner != *package
            {
                self.state.validation.warning(
                    &page.file,
                    format!("declared in normative package {package} but recorded in {owner}"),
                );
            }
        }

        let description = page
            .resource
            .as_deref()
            .and_then(|name| self.spec.resource(name))
            .map(|resource| resource.description.clone())
            .filter(|d| !d.is_empty());
        self.state.search_index.add(SearchIndexEntry {
            title: context.effective_title().to_owned(),
            link: page.file.clone(),
            kind: page.kind.as_str().to_owned(),
            description,
            work_group: self.state.breadcrumbs.work_group(&page.file).map(str::to_owned),
        });
        tracing::debug!(page = %page.file, bytes = html.len(), "Page written");
        Ok(())
    }

    /// Render the pages that summarise the whole run.
    ///
    /// Writes `toc.html`, one `normative-<package>.html` per package that
    /// has recorded pages, `qa.html` and the search index. An index page the
    /// model already lists is left to the model's own template.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] if a file cannot be written, or
    /// [`PublishError::SearchIndex`] if the index cannot be serialized.
    pub fn publish_index_pages(&mut self) -> Result<(), PublishError> {
        self.publish_generated(TOC_FILE, "Table of Contents", TOC_TEMPLATE)?;

        let packages: Vec<String> = self.state.normative.packages().map(str::to_owned).collect();
        for package in packages {
            let file = format!("normative-{package}.html");
            let template = format!(
                "<h1>Normative Content: {package}</h1>\n<% normative-pages {package} %>\n"
            );
            self.publish_generated(&file, &format!("Normative Content: {package}"), &template)?;
        }

        // Last, so it lists the diagnostics of the other index pages too.
        self.publish_generated(QA_FILE, "QA Report", QA_TEMPLATE)?;

        let index = serde_json::to_string_pretty(self.state.search_index.entries())?;
        self.write_output(SEARCH_INDEX_FILE, &index)?;
        Ok(())
    }

    fn publish_generated(&mut self, file: &str, title: &str, template: &str) -> Result<(), PublishError> {
        if self.spec.page(file).is_some() {
            tracing::debug!(page = file, "Index page provided by the model, not generating");
            return Ok(());
        }
        let mut context = PageContext::new(file).with_title(title);
        match self.engine.expand_page(template, &mut context, &mut self.state) {
            Ok(html) => self.write_output(file, &html),
            Err(error) => {
                tracing::warn!(page = file, error = %error, "Index page failed");
                self.report.record_failure(file, error);
                Ok(())
            }
        }
    }

    /// Expand one page without writing it.
    ///
    /// Uses the model's entry for `page.file` when there is one so the page
    /// sees its section, resource and package; otherwise `page` as given.
    ///
    /// # Errors
    ///
    /// Returns the page's [`ExpandError`].
    pub fn expand_single(&mut self, page: &PageEntry) -> Result<String, ExpandError> {
        let mut context = PageContext::for_page(page);
        self.engine
            .expand_template(page.template_name(), &mut context, &mut self.state)
    }

    /// Run the end-of-run invariant checks.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: a suspected-unused search parameter
    /// that was used, a contents entry linking to a page that was not
    /// written, or a page recorded under a package the model does not declare.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        check_search_usage(&self.state.search_usage, self.spec.as_ref())?;
        self.check_toc_links()?;
        self.check_packages()?;
        Ok(())
    }

    fn check_toc_links(&self) -> Result<(), ConsistencyError> {
        let written: HashSet<String> = self
            .report
            .written()
            .iter()
            .map(|file| normalize_link(file))
            .collect();
        let links: Vec<String> = self
            .state
            .toc
            .entries()
            .map(|entry| entry.link.as_str())
            .filter(|link| !link.contains("://"))
            .filter_map(|link| {
                let target = link.split('#').next().unwrap_or_default();
                (!target.is_empty() && !written.contains(&normalize_link(target)))
                    .then(|| link.to_owned())
            })
            .collect();
        if links.is_empty() {
            return Ok(());
        }
        Err(ConsistencyError::DanglingTocLinks { links })
    }

    fn check_packages(&self) -> Result<(), ConsistencyError> {
        let declared = self.spec.normative_packages();
        let packages: Vec<String> = self
            .state
            .normative
            .packages()
            .filter(|package| !declared.contains(package))
            .map(str::to_owned)
            .collect();
        if packages.is_empty() {
            return Ok(());
        }
        Err(ConsistencyError::UnknownPackages { packages })
    }

    fn write_output(&mut self, file: &str, content: &str) -> Result<(), PublishError> {
        let path = self.output_dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PublishError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| PublishError::Io {
            path: path.clone(),
            source,
        })?;
        self.report.record_written(file);
        Ok(())
    }
}

/// Breadcrumb hierarchy of every page that has a section number.
fn page_hierarchy(pages: &[PageEntry]) -> BreadCrumbManager {
    BreadCrumbManager::from_nodes(pages.iter().filter_map(|page| {
        Some(NavNode {
            section: page.section_number()?,
            title: page.title.clone(),
            link: page.file.clone(),
        })
    }))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use specpub_model::{
        Concept, EntryPoint, MockTerminology, ResourceDefn, SearchParam, StandardsStatus,
        ValueSetDefn, WorkGroup,
    };
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config_path = dir.path().join("specpub.toml");
            fs::write(&config_path, "").unwrap();
            fs::create_dir_all(dir.path().join("source")).unwrap();
            fs::create_dir_all(dir.path().join("templates")).unwrap();
            let config = Config::load(Some(&config_path), None).unwrap();
            Self { dir, config }
        }

        fn page(self, name: &str, text: &str) -> Self {
            fs::write(self.dir.path().join("source").join(name), text).unwrap();
            self
        }

        fn macro_fragment(self, name: &str, text: &str) -> Self {
            fs::write(self.dir.path().join("templates").join(format!("{name}.html")), text).unwrap();
            self
        }

        fn publisher(&self, spec: InMemorySpecification) -> Publisher {
            Publisher::new(&self.config, Arc::new(spec), Arc::new(OfflineTerminology::new())).unwrap()
        }

        fn output(&self, file: &str) -> String {
            fs::read_to_string(self.dir.path().join("publish").join(file)).unwrap()
        }

        fn output_exists(&self, file: &str) -> bool {
            self.dir.path().join("publish").join(file).exists()
        }
    }

    fn spec() -> InMemorySpecification {
        InMemorySpecification::new("5.0.0")
            .with_package("Foundation")
            .with_page(PageEntry::new("index.html", "Home"))
            .with_page(PageEntry::new("overview.html", "Overview").with_section("1"))
            .with_page(
                PageEntry::new("patient.html", "Patient")
                    .with_section("2")
                    .with_resource("Patient")
                    .with_normative_package("Foundation"),
            )
            .with_resource(
                ResourceDefn::new("Patient")
                    .with_description("Demographics.")
                    .with_maturity(5, StandardsStatus::Normative)
                    .with_search(SearchParam::new("gender", "token"))
                    .with_search(SearchParam::new("name", "string").suspected_unused_for("Practitioner")),
            )
    }

    fn fixture() -> Fixture {
        Fixture::new()
            .macro_fragment("footer", "<footer>v<% version %></footer>")
            .page("index.html", "<h1>Home</h1>[%footer%]")
            .page("overview.html", "<h1><% sect %> <% title %></h1><h2>Scope</h2>[%footer%]")
            .page("patient.html", "<h1><% sect %> <% name %></h1><% normative Foundation resource %>")
    }

    #[test]
    fn test_publish_all_writes_pages_in_order() {
        let fixture = fixture();
        let mut publisher = fixture.publisher(spec());

        let report = publisher.publish_all().unwrap();

        assert!(report.is_success());
        assert_eq!(
            report.written(),
            [
                "index.html",
                "overview.html",
                "patient.html",
                "toc.html",
                "normative-Foundation.html",
                "qa.html",
                SEARCH_INDEX_FILE,
            ]
        );
        assert_eq!(fixture.output("index.html"), "<h1>Home</h1><footer>v5.0.0</footer>");
        assert_eq!(
            fixture.output("overview.html"),
            "<h1>1 Overview</h1><h2 id=\"1.1\">1.1 Scope</h2><footer>v5.0.0</footer>"
        );
    }

    #[test]
    fn test_failing_page_is_isolated() {
        let fixture = fixture().page("overview.html", "<h1><% sect %></h1><% nosuchthing %>");
        let mut publisher = fixture.publisher(spec());

        publisher.publish_pages().unwrap();

        let report = publisher.report();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].file, "overview.html");
        assert!(matches!(report.failures()[0].error, ExpandError::Dispatch { .. }));
        assert!(!fixture.output_exists("overview.html"));
        assert!(fixture.output_exists("patient.html"));
    }

    #[test]
    fn test_failed_page_leaves_no_trace_in_trackers() {
        // `sect` and `normative` run before the failure is hit.
        let fixture = fixture()
            .page("overview.html", "<h1><% sect %></h1><% normative Foundation %><% qa-warn x %><% nosuchthing %>");
        let mut publisher = fixture.publisher(spec());

        let report = publisher.publish_all().unwrap();

        assert_eq!(report.failures().len(), 1);
        assert!(!fixture.output_exists("overview.html"));
        let state = publisher.state();
        assert!(!state.toc.contains_link("overview.html"));
        assert_eq!(state.normative.package_of("overview.html"), None);
        assert!(state.validation.is_empty());
        assert!(!fixture.output("toc.html").contains("overview.html"));
        assert!(!fixture.output("normative-Foundation.html").contains("overview.html"));
    }

    #[test]
    fn test_model_text_with_delimiters_is_published_literally() {
        let fixture = fixture().page("patient.html", "<h1><% sect %> <% name %></h1><% resdesc %>");
        let spec = spec().with_resource(
            ResourceDefn::new("Patient").with_description("Counts [% of total %] and <% id %> alike."),
        );
        let mut publisher = fixture.publisher(spec);

        let report = publisher.publish_all().unwrap();

        assert!(report.is_success());
        let html = fixture.output("patient.html");
        assert!(html.contains("Counts [% of total %] and"));
        assert!(!html.contains("\\["));
    }

    #[test]
    fn test_search_index_carries_work_group() {
        let fixture = fixture().page("overview.html", "<h1><% sect %></h1><p><% wg pa %></p>");
        let spec = spec().with_work_group(WorkGroup::new("pa", "Patient Administration", "http://example.org/pa"));
        let mut publisher = fixture.publisher(spec);
        publisher.publish_all().unwrap();

        let index: serde_json::Value = serde_json::from_str(&fixture.output(SEARCH_INDEX_FILE)).unwrap();
        assert_eq!(index[1]["link"], "overview.html");
        assert_eq!(index[1]["work_group"], "pa");
        assert!(index[2].get("work_group").is_none());
    }

    #[test]
    fn test_missing_template_is_page_failure() {
        let fixture = Fixture::new().page("index.html", "home");
        let mut publisher = fixture.publisher(spec());

        publisher.publish_pages().unwrap();

        let files: Vec<&str> = publisher.report().failures().iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, ["overview.html", "patient.html"]);
        assert!(matches!(
            publisher.report().failures()[0].error,
            ExpandError::TemplateNotFound { .. }
        ));
    }

    #[test]
    fn test_index_pages() {
        let fixture = fixture();
        let mut publisher = fixture.publisher(spec());
        publisher.publish_all().unwrap();

        let toc = fixture.output("toc.html");
        assert!(toc.starts_with("<h1>Table of Contents</h1>\n<table class=\"toc\">"));
        assert!(toc.contains("<a href=\"overview.html\">1</a> Overview"));
        assert!(toc.contains("<a href=\"overview.html#1.1\">1.1</a> Scope"));

        let normative = fixture.output("normative-Foundation.html");
        assert!(normative.contains("patient.html"));

        assert!(fixture.output("qa.html").contains("No issues found."));
    }

    #[test]
    fn test_search_index_json() {
        let fixture = fixture();
        let mut publisher = fixture.publisher(spec());
        publisher.publish_all().unwrap();

        let index: serde_json::Value = serde_json::from_str(&fixture.output(SEARCH_INDEX_FILE)).unwrap();
        assert_eq!(
            index[2],
            serde_json::json!({
                "title": "Patient",
                "link": "patient.html",
                "kind": "resource",
                "description": "Demographics."
            })
        );
        assert_eq!(index.as_array().unwrap().len(), 3);
        assert!(index[0].get("description").is_none());
    }

    #[test]
    fn test_page_declared_normative_is_recorded_without_directive() {
        let fixture = fixture().page("patient.html", "<h1><% sect %> <% name %></h1>");
        let mut publisher = fixture.publisher(spec());
        publisher.publish_pages().unwrap();

        assert_eq!(publisher.state().normative.package_of("patient.html"), Some("Foundation"));
    }

    #[test]
    fn test_unknown_package_is_fatal() {
        let fixture = fixture().page("patient.html", "<h1><% sect %></h1><% normative Imaginary %>");
        let spec = InMemorySpecification::new("5.0.0")
            .with_page(PageEntry::new("index.html", "Home"))
            .with_page(PageEntry::new("overview.html", "Overview").with_section("1"))
            .with_page(PageEntry::new("patient.html", "Patient").with_section("2"));
        let mut publisher = fixture.publisher(spec);

        let err = publisher.publish_all().unwrap_err();
        assert_eq!(
            err.to_string(),
            "consistency check failed: pages recorded under undeclared normative packages: Imaginary"
        );
    }

    #[test]
    fn test_used_suspect_search_parameter_is_fatal() {
        let fixture = fixture().page(
            "patient.html",
            "<h1><% sect %></h1><% search-usage name Practitioner %>",
        );
        let mut publisher = fixture.publisher(spec());

        publisher.publish_pages().unwrap();
        assert_eq!(
            publisher.check_consistency(),
            Err(ConsistencyError::SearchParameterUsed {
                violations: vec!["name:Practitioner".to_owned()]
            })
        );
    }

    #[test]
    fn test_model_page_overrides_generated_index() {
        let fixture = fixture().page("toc.html", "<h1>Contents</h1><% toc %>");
        let spec = spec().with_page(PageEntry::new("toc.html", "Contents"));
        let mut publisher = fixture.publisher(spec);
        publisher.publish_all().unwrap();

        assert!(fixture.output("toc.html").starts_with("<h1>Contents</h1>"));
        let toc_writes = publisher.report().written().iter().filter(|f| *f == "toc.html").count();
        assert_eq!(toc_writes, 1);
    }

    #[test]
    fn test_expand_single_does_not_write() {
        let fixture = fixture();
        let mut publisher = fixture.publisher(spec());
        let page = PageEntry::new("overview.html", "Overview").with_section("1");

        let html = publisher.expand_single(&page).unwrap();

        assert_eq!(
            html,
            "<h1>1 Overview</h1><h2 id=\"1.1\">1.1 Scope</h2><footer>v5.0.0</footer>"
        );
        assert!(!fixture.output_exists("overview.html"));
    }

    #[test]
    fn test_book_entry_suppresses_navigation() {
        let fixture = fixture().page("book.html", "<% breadcrumb %>|<% navlist %>|<% title %>");
        let mut publisher = fixture.publisher(spec());
        let page = PageEntry::new("book.html", "Everything").with_entry(EntryPoint::Book);

        assert_eq!(publisher.expand_single(&page).unwrap(), "||Everything");
    }

    #[test]
    fn test_terminology_failure_degrades_and_reaches_qa() {
        let fixture = fixture().page("index.html", "<h1>Home</h1><% vsexpansion gender %>");
        let spec = spec().with_value_set(
            ValueSetDefn::new("gender", "http://example.org/ValueSet/gender")
                .with_concept(Concept::new("male", "Male")),
        );
        let mut publisher = Publisher::new(
            &fixture.config,
            Arc::new(spec),
            Arc::new(MockTerminology::failing("connection refused")),
        )
        .unwrap();

        let report = publisher.publish_all().unwrap();

        assert!(report.is_success());
        assert!(fixture.output("index.html").contains("<p class=\"expansion-unavailable\">"));
        let qa = fixture.output("qa.html");
        assert!(qa.contains("expansion of http://example.org/ValueSet/gender unavailable"));
        assert!(qa.contains("connection refused"));
    }

    #[test]
    fn test_load_from_config_file() {
        let fixture = Fixture::new().page("index.html", "<p><% version %></p>");
        fs::write(
            fixture.dir.path().join("model.yaml"),
            "version: 4.0.1\npages:\n  - file: index.html\n    title: Home\n",
        )
        .unwrap();

        let mut publisher = Publisher::load(Some(&fixture.dir.path().join("specpub.toml")), None).unwrap();
        let report = publisher.publish_all().unwrap();

        assert!(report.is_success());
        assert_eq!(fixture.output("index.html"), "<p>4.0.1</p>");
    }

    #[test]
    fn test_load_missing_model() {
        let fixture = Fixture::new();
        let err = Publisher::from_config(&fixture.config).err().unwrap();
        assert!(matches!(err, PublishError::Model(_)));
    }

    #[test]
    fn test_output_subdirectories_created() {
        let fixture = fixture().page("nested.html", "<p>deep</p>");
        let spec = spec().with_page(PageEntry::new("sub/dir/page.html", "Deep").with_template("nested.html"));
        let mut publisher = fixture.publisher(spec);

        publisher.publish_pages().unwrap();

        assert_eq!(fixture.output("sub/dir/page.html"), "<p>deep</p>");
    }
}
