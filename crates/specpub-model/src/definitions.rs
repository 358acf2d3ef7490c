//! Definitions held by the specification model.
//!
//! Everything here is plain data deserialised from the model file. Field
//! defaults are permissive so that a partially filled model still loads.

use std::fmt;

use serde::{Deserialize, Serialize};
use specpub_tracking::{PageKind, SectionNumber};

/// Standards status of an artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardsStatus {
    /// Work in progress.
    #[default]
    Draft,
    /// Published for trial use.
    TrialUse,
    /// Normative content, subject to backward compatibility rules.
    Normative,
    /// Informative only.
    Informative,
    /// Scheduled for removal.
    Deprecated,
    /// Maintained outside of this specification.
    External,
}

impl StandardsStatus {
    /// Machine name (`trial-use`, `normative`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::TrialUse => "trial-use",
            Self::Normative => "normative",
            Self::Informative => "informative",
            Self::Deprecated => "deprecated",
            Self::External => "external",
        }
    }

    /// Label shown on pages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::TrialUse => "Trial Use",
            Self::Normative => "Normative",
            Self::Informative => "Informative",
            Self::Deprecated => "Deprecated",
            Self::External => "External",
        }
    }
}

impl fmt::Display for StandardsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which driver configuration a page is expanded with.
///
/// The configurations differ only in the commands they accept and the
/// ambient context they carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    /// Ordinary narrative page.
    #[default]
    Page,
    /// Printable page without navigation chrome.
    Book,
    /// Resource detail page; requires a current resource.
    Resource,
    /// Profile or extension page; requires a current profile.
    Profile,
}

impl EntryPoint {
    /// Every entry point, in declaration order.
    pub const ALL: [Self; 4] = [Self::Page, Self::Book, Self::Resource, Self::Profile];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Book => "book",
            Self::Resource => "resource",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entry| entry.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown entry point `{s}`"))
    }
}

/// One page of the publication, in document order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageEntry {
    /// Output filename (e.g., `patient.html`).
    pub file: String,
    /// Template to expand, relative to the pages directory. Defaults to `file`.
    pub template: Option<String>,
    /// Page title.
    pub title: String,
    /// Dotted section number, if the page appears in the contents.
    pub section: Option<String>,
    /// Page kind.
    pub kind: PageKind,
    /// Driver configuration.
    pub entry: EntryPoint,
    /// Resource shown by a resource page.
    pub resource: Option<String>,
    /// Profile or extension shown by a profile page.
    pub profile: Option<String>,
    /// Normative package the page belongs to.
    pub normative_package: Option<String>,
    /// Responsible work group code.
    pub work_group: Option<String>,
    /// Depth of the page below the publication root, for relative links.
    pub level: usize,
    /// Contents icon.
    pub icon: Option<String>,
}

impl PageEntry {
    /// Create a narrative page entry.
    #[must_use]
    pub fn new(file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the section number.
    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the template name.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Make this a resource page.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.kind = PageKind::Resource;
        self.entry = EntryPoint::Resource;
        self.resource = Some(resource.into());
        self
    }

    /// Make this a profile page.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.kind = PageKind::Profile;
        self.entry = EntryPoint::Profile;
        self.profile = Some(profile.into());
        self
    }

    /// Set the entry point.
    #[must_use]
    pub fn with_entry(mut self, entry: EntryPoint) -> Self {
        self.entry = entry;
        self
    }

    /// Set the normative package.
    #[must_use]
    pub fn with_normative_package(mut self, package: impl Into<String>) -> Self {
        self.normative_package = Some(package.into());
        self
    }

    /// Set the work group.
    #[must_use]
    pub fn with_work_group(mut self, code: impl Into<String>) -> Self {
        self.work_group = Some(code.into());
        self
    }

    /// Template name to expand for this page.
    #[must_use]
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.file)
    }

    /// Parsed section number. Malformed numbers are treated as absent.
    #[must_use]
    pub fn section_number(&self) -> Option<SectionNumber> {
        let raw = self.section.as_deref()?;
        match raw.parse() {
            Ok(section) => Some(section),
            Err(e) => {
                tracing::warn!(page = %self.file, error = %e, "Ignoring malformed section number");
                None
            }
        }
    }
}

/// One element of a resource or data type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ElementDefn {
    /// Dotted element path (`Patient.name.given`).
    pub path: String,
    /// Cardinality (`0..1`, `1..*`).
    pub card: String,
    /// Type codes.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// One-line description.
    pub short: String,
    /// Bound value set URL, if coded.
    pub binding: Option<String>,
}

impl ElementDefn {
    /// Create an element.
    #[must_use]
    pub fn new(path: impl Into<String>, card: impl Into<String>, types: &[&str]) -> Self {
        Self {
            path: path.into(),
            card: card.into(),
            types: types.iter().map(|t| (*t).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Set the short description.
    #[must_use]
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Nesting depth below the root element (the root is 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.matches('.').count()
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// A search parameter defined on a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchParam {
    /// Parameter code used in URLs.
    pub code: String,
    /// Search type (`token`, `reference`, `date`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Description.
    pub description: String,
    /// Selection expression.
    pub expression: Option<String>,
    /// Target resource types of a reference parameter.
    pub targets: Vec<String>,
    /// Resource types this parameter is believed to be unused for.
    pub suspected_unused: Vec<String>,
}

impl SearchParam {
    /// Create a search parameter.
    #[must_use]
    pub fn new(code: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Flag the parameter as possibly unused for a type.
    #[must_use]
    pub fn suspected_unused_for(mut self, type_name: impl Into<String>) -> Self {
        self.suspected_unused.push(type_name.into());
        self
    }
}

/// An example instance of a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExampleRef {
    /// Instance id.
    pub id: String,
    /// Description.
    pub description: String,
    /// Published file name.
    pub file: String,
}

/// A resource definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceDefn {
    /// Resource name (`Patient`).
    pub name: String,
    /// Markdown description.
    pub description: String,
    /// Responsible work group code.
    pub work_group: Option<String>,
    /// Maturity level.
    pub fmm: u8,
    /// Standards status.
    pub status: StandardsStatus,
    /// Normative package, if normative.
    pub normative_package: Option<String>,
    /// Category shown in resource lists.
    pub category: Option<String>,
    /// Element tree, root first.
    pub elements: Vec<ElementDefn>,
    /// Search parameters.
    pub search: Vec<SearchParam>,
    /// Example instances.
    pub examples: Vec<ExampleRef>,
    /// Ids of profiles on this resource.
    pub profiles: Vec<String>,
}

impl ResourceDefn {
    /// Create a resource with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set maturity and status.
    #[must_use]
    pub fn with_maturity(mut self, fmm: u8, status: StandardsStatus) -> Self {
        self.fmm = fmm;
        self.status = status;
        self
    }

    /// Set the work group.
    #[must_use]
    pub fn with_work_group(mut self, code: impl Into<String>) -> Self {
        self.work_group = Some(code.into());
        self
    }

    /// Append an element.
    #[must_use]
    pub fn with_element(mut self, element: ElementDefn) -> Self {
        self.elements.push(element);
        self
    }

    /// Append a search parameter.
    #[must_use]
    pub fn with_search(mut self, param: SearchParam) -> Self {
        self.search.push(param);
        self
    }

    /// Append an example.
    #[must_use]
    pub fn with_example(mut self, id: &str, description: &str) -> Self {
        self.examples.push(ExampleRef {
            id: id.to_owned(),
            description: description.to_owned(),
            file: format!("{}-example-{id}.html", self.name.to_ascii_lowercase()),
        });
        self
    }

    /// Output filename of the resource page.
    #[must_use]
    pub fn page_file(&self) -> String {
        format!("{}.html", self.name.to_ascii_lowercase())
    }
}

/// Whether a data type is primitive or complex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTypeKind {
    /// Primitive value.
    Primitive,
    /// Structured type.
    #[default]
    Complex,
}

/// A data type definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataTypeDefn {
    /// Type name.
    pub name: String,
    /// Primitive or complex.
    pub kind: DataTypeKind,
    /// Markdown description.
    pub description: String,
    /// Standards status.
    pub status: StandardsStatus,
    /// Element tree (complex types only).
    pub elements: Vec<ElementDefn>,
}

impl DataTypeDefn {
    /// Create a data type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DataTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }
}

/// Alternative label for a concept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Designation {
    /// Language tag.
    pub language: Option<String>,
    /// Label.
    pub value: String,
}

/// A code enumerated in a value set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Concept {
    /// Code.
    pub code: String,
    /// Display text.
    pub display: String,
    /// Definition.
    pub definition: Option<String>,
    /// Additional designations.
    pub designations: Vec<Designation>,
    /// Specialisations.
    pub children: Vec<Concept>,
}

impl Concept {
    /// Create a concept.
    #[must_use]
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            ..Self::default()
        }
    }

    /// Append a child concept.
    #[must_use]
    pub fn with_child(mut self, child: Concept) -> Self {
        self.children.push(child);
        self
    }
}

/// A value set definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValueSetDefn {
    /// Canonical URL.
    pub url: String,
    /// Local id, also the page name stem.
    pub id: String,
    /// Computable name.
    pub name: String,
    /// Human title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Standards status.
    pub status: StandardsStatus,
    /// Code system the enumerated concepts come from.
    pub system: Option<String>,
    /// Enumerated concepts. Empty for intensional value sets.
    pub concepts: Vec<Concept>,
}

impl ValueSetDefn {
    /// Create a value set.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: url.into(),
            name: id.clone(),
            title: id.clone(),
            id,
            ..Self::default()
        }
    }

    /// Set the code system.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append a concept.
    #[must_use]
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Output filename of the value set page.
    #[must_use]
    pub fn page_file(&self) -> String {
        format!("valueset-{}.html", self.id)
    }
}

/// Whether a structure definition is a profile or an extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Constraint on a resource or type.
    #[default]
    Profile,
    /// Extension definition.
    Extension,
}

/// A profile or extension definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileDefn {
    /// Local id, also the page name stem.
    pub id: String,
    /// Canonical URL.
    pub url: String,
    /// Computable name.
    pub name: String,
    /// Human title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Constrained resource or type.
    pub base: String,
    /// Profile or extension.
    pub kind: ProfileKind,
    /// Extension contexts (paths where the extension may appear).
    pub context: Vec<String>,
    /// Standards status.
    pub status: StandardsStatus,
    /// Responsible work group code.
    pub work_group: Option<String>,
}

impl ProfileDefn {
    /// Create a profile.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>, base: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: url.into(),
            name: id.clone(),
            title: id.clone(),
            id,
            base: base.into(),
            ..Self::default()
        }
    }

    /// Turn the definition into an extension usable in the given contexts.
    #[must_use]
    pub fn into_extension(mut self, contexts: &[&str]) -> Self {
        self.kind = ProfileKind::Extension;
        self.context = contexts.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    /// Output filename of the profile page.
    #[must_use]
    pub fn page_file(&self) -> String {
        match self.kind {
            ProfileKind::Profile => format!("{}.html", self.id),
            ProfileKind::Extension => format!("extension-{}.html", self.id),
        }
    }
}

/// A work group responsible for content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkGroup {
    /// Short code (`pa`).
    pub code: String,
    /// Full name.
    pub name: String,
    /// Home page.
    pub url: String,
}

impl WorkGroup {
    /// Create a work group.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_depth_and_name() {
        let element = ElementDefn::new("Patient.contact.name", "0..1", &["HumanName"]);
        assert_eq!(element.depth(), 2);
        assert_eq!(element.name(), "name");
        assert_eq!(ElementDefn::new("Patient", "", &[]).depth(), 0);
    }

    #[test]
    fn test_page_entry_defaults() {
        let page = PageEntry::new("index.html", "Home");
        assert_eq!(page.template_name(), "index.html");
        assert_eq!(page.entry, EntryPoint::Page);
        assert_eq!(page.section_number(), None);
    }

    #[test]
    fn test_page_entry_section_number() {
        let page = PageEntry::new("a.html", "A").with_section("2.1.0");
        assert_eq!(page.section_number().unwrap().to_string(), "2.1");

        let bad = PageEntry::new("b.html", "B").with_section("two");
        assert_eq!(bad.section_number(), None);
    }

    #[test]
    fn test_resource_page_entry() {
        let page = PageEntry::new("patient.html", "Patient").with_resource("Patient");
        assert_eq!(page.entry, EntryPoint::Resource);
        assert_eq!(page.kind, PageKind::Resource);
    }

    #[test]
    fn test_entry_point_parse() {
        assert_eq!("Book".parse::<EntryPoint>(), Ok(EntryPoint::Book));
        assert!("chapter".parse::<EntryPoint>().is_err());
    }

    #[test]
    fn test_page_files() {
        assert_eq!(ResourceDefn::new("Patient").page_file(), "patient.html");
        assert_eq!(
            ValueSetDefn::new("gender", "http://x/gender").page_file(),
            "valueset-gender.html"
        );
        let ext = ProfileDefn::new("birthplace", "http://x/birthplace", "Extension")
            .into_extension(&["Patient"]);
        assert_eq!(ext.page_file(), "extension-birthplace.html");
    }

    #[test]
    fn test_status_serde_names() {
        let status: StandardsStatus = serde_json::from_str("\"trial-use\"").unwrap();
        assert_eq!(status, StandardsStatus::TrialUse);
        assert_eq!(status.label(), "Trial Use");
    }
}
