//! In-memory specification model.
//!
//! The whole model is loaded from a single YAML or JSON document with the
//! following top-level keys, all optional:
//!
//! ```yaml
//! version: 5.0.0
//! publication_date: 2026-03-26
//! packages: [foundation, patient]
//! work_groups: [{ code: pa, name: Patient Administration, url: ... }]
//! pages: [{ file: index.html, title: Home, section: "0" }]
//! resources: [...]
//! data_types: [...]
//! value_sets: [...]
//! profiles: [...]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::definitions::{
    DataTypeDefn, PageEntry, ProfileDefn, ProfileKind, ResourceDefn, ValueSetDefn, WorkGroup,
};
use crate::error::ModelError;
use crate::specification::Specification;

/// Raw model document as it appears on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpecificationDocument {
    version: String,
    publication_date: String,
    packages: Vec<String>,
    work_groups: Vec<WorkGroup>,
    pages: Vec<PageEntry>,
    resources: Vec<ResourceDefn>,
    data_types: Vec<DataTypeDefn>,
    value_sets: Vec<ValueSetDefn>,
    profiles: Vec<ProfileDefn>,
}

/// Specification model held entirely in memory.
///
/// # Example
///
/// ```
/// use specpub_model::{InMemorySpecification, PageEntry, ResourceDefn, Specification};
///
/// let spec = InMemorySpecification::new("5.0.0")
///     .with_page(PageEntry::new("patient.html", "Patient").with_resource("Patient"))
///     .with_resource(ResourceDefn::new("Patient"));
///
/// assert_eq!(spec.resource_names(), ["Patient"]);
/// assert_eq!(spec.pages().len(), 1);
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(from = "SpecificationDocument")]
pub struct InMemorySpecification {
    version: String,
    publication_date: String,
    packages: Vec<String>,
    pages: Vec<PageEntry>,
    work_groups: BTreeMap<String, WorkGroup>,
    resources: BTreeMap<String, ResourceDefn>,
    data_types: BTreeMap<String, DataTypeDefn>,
    value_sets: BTreeMap<String, ValueSetDefn>,
    value_set_urls: HashMap<String, String>,
    profiles: BTreeMap<String, ProfileDefn>,
    profile_urls: HashMap<String, String>,
}

impl From<SpecificationDocument> for InMemorySpecification {
    fn from(doc: SpecificationDocument) -> Self {
        let mut spec = Self::new(doc.version).with_publication_date(doc.publication_date);
        spec.pages = doc.pages;
        for package in doc.packages {
            spec = spec.with_package(package);
        }
        for wg in doc.work_groups {
            spec = spec.with_work_group(wg);
        }
        for resource in doc.resources {
            spec = spec.with_resource(resource);
        }
        for data_type in doc.data_types {
            spec = spec.with_data_type(data_type);
        }
        for value_set in doc.value_sets {
            spec = spec.with_value_set(value_set);
        }
        for profile in doc.profiles {
            spec = spec.with_profile(profile);
        }
        spec
    }
}

impl InMemorySpecification {
    /// Create an empty model.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Load a model file. `.json` files are read as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let spec: Self = if is_json {
            serde_json::from_str(&content).map_err(|source| ModelError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|source| ModelError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };
        tracing::debug!(
            path = %path.display(),
            pages = spec.pages.len(),
            resources = spec.resources.len(),
            value_sets = spec.value_sets.len(),
            "Loaded specification model"
        );
        Ok(spec)
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = date.into();
        self
    }

    /// Declare a normative package.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        let package = package.into();
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
        self
    }

    /// Append a page in document order.
    #[must_use]
    pub fn with_page(mut self, page: PageEntry) -> Self {
        self.pages.push(page);
        self
    }

    /// Add a work group.
    #[must_use]
    pub fn with_work_group(mut self, wg: WorkGroup) -> Self {
        self.work_groups.insert(wg.code.clone(), wg);
        self
    }

    /// Add a resource.
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceDefn) -> Self {
        self.resources.insert(resource.name.clone(), resource);
        self
    }

    /// Add a data type.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataTypeDefn) -> Self {
        self.data_types.insert(data_type.name.clone(), data_type);
        self
    }

    /// Add a value set.
    #[must_use]
    pub fn with_value_set(mut self, value_set: ValueSetDefn) -> Self {
        if !value_set.url.is_empty() {
            self.value_set_urls
                .insert(value_set.url.clone(), value_set.id.clone());
        }
        self.value_sets.insert(value_set.id.clone(), value_set);
        self
    }

    /// Add a profile or extension.
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileDefn) -> Self {
        if !profile.url.is_empty() {
            self.profile_urls
                .insert(profile.url.clone(), profile.id.clone());
        }
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    fn structure(&self, id_or_url: &str, kind: ProfileKind) -> Option<&ProfileDefn> {
        let id = self
            .profile_urls
            .get(id_or_url)
            .map_or(id_or_url, String::as_str);
        self.profiles.get(id).filter(|p| p.kind == kind)
    }
}

impl Specification for InMemorySpecification {
    fn version(&self) -> &str {
        &self.version
    }

    fn publication_date(&self) -> &str {
        &self.publication_date
    }

    fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    fn resource(&self, name: &str) -> Option<&ResourceDefn> {
        self.resources.get(name)
    }

    fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    fn data_type(&self, name: &str) -> Option<&DataTypeDefn> {
        self.data_types.get(name)
    }

    fn data_type_names(&self) -> Vec<&str> {
        self.data_types.keys().map(String::as_str).collect()
    }

    fn value_set(&self, url_or_id: &str) -> Option<&ValueSetDefn> {
        let id = self
            .value_set_urls
            .get(url_or_id)
            .map_or(url_or_id, String::as_str);
        self.value_sets.get(id)
    }

    fn value_sets(&self) -> Vec<&ValueSetDefn> {
        self.value_sets.values().collect()
    }

    fn profile(&self, id_or_url: &str) -> Option<&ProfileDefn> {
        self.structure(id_or_url, ProfileKind::Profile)
    }

    fn extension(&self, url_or_id: &str) -> Option<&ProfileDefn> {
        self.structure(url_or_id, ProfileKind::Extension)
    }

    fn work_group(&self, code: &str) -> Option<&WorkGroup> {
        self.work_groups.get(code)
    }

    fn normative_packages(&self) -> Vec<&str> {
        self.packages.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::definitions::{EntryPoint, SearchParam};

    const MODEL_YAML: &str = r"
version: 5.0.0
publication_date: 2026-03-26
packages: [patient]
work_groups:
  - { code: pa, name: Patient Administration, url: https://example.org/pa }
pages:
  - { file: index.html, title: Home }
  - { file: patient.html, title: Patient, section: '8.1', entry: resource, kind: resource, resource: Patient }
resources:
  - name: Patient
    fmm: 5
    status: normative
    normative_package: patient
    search:
      - { code: name, type: string, suspected_unused: [Group] }
value_sets:
  - { id: gender, url: 'http://example.org/vs/gender', concepts: [{ code: male, display: Male }] }
profiles:
  - { id: birthplace, url: 'http://example.org/ext/birthplace', kind: extension, context: [Patient] }
";

    #[test]
    fn test_load_yaml_model() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(MODEL_YAML.as_bytes()).unwrap();

        let spec = InMemorySpecification::load(file.path()).unwrap();

        assert_eq!(spec.version(), "5.0.0");
        assert_eq!(spec.publication_date(), "2026-03-26");
        assert_eq!(spec.pages().len(), 2);
        assert_eq!(spec.pages()[1].entry, EntryPoint::Resource);
        assert_eq!(spec.resource("Patient").unwrap().fmm, 5);
        assert_eq!(spec.work_group("pa").unwrap().name, "Patient Administration");
        assert_eq!(spec.normative_packages(), ["patient"]);
    }

    #[test]
    fn test_load_json_model() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"version": "1.0", "resources": [{"name": "Device"}]}"#)
            .unwrap();

        let spec = InMemorySpecification::load(file.path()).unwrap();
        assert_eq!(spec.resource_names(), ["Device"]);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = InMemorySpecification::load(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::Json { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = InMemorySpecification::load(Path::new("/nonexistent/model.yaml")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn test_value_set_by_url_or_id() {
        let spec: InMemorySpecification = serde_yaml::from_str(MODEL_YAML).unwrap();
        assert_eq!(spec.value_set("gender").unwrap().id, "gender");
        assert_eq!(
            spec.value_set("http://example.org/vs/gender").unwrap().id,
            "gender"
        );
        assert!(spec.value_set("unknown").is_none());
    }

    #[test]
    fn test_profiles_and_extensions_are_distinct() {
        let spec: InMemorySpecification = serde_yaml::from_str(MODEL_YAML).unwrap();
        assert!(spec.extension("http://example.org/ext/birthplace").is_some());
        assert!(spec.extension("birthplace").is_some());
        assert!(spec.profile("birthplace").is_none());
    }

    #[test]
    fn test_suspected_unused_search_params() {
        let spec = InMemorySpecification::new("1")
            .with_resource(
                ResourceDefn::new("Patient")
                    .with_search(SearchParam::new("name", "string").suspected_unused_for("Group"))
                    .with_search(SearchParam::new("gender", "token")),
            );
        assert_eq!(
            spec.suspected_unused_search_params(),
            vec![("name".to_owned(), "Group".to_owned())]
        );
        assert_eq!(spec.search_params("Patient").len(), 2);
        assert!(spec.search_params("Unknown").is_empty());
    }

    #[test]
    fn test_page_lookup() {
        let spec: InMemorySpecification = serde_yaml::from_str(MODEL_YAML).unwrap();
        assert_eq!(spec.page("patient.html").unwrap().title, "Patient");
        assert!(spec.page("missing.html").is_none());
    }
}
