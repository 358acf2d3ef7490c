//! The read-only specification model interface.

use crate::definitions::{
    DataTypeDefn, PageEntry, ProfileDefn, ResourceDefn, SearchParam, ValueSetDefn, WorkGroup,
};

/// Read model of the specification being published.
///
/// Implementations are immutable once built. Lookups by canonical URL and by
/// local id are both accepted where an artifact has both.
pub trait Specification: Send + Sync {
    /// Specification version (e.g., `5.0.0`).
    fn version(&self) -> &str;

    /// Publication date as it should be printed.
    fn publication_date(&self) -> &str;

    /// All pages in document order.
    fn pages(&self) -> &[PageEntry];

    /// Page entry for an output filename.
    fn page(&self, file: &str) -> Option<&PageEntry> {
        self.pages().iter().find(|p| p.file == file)
    }

    /// Resource by name.
    fn resource(&self, name: &str) -> Option<&ResourceDefn>;

    /// Resource names in sorted order.
    fn resource_names(&self) -> Vec<&str>;

    /// Data type by name.
    fn data_type(&self, name: &str) -> Option<&DataTypeDefn>;

    /// Data type names in sorted order.
    fn data_type_names(&self) -> Vec<&str>;

    /// Value set by canonical URL or id.
    fn value_set(&self, url_or_id: &str) -> Option<&ValueSetDefn>;

    /// All value sets, ordered by id.
    fn value_sets(&self) -> Vec<&ValueSetDefn>;

    /// Profile by id or canonical URL. Extensions are not returned.
    fn profile(&self, id_or_url: &str) -> Option<&ProfileDefn>;

    /// Extension by canonical URL or id.
    fn extension(&self, url_or_id: &str) -> Option<&ProfileDefn>;

    /// Work group by code.
    fn work_group(&self, code: &str) -> Option<&WorkGroup>;

    /// Declared normative package names.
    fn normative_packages(&self) -> Vec<&str>;

    /// Search parameters of a resource; empty for unknown resources.
    fn search_params(&self, resource: &str) -> &[SearchParam] {
        self.resource(resource)
            .map_or(&[], |r| r.search.as_slice())
    }

    /// `(parameter code, type)` pairs believed to be unused.
    fn suspected_unused_search_params(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for name in self.resource_names() {
            for param in self.search_params(name) {
                pairs.extend(
                    param
                        .suspected_unused
                        .iter()
                        .map(|type_name| (param.code.clone(), type_name.clone())),
                );
            }
        }
        pairs
    }
}
