//! Value set expansion collaborator.

use crate::definitions::{Concept, Designation, ValueSetDefn};
use crate::error::TerminologyError;

/// One code of an expansion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionItem {
    /// Code system URL.
    pub system: String,
    /// Code.
    pub code: String,
    /// Display text.
    pub display: String,
    /// Designations, only filled when requested.
    pub designations: Vec<Designation>,
    /// Nested codes, only filled when the hierarchy was requested.
    pub contains: Vec<ExpansionItem>,
}

/// Result of expanding a value set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Total number of codes in the full expansion.
    pub total: usize,
    /// Top-level codes.
    pub contains: Vec<ExpansionItem>,
    /// True if `contains` holds fewer codes than `total` or the hierarchy was dropped.
    pub truncated: bool,
}

impl Expansion {
    /// Number of codes actually present, at any depth.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(items: &[ExpansionItem]) -> usize {
            items.iter().map(|i| 1 + count(&i.contains)).sum()
        }
        count(&self.contains)
    }

    /// True if no codes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contains.is_empty()
    }
}

/// Expands value sets into concrete codes.
///
/// Called synchronously from resolvers; implementations must bound their
/// running time and return an error instead of blocking.
pub trait Terminology: Send + Sync {
    /// Expand a value set.
    ///
    /// # Errors
    ///
    /// Returns [`TerminologyError`] when the expansion cannot be produced.
    /// Callers degrade to an inline placeholder.
    fn expand(
        &self,
        value_set: &ValueSetDefn,
        include_hierarchy: bool,
        include_designations: bool,
    ) -> Result<Expansion, TerminologyError>;
}

/// Expands value sets from the concepts enumerated in the model.
///
/// Intensional value sets (no enumerated concepts) cannot be expanded.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineTerminology;

impl OfflineTerminology {
    /// Create the offline expander.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Terminology for OfflineTerminology {
    fn expand(
        &self,
        value_set: &ValueSetDefn,
        include_hierarchy: bool,
        include_designations: bool,
    ) -> Result<Expansion, TerminologyError> {
        if value_set.concepts.is_empty() {
            return Err(TerminologyError::Unsupported {
                url: value_set.url.clone(),
            });
        }
        let system = value_set.system.clone().unwrap_or_default();
        let mut contains = Vec::new();
        for concept in &value_set.concepts {
            push_concept(
                &mut contains,
                concept,
                &system,
                include_hierarchy,
                include_designations,
            );
        }
        let mut expansion = Expansion {
            total: 0,
            contains,
            truncated: false,
        };
        expansion.total = expansion.len();
        Ok(expansion)
    }
}

fn push_concept(
    out: &mut Vec<ExpansionItem>,
    concept: &Concept,
    system: &str,
    hierarchy: bool,
    designations: bool,
) {
    let mut item = ExpansionItem {
        system: system.to_owned(),
        code: concept.code.clone(),
        display: concept.display.clone(),
        designations: if designations {
            concept.designations.clone()
        } else {
            Vec::new()
        },
        contains: Vec::new(),
    };
    if hierarchy {
        for child in &concept.children {
            push_concept(&mut item.contains, child, system, hierarchy, designations);
        }
        out.push(item);
    } else {
        out.push(item);
        for child in &concept.children {
            push_concept(out, child, system, hierarchy, designations);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn value_set() -> ValueSetDefn {
        let mut parent = Concept::new("animal", "Animal").with_child(Concept::new("dog", "Dog"));
        parent.designations.push(Designation {
            language: Some("de".to_owned()),
            value: "Tier".to_owned(),
        });
        ValueSetDefn::new("animals", "http://example.org/vs/animals")
            .with_system("http://example.org/cs/animals")
            .with_concept(parent)
            .with_concept(Concept::new("plant", "Plant"))
    }

    #[test]
    fn test_offline_hierarchy() {
        let expansion = OfflineTerminology.expand(&value_set(), true, false).unwrap();
        assert_eq!(expansion.total, 3);
        assert_eq!(expansion.contains.len(), 2);
        assert_eq!(expansion.contains[0].contains[0].code, "dog");
        assert!(expansion.contains[0].designations.is_empty());
    }

    #[test]
    fn test_offline_flat_with_designations() {
        let expansion = OfflineTerminology.expand(&value_set(), false, true).unwrap();
        let codes: Vec<&str> = expansion.contains.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["animal", "dog", "plant"]);
        assert_eq!(expansion.contains[0].designations[0].value, "Tier");
        assert_eq!(expansion.contains[0].system, "http://example.org/cs/animals");
    }

    #[test]
    fn test_offline_rejects_intensional() {
        let vs = ValueSetDefn::new("all", "http://example.org/vs/all");
        let err = OfflineTerminology.expand(&vs, true, false).unwrap_err();
        assert!(matches!(err, TerminologyError::Unsupported { .. }));
    }
}
