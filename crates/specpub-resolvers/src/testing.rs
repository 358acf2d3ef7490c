//! Shared fixtures for resolver tests.

use std::sync::Arc;

use specpub_model::{
    Concept, DataTypeDefn, DataTypeKind, ElementDefn, EntryPoint, InMemorySpecification, PageEntry,
    ProfileDefn, ResourceDefn, SearchParam, StandardsStatus, ValueSetDefn, WorkGroup,
};
use specpub_template::{Engine, ExpandError, PageContext};
use specpub_tracking::PublishState;

use crate::standard_registry;

pub(crate) fn sample_spec() -> InMemorySpecification {
    InMemorySpecification::new("5.0.0")
        .with_publication_date("2023-03-26")
        .with_package("Foundation")
        .with_work_group(WorkGroup::new("pa", "Patient Administration", "http://hl7.org/Special/committees/pafm"))
        .with_page(PageEntry::new("index.html", "Home"))
        .with_page(PageEntry::new("foundation.html", "Foundation").with_section("1"))
        .with_page(PageEntry::new("overview.html", "Overview").with_section("1.1"))
        .with_page(PageEntry::new("terminologies.html", "Terminologies").with_section("1.2"))
        .with_page(
            PageEntry::new("patient.html", "Patient")
                .with_section("1.3")
                .with_resource("Patient")
                .with_work_group("pa"),
        )
        .with_resource(
            ResourceDefn::new("Patient")
                .with_description("Demographics about an **individual**.")
                .with_maturity(5, StandardsStatus::Normative)
                .with_work_group("pa")
                .with_element(ElementDefn::new("Patient", "0..*", &["DomainResource"]).with_short("Patient"))
                .with_element(ElementDefn::new("Patient.gender", "0..1", &["code"]).with_short("male | female"))
                .with_search(SearchParam::new("gender", "token").with_description("Gender of the patient"))
                .with_search(SearchParam::new("name", "string").suspected_unused_for("Practitioner"))
                .with_example("example", "General person example"),
        )
        .with_data_type(DataTypeDefn::new("string", DataTypeKind::Primitive))
        .with_data_type(DataTypeDefn::new("HumanName", DataTypeKind::Complex))
        .with_value_set(
            ValueSetDefn::new("administrative-gender", "http://hl7.org/fhir/ValueSet/administrative-gender")
                .with_system("http://hl7.org/fhir/administrative-gender")
                .with_description("The gender of a person.")
                .with_concept(Concept::new("male", "Male"))
                .with_concept(Concept::new("other", "Other").with_child(Concept::new("nonbinary", "Non-binary"))),
        )
        .with_value_set(ValueSetDefn::new("languages", "http://hl7.org/fhir/ValueSet/languages"))
        .with_profile(ProfileDefn::new(
            "us-patient",
            "http://example.org/StructureDefinition/us-patient",
            "Patient",
        ))
        .with_profile(
            ProfileDefn::new(
                "patient-birthPlace",
                "http://hl7.org/fhir/StructureDefinition/patient-birthPlace",
                "Extension",
            )
            .into_extension(&["Patient"]),
        )
}

pub(crate) fn engine() -> Engine {
    Engine::new(Arc::new(sample_spec()), standard_registry())
}

pub(crate) fn resource_page() -> PageContext {
    PageContext::new("patient.html")
        .with_entry(EntryPoint::Resource)
        .with_resource("Patient")
        .with_title("Patient")
}

/// Expand `template` on `page` with fresh state.
pub(crate) fn expand(
    engine: &Engine,
    mut page: PageContext,
    template: &str,
) -> Result<(String, PublishState), ExpandError> {
    let mut state = PublishState::default();
    let html = engine.expand_page(template, &mut page, &mut state)?;
    Ok((html, state))
}

pub(crate) fn expand_ok(engine: &Engine, page: PageContext, template: &str) -> String {
    match expand(engine, page, template) {
        Ok((html, _)) => html,
        Err(err) => panic!("expansion failed: {err}"),
    }
}
