//! `specpub expand` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use specpub_config::{CliSettings, Config};
use specpub_model::{EntryPoint, PageEntry};
use specpub_publisher::Publisher;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the expand command.
#[derive(Args)]
pub(crate) struct ExpandArgs {
    /// Output filename of the page to expand (e.g., `patient.html`).
    page_file: String,

    /// Entry point (page, book, resource, profile).
    #[arg(short, long)]
    entry: Option<EntryPoint>,

    /// Current resource (implies the resource entry point).
    #[arg(long, conflicts_with = "profile")]
    resource: Option<String>,

    /// Current profile or extension (implies the profile entry point).
    #[arg(long)]
    profile: Option<String>,

    /// Path to configuration file (default: auto-discover specpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page template directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExpandArgs {
    /// Expand one page template and print it to stdout. Nothing is written
    /// to the output directory.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let mut publisher = Publisher::from_config(&config)?;

        let known = publisher.engine().spec().page(&self.page_file).cloned();
        let page = self.page_entry(known);
        if let Some(resource) = &page.resource
            && publisher.engine().spec().resource(resource).is_none()
        {
            return Err(CliError::Validation(format!(
                "no resource named `{resource}` in the model"
            )));
        }

        let html = publisher.expand_single(&page)?;
        output.page(&html)?;

        for message in publisher.state().validation.messages() {
            output.warning(&format!("{}: {}: {}", message.severity, message.location, message.message));
        }
        Ok(())
    }

    /// The model's entry for the page, or a bare one, with flag overrides applied.
    fn page_entry(&self, known: Option<PageEntry>) -> PageEntry {
        let mut page = known.unwrap_or_else(|| {
            let title = Path::new(&self.page_file)
                .file_stem()
                .map_or_else(|| self.page_file.clone(), |s| s.to_string_lossy().into_owned());
            PageEntry::new(&self.page_file, title)
        });
        if let Some(resource) = &self.resource {
            page = page.with_resource(resource);
        }
        if let Some(profile) = &self.profile {
            page = page.with_profile(profile);
        }
        if let Some(entry) = self.entry {
            page = page.with_entry(entry);
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(page_file: &str) -> ExpandArgs {
        ExpandArgs {
            page_file: page_file.to_owned(),
            entry: None,
            resource: None,
            profile: None,
            config: None,
            source_dir: None,
            verbose: false,
        }
    }

    #[test]
    fn test_unknown_page_gets_bare_entry() {
        let page = args("notes/draft.html").page_entry(None);
        assert_eq!(page.file, "notes/draft.html");
        assert_eq!(page.title, "draft");
        assert_eq!(page.entry, EntryPoint::Page);
    }

    #[test]
    fn test_known_page_keeps_model_fields() {
        let known = PageEntry::new("patient.html", "Patient").with_section("8.1").with_resource("Patient");
        let page = args("patient.html").page_entry(Some(known.clone()));
        assert_eq!(page, known);
    }

    #[test]
    fn test_resource_flag_implies_resource_entry() {
        let mut args = args("observation.html");
        args.resource = Some("Observation".to_owned());
        let page = args.page_entry(None);
        assert_eq!(page.entry, EntryPoint::Resource);
        assert_eq!(page.resource.as_deref(), Some("Observation"));
    }

    #[test]
    fn test_entry_flag_wins() {
        let mut args = args("us-patient.html");
        args.profile = Some("us-patient".to_owned());
        args.entry = Some(EntryPoint::Book);
        let page = args.page_entry(None);
        assert_eq!(page.entry, EntryPoint::Book);
        assert_eq!(page.profile.as_deref(), Some("us-patient"));
    }
}
