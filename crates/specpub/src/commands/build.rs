//! `specpub build` command implementation.

use std::path::PathBuf;

use clap::Args;
use specpub_config::{CliSettings, Config};
use specpub_publisher::Publisher;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover specpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page template directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Terminology server for value set expansion (overrides config).
    #[arg(long, env = "TX_SERVER")]
    tx_server: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Publish every page, then the index pages, then run the consistency checks.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails, output cannot be written, a
    /// consistency check fails, or any page failed to expand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            tx_server: self.tx_server,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Model: {}", config.paths.model.display()));
        output.info(&format!("Pages: {}", config.paths.pages_dir.display()));
        output.info(&format!("Output: {}", config.paths.output_dir.display()));
        match &config.terminology {
            Some(tx) => output.info(&format!("Terminology server: {}", tx.server)),
            None => output.info("Terminology: offline (no server in config)"),
        }

        let mut publisher = Publisher::from_config(&config)?;
        let result = publisher.publish_all().map(|_| ());

        let report = publisher.report();
        for failure in report.failures() {
            output.warning(&format!("{}: {}", failure.file, failure.error));
        }
        let warnings = publisher.state().validation.len();
        if warnings > 0 {
            output.warning(&format!("{warnings} QA message(s), see qa.html"));
        }

        result?;

        if !report.is_success() {
            return Err(CliError::PagesFailed {
                count: report.failures().len(),
            });
        }

        output.success(&format!(
            "Published {} file(s) to {}",
            report.written().len(),
            publisher.output_dir().display()
        ));
        Ok(())
    }
}
