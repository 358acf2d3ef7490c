//! `specpub directives` command implementation.

use clap::Args;
use specpub_resolvers::standard_registry;
use specpub_template::CommandInfo;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the directives command.
#[derive(Args)]
pub(crate) struct DirectivesArgs {
    /// Only list commands available in this entry point.
    #[arg(long)]
    entry: Option<specpub_model::EntryPoint>,
}

impl DirectivesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let commands: Vec<CommandInfo> = standard_registry()
            .commands()
            .into_iter()
            .filter(|command| self.entry.is_none_or(|entry| command.entries.contains(&entry)))
            .collect();

        output.highlight(&format!("{} directive commands", commands.len()));
        for command in &commands {
            output.page(&format_command(command))?;
        }
        Ok(())
    }
}

/// One listing line: name, entry points, summary.
fn format_command(command: &CommandInfo) -> String {
    let name = if command.prefix {
        format!("{}*", command.name)
    } else {
        command.name.clone()
    };
    let entries: Vec<&str> = command.entries.iter().map(|e| e.as_str()).collect();
    format!("{name:<20} {:<28} {}", entries.join(","), command.summary)
}
