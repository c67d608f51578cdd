//! `metadata` command implementation.

use std::rc::Rc;

use console::Term;

use crate::cli::args::MetadataArgs;
use crate::error::Result;
use crate::plugin::{metadata, PluginMetadata, STANDALONE_NOTICE};
use crate::ui::ProgressSink;

use super::dispatcher::{Command, CommandResult};

/// The metadata command implementation.
pub struct MetadataCommand {
    args: MetadataArgs,
}

impl MetadataCommand {
    /// Create a new metadata command.
    pub fn new(args: MetadataArgs) -> Self {
        Self { args }
    }

    /// Print the stand-alone notice and the plugin version.
    pub fn notice(&self) -> Result<CommandResult> {
        let meta = metadata()?;
        let out = Term::stdout();
        out.write_line(STANDALONE_NOTICE)?;
        out.write_line(&format!("Plugin version: {}", meta.version))?;
        Ok(CommandResult::success())
    }
}

impl Command for MetadataCommand {
    fn execute(&self, _ui: &Rc<dyn ProgressSink>) -> Result<CommandResult> {
        let meta = metadata()?;
        let out = Term::stdout();

        if self.args.json {
            let json = serde_json::to_string_pretty(&meta).map_err(anyhow::Error::from)?;
            out.write_line(&json)?;
        } else {
            for line in render(&meta) {
                out.write_line(&line)?;
            }
        }

        Ok(CommandResult::success())
    }
}

fn render(meta: &PluginMetadata) -> Vec<String> {
    let width = meta
        .commands
        .iter()
        .map(|c| c.name.len() + c.alias.len() + 3)
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        format!("{} {}", meta.name, meta.version),
        format!("Minimum cf CLI version: {}", meta.min_cli_version),
        String::new(),
        "Commands:".to_string(),
    ];
    for cmd in &meta.commands {
        let label = format!("{} ({})", cmd.name, cmd.alias);
        lines.push(format!("  {:<width$}  {}", label, cmd.help_text, width = width));
        lines.push(format!("  {:<width$}  Usage: {}", "", cmd.usage, width = width));
    }
    lines
}
