//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::rc::Rc;

use crate::cli::args::{Cli, Commands, MetadataArgs};
use crate::error::Result;
use crate::server::ServerKind;
use crate::ui::ProgressSink;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - Where progress messages go
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &Rc<dyn ProgressSink>) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Dispatch and execute a command.
    ///
    /// Without a subcommand, prints the stand-alone notice.
    pub fn dispatch(&self, cli: &Cli, ui: &Rc<dyn ProgressSink>) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::DataflowShell(args)) => {
                let cmd = super::shell::LaunchShellCommand::new(ServerKind::Dataflow, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::SkipperShell(args)) => {
                let cmd = super::shell::LaunchShellCommand::new(ServerKind::Skipper, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Metadata(args)) => {
                let cmd = super::metadata::MetadataCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = super::metadata::MetadataCommand::new(MetadataArgs::default());
                cmd.notice()
            }
        }
    }
}
