//! Shell process execution.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use crate::error::{PluginError, Result};

/// Environment variables passed through to the shell process.
pub const PASSTHROUGH_VARS: [&str; 3] = ["PATH", "HOME", "CF_HOME"];

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Program to run.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
}

impl ShellCommand {
    /// Create a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Select the passthrough variables that are set.
pub fn env_passthrough(lookup: impl Fn(&str) -> Option<OsString>) -> Vec<(String, OsString)> {
    PASSTHROUGH_VARS
        .into_iter()
        .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
        .collect()
}

/// Run `command` to completion with this process's terminal.
///
/// The child sees only the passthrough environment. Its output goes straight
/// to this process's stdout and stderr; this process's stdin is copied into
/// the child on a helper thread.
pub fn run_shell(command: &ShellCommand) -> Result<()> {
    debug!("Running {}", command);

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .env_clear()
        .envs(env_passthrough(|name| std::env::var_os(name)))
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| PluginError::Launch {
            command: command.to_string(),
            source,
        })?;

    if let Some(mut child_stdin) = child.stdin.take() {
        // Detached: blocks on our stdin until EOF or until the process exits.
        thread::spawn(move || {
            if let Err(err) = io::copy(&mut io::stdin(), &mut child_stdin) {
                debug!("Stopped forwarding stdin to the shell: {}", err);
            }
        });
    }

    let status = child.wait()?;
    debug!("{} exited with {}", command.program, status);

    if status.success() {
        Ok(())
    } else {
        Err(PluginError::CommandFailed {
            command: command.to_string(),
            code: status.code(),
        })
    }
}
