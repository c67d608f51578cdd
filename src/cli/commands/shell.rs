//! `dataflow-shell` and `skipper-shell` command implementation.
//!
//! Finds the shell JAR the server advertises, downloads it through the cache
//! and runs it against the server.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::anyhow;
use tracing::debug;

use crate::cache::Cache;
use crate::cli::args::ShellArgs;
use crate::download::Downloader;
use crate::error::{PluginError, Result};
use crate::http::{HttpTransport, TransportOptions};
use crate::server::{service_instance_url, shell_artifact, ServerKind};
use crate::shell::{run_shell, shell_command};
use crate::ui::ProgressSink;

use super::dispatcher::{Command, CommandResult};

/// Launches a Data Flow or Skipper shell.
pub struct LaunchShellCommand {
    kind: ServerKind,
    args: ShellArgs,
}

impl LaunchShellCommand {
    /// Create a new shell command.
    pub fn new(kind: ServerKind, args: ShellArgs) -> Self {
        Self { kind, args }
    }

    fn open_cache(&self, ui: &Rc<dyn ProgressSink>) -> Result<Cache> {
        match &self.args.cache_dir {
            Some(dir) => Cache::with_root(dir, Rc::clone(ui)),
            None => Cache::new(Rc::clone(ui)),
        }
    }

    fn resolve_server(&self) -> Result<String> {
        if !self.args.service_dashboard {
            return Ok(self.args.server.clone());
        }

        let broker = HttpTransport::new(TransportOptions {
            skip_ssl_validation: self.args.skip_ssl_validation,
            follow_redirects: false,
            ..Default::default()
        })?;
        let url = service_instance_url(
            &self.args.server,
            &broker,
            self.args.access_token.as_deref(),
        )?;
        debug!("Service instance {} resolved to {}", self.args.server, url);
        Ok(url)
    }

    fn fetch_shell(&self, server_url: &str, ui: &Rc<dyn ProgressSink>) -> Result<PathBuf> {
        let transport = HttpTransport::new(TransportOptions {
            skip_ssl_validation: self.args.skip_ssl_validation,
            ..Default::default()
        })?;
        let artifact = shell_artifact(
            self.kind,
            server_url,
            &transport,
            self.args.access_token.as_deref(),
        )?;

        let cache = self.open_cache(ui)?;
        let downloader = Downloader::new(&cache, &transport);
        match downloader.download_file(&artifact.url, &artifact.checksum, artifact.hasher())? {
            Some(path) => Ok(path),
            None => Err(PluginError::Other(anyhow!(
                "{} was cached but is no longer on disk, and the server reports it unchanged. \
                 Remove its entry from {} and try again.",
                artifact.url,
                cache.index_path().display()
            ))),
        }
    }
}

impl Command for LaunchShellCommand {
    fn execute(&self, ui: &Rc<dyn ProgressSink>) -> Result<CommandResult> {
        let server_url = self.resolve_server()?;
        let jar = self.fetch_shell(&server_url, ui)?;

        let command = shell_command(
            self.kind,
            &self.args.java,
            &jar,
            &server_url,
            self.args.skip_ssl_validation,
        );

        match run_shell(&command) {
            Ok(()) => Ok(CommandResult::success()),
            Err(PluginError::CommandFailed { code, .. }) => {
                debug!("{} shell exited with {:?}", self.kind, code);
                Ok(CommandResult::failure(code.unwrap_or(1)))
            }
            Err(e) => Err(e),
        }
    }
}
