//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

use crate::shell::DEFAULT_JAVA;

/// Open Spring Cloud Data Flow and Skipper shells against a running server.
#[derive(Debug, Parser)]
#[command(name = "dataflow-plugin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open a Data Flow shell to a Data Flow server
    #[command(visible_alias = "dfsh")]
    DataflowShell(ShellArgs),

    /// Open a Skipper shell to a Skipper server
    #[command(visible_alias = "skipsh")]
    SkipperShell(ShellArgs),

    /// Show plugin metadata
    Metadata(MetadataArgs),
}

/// Arguments for the shell commands.
#[derive(Clone, clap::Args)]
pub struct ShellArgs {
    /// Server URL, or the service instance dashboard URL with --service-dashboard
    pub server: String,

    /// Access token sent to the server and service broker
    #[arg(long, env = "DATAFLOW_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Accept any TLS certificate
    #[arg(long)]
    pub skip_ssl_validation: bool,

    /// Resolve SERVER as a service instance dashboard URL
    #[arg(long)]
    pub service_dashboard: bool,

    /// Download cache directory (default: $CF_HOME/.cf/spring-cloud-dataflow-for-pcf/cache)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Java launcher used to run the shell
    #[arg(long, env = "JAVA_CMD", default_value = DEFAULT_JAVA)]
    pub java: String,
}

impl fmt::Debug for ShellArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellArgs")
            .field("server", &self.server)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("service_dashboard", &self.service_dashboard)
            .field("cache_dir", &self.cache_dir)
            .field("java", &self.java)
            .finish()
    }
}

/// Arguments for the `metadata` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MetadataArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
