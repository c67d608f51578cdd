//! Data Flow and Skipper shell launching.

pub mod command;

pub use command::{env_passthrough, run_shell, ShellCommand, PASSTHROUGH_VARS};

use std::path::Path;

use crate::server::ServerKind;

/// Command the shells run to obtain an access token.
pub const CREDENTIALS_PROVIDER_COMMAND: &str = "cf oauth-token";

/// Default Java launcher.
pub const DEFAULT_JAVA: &str = "java";

/// Build the command line for the Data Flow shell.
pub fn dataflow_shell_command(
    java: &str,
    jar: &Path,
    server_url: &str,
    skip_ssl_validation: bool,
) -> ShellCommand {
    let cmd = java_jar(java, jar)
        .arg(format!("--dataflow.uri={}", server_url))
        .arg(format!(
            "--dataflow.credentials-provider-command={}",
            CREDENTIALS_PROVIDER_COMMAND
        ));

    if skip_ssl_validation {
        cmd.arg("--dataflow.skip-ssl-validation=true")
    } else {
        cmd
    }
}

/// Build the command line for the Skipper shell.
pub fn skipper_shell_command(
    java: &str,
    jar: &Path,
    server_url: &str,
    skip_ssl_validation: bool,
) -> ShellCommand {
    let cmd = java_jar(java, jar)
        .arg(format!(
            "--spring.cloud.skipper.client.serverUri={}",
            server_url
        ))
        .arg(format!(
            "--spring.cloud.skipper.client.credentials-provider-command={}",
            CREDENTIALS_PROVIDER_COMMAND
        ));

    if skip_ssl_validation {
        cmd.arg("--spring.cloud.skipper.client.skip-ssl-validation=true")
    } else {
        cmd
    }
}

/// Build the shell command line for a server kind.
pub fn shell_command(
    kind: ServerKind,
    java: &str,
    jar: &Path,
    server_url: &str,
    skip_ssl_validation: bool,
) -> ShellCommand {
    match kind {
        ServerKind::Dataflow => dataflow_shell_command(java, jar, server_url, skip_ssl_validation),
        ServerKind::Skipper => skipper_shell_command(java, jar, server_url, skip_ssl_validation),
    }
}

fn java_jar(java: &str, jar: &Path) -> ShellCommand {
    ShellCommand::new(java)
        .arg("-jar")
        .arg(jar.to_string_lossy())
}
