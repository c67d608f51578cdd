//! Shell artifact lookup through a server's `/about` endpoint.

use std::fmt;
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use super::authenticated;
use crate::cache::{ContentHasher, HashAlgorithm};
use crate::error::{PluginError, Result};
use crate::http::{Request, Transport};

const ABOUT_PATH: &str = "/about";

/// Kind of server a shell connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// Spring Cloud Data Flow server.
    Dataflow,
    /// Spring Cloud Skipper server.
    Skipper,
}

impl ServerKind {
    /// Name used at the start of error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ServerKind::Dataflow => "Dataflow",
            ServerKind::Skipper => "Skipper",
        }
    }

    fn body_label(&self) -> &'static str {
        match self {
            ServerKind::Dataflow => "dataflow",
            ServerKind::Skipper => "Skipper",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The shell JAR advertised by a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellArtifact {
    /// Download URL of the JAR.
    pub url: String,
    /// Expected checksum of the JAR, lowercase hex.
    pub checksum: String,
    /// Algorithm `checksum` was computed with.
    pub algorithm: HashAlgorithm,
}

impl ShellArtifact {
    /// Create a fresh hasher for verifying the download.
    pub fn hasher(&self) -> Box<dyn ContentHasher> {
        self.algorithm.hasher()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutResponse {
    #[serde(default, alias = "VersionInfo")]
    version_info: Option<VersionInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct VersionInfo {
    #[serde(default, alias = "Shell")]
    shell: Option<ShellInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShellInfo {
    #[serde(default, alias = "Url")]
    url: Option<String>,
    #[serde(default, alias = "ChecksumSha1")]
    checksum_sha1: Option<String>,
    #[serde(default, alias = "ChecksumSha256")]
    checksum_sha256: Option<String>,
}

/// Ask the server at `server_url` which shell JAR to use.
///
/// The SHA-256 checksum is preferred; the SHA-1 one is used when the server
/// advertises no SHA-256 checksum.
pub fn shell_artifact(
    kind: ServerKind,
    server_url: &str,
    transport: &dyn Transport,
    access_token: Option<&str>,
) -> Result<ShellArtifact> {
    let about_url = format!("{}{}", server_url.trim_end_matches('/'), ABOUT_PATH);
    let server_error = |message: String| PluginError::Server {
        url: about_url.clone(),
        message,
    };

    debug!("Fetching shell details from {}", about_url);
    let request = authenticated(Request::get(about_url.as_str()), access_token);
    let mut response = transport
        .send(&request)
        .map_err(|e| server_error(format!("{} server error: {}", kind.label(), e)))?;

    if response.status != 200 {
        return Err(server_error(format!(
            "{} server failed: {}",
            kind.label(),
            response.status
        )));
    }

    let mut body = String::new();
    response.body.read_to_string(&mut body).map_err(|e| {
        server_error(format!(
            "Cannot read {} server response body: {}",
            kind.body_label(),
            e
        ))
    })?;

    let about: AboutResponse = serde_json::from_str(&body).map_err(|e| {
        server_error(format!(
            "Invalid {} server response JSON: {}, response body: '{}'",
            kind.body_label(),
            e,
            body
        ))
    })?;

    let shell = about
        .version_info
        .and_then(|v| v.shell)
        .unwrap_or_default();
    let url = shell.url.unwrap_or_default();
    if url.is_empty() {
        return Err(server_error(format!(
            "{} server at {} does not advertise a shell download URL",
            kind.label(),
            server_url
        )));
    }

    let artifact = match shell.checksum_sha256.filter(|c| !c.is_empty()) {
        Some(checksum) => ShellArtifact {
            url,
            checksum,
            algorithm: HashAlgorithm::Sha256,
        },
        None => ShellArtifact {
            url,
            checksum: shell.checksum_sha1.unwrap_or_default(),
            algorithm: HashAlgorithm::Sha1,
        },
    };
    debug!("Shell artifact {} ({})", artifact.url, artifact.algorithm);

    Ok(artifact)
}
