//! Data Flow and Skipper server lookups.
//!
//! - [`about`] - find the shell artifact a server advertises
//! - [`service`] - resolve a service instance dashboard URL to its server

pub mod about;
pub mod service;

pub use about::{shell_artifact, ServerKind, ShellArtifact};
pub use service::service_instance_url;

use crate::http::Request;

/// Attach `access_token` to `request`, if there is one.
///
/// Tokens printed by `cf oauth-token` carry a `bearer ` prefix, which is
/// dropped so the token is not sent twice.
pub(crate) fn authenticated(request: Request, access_token: Option<&str>) -> Request {
    match access_token.map(strip_bearer).filter(|t| !t.is_empty()) {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => token[7..].trim_start(),
        _ => token,
    }
}
