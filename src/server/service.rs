//! Service instance resolution.
//!
//! A Data Flow service instance's dashboard URL points at the service broker.
//! Asking the broker for the instance (the dashboard URL without its final
//! segment) answers with a redirect to the server itself.

use reqwest::Url;
use tracing::debug;

use super::authenticated;
use crate::error::{PluginError, Result};
use crate::http::{Request, Transport};

const STATUS_FOUND: u16 = 302;
const LOCATION: &str = "Location";

/// Resolve the server URL of the service instance behind `dashboard_url`.
///
/// `transport` must not follow redirects.
pub fn service_instance_url(
    dashboard_url: &str,
    transport: &dyn Transport,
    access_token: Option<&str>,
) -> Result<String> {
    let broker_error = |message: String| PluginError::Server {
        url: dashboard_url.to_string(),
        message,
    };

    let mut url = Url::parse(dashboard_url)
        .map_err(|e| broker_error(format!("Invalid dashboard URL {}: {}", dashboard_url, e)))?;

    let segments: Vec<&str> = url.path().split('/').collect();
    if segments.iter().all(|s| s.is_empty()) {
        return Err(broker_error(format!(
            "path of {} has no segments",
            dashboard_url
        )));
    }
    let instance_path = segments[..segments.len() - 1].join("/");
    url.set_path(&instance_path);

    debug!("Resolving service instance through {}", url);
    let request = authenticated(Request::get(url.as_str()), access_token);
    let response = transport
        .send(&request)
        .map_err(|e| broker_error(format!("dataflow service broker failed: {}", e)))?;

    if response.status != STATUS_FOUND {
        return Err(broker_error(format!(
            "dataflow service broker did not return expected response (302): {}",
            response.status
        )));
    }

    let locations: Vec<&str> = response.header_values(LOCATION).collect();
    match locations.as_slice() {
        [] => Err(broker_error(
            "dataflow service broker did not return a location header".to_string(),
        )),
        [location] => Ok(location.to_string()),
        many => Err(broker_error(format!(
            "dataflow service broker returned a location header of the wrong length ({})",
            many.len()
        ))),
    }
}
