//! Blocking HTTP transport.
//!
//! The downloader and the server lookups talk to the network through the
//! [`Transport`] trait so they can be driven by a fake in tests. The real
//! implementation is [`HttpTransport`], a thin wrapper over a blocking
//! `reqwest` client.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::{Result, TransportError};

/// Default request timeout. Shell JARs are large.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const USER_AGENT: &str = concat!("dataflow-plugin/", env!("CARGO_PKG_VERSION"));

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    headers: Vec<(String, String)>,
    bearer_token: Option<String>,
}

impl Request {
    /// Create a GET request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            bearer_token: None,
        }
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticate the request with a bearer token.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Get the request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the value of a request header, ignoring case.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the bearer token, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}

/// A response with a streaming body.
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body; read it to the end or drop it.
    pub body: Box<dyn Read>,
}

impl Response {
    /// Get the first value of a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get every value of a header, ignoring case.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Read the whole body as text.
    pub fn text(mut self) -> std::io::Result<String> {
        let mut text = String::new();
        self.body.read_to_string(&mut text)?;
        Ok(text)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends requests.
pub trait Transport {
    /// Send `request` and return the response, whatever its status.
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError>;
}

/// Client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Accept any TLS certificate.
    pub skip_ssl_validation: bool,
    /// Follow redirects instead of returning them.
    pub follow_redirects: bool,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            skip_ssl_validation: false,
            follow_redirects: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// [`Transport`] over a blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
    options: TransportOptions,
}

impl HttpTransport {
    /// Create a transport with the given options.
    pub fn new(options: TransportOptions) -> Result<Self> {
        let redirects = if options.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .redirect(redirects)
            .danger_accept_invalid_certs(options.skip_ssl_validation)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, options })
    }

    /// Get the options this transport was built with.
    pub fn options(&self) -> TransportOptions {
        self.options
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError> {
        let mut builder = self.client.get(request.url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = request.bearer_token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send()?;
        debug!("GET {} -> {}", request.url(), response.status());

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(Response {
            status: response.status().as_u16(),
            headers,
            body: Box::new(response),
        })
    }
}
