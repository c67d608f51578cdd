//! Conditional download through the cache.
//!
//! A download sends `If-None-Match` with the etag recorded for the URL. A
//! `304 Not Modified` reuses the cached file; a `200 OK` replaces it and
//! records the new etag once the content has been verified.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{Cache, ContentHasher};
use crate::error::PluginError;
use crate::http::{Request, Transport};
use crate::ui::ProgressSink;

/// Conditional request header.
pub const IF_NONE_MATCH: &str = "If-None-Match";

/// Validation token response header.
pub const ETAG: &str = "ETag";

const STATUS_OK: u16 = 200;
const STATUS_NOT_MODIFIED: u16 = 304;

/// A failed download.
///
/// Carries whatever the cache held for the URL before the attempt, which a
/// caller may still choose to use.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct DownloadFailure {
    /// Cached file present before the attempt, if any.
    pub cached_path: Option<PathBuf>,
    /// What went wrong.
    pub source: PluginError,
}

impl DownloadFailure {
    fn new(cached_path: Option<PathBuf>, source: PluginError) -> Self {
        Self {
            cached_path,
            source,
        }
    }
}

impl From<DownloadFailure> for PluginError {
    fn from(failure: DownloadFailure) -> Self {
        failure.source
    }
}

/// Downloads files into a [`Cache`].
pub struct Downloader<'a> {
    cache: &'a Cache,
    transport: &'a dyn Transport,
}

impl<'a> Downloader<'a> {
    /// Create a downloader over `cache` using `transport`.
    pub fn new(cache: &'a Cache, transport: &'a dyn Transport) -> Self {
        Self { cache, transport }
    }

    /// Download `url` unless the cached copy is current.
    ///
    /// On `200 OK` the body is stored and verified against `checksum` using
    /// `hasher`, and the path of the fresh file is returned. On
    /// `304 Not Modified` the cached path is returned, which is `None` when
    /// an etag is recorded but the file itself has gone missing.
    pub fn download_file(
        &self,
        url: &str,
        checksum: &str,
        hasher: Box<dyn ContentHasher>,
    ) -> Result<Option<PathBuf>, DownloadFailure> {
        let entry = self.cache.entry(url);
        let retrieved = entry
            .retrieve()
            .map_err(|err| DownloadFailure::new(None, err))?;
        let cached_path = retrieved.path;

        let mut request = Request::get(url);
        if !retrieved.etag.is_empty() {
            if cached_path.is_none() {
                self.cache.progress().message(&format!(
                    "File at '{}' has previously been cached but cannot be found on local disk. Downloading again.",
                    url
                ));
            }
            request = request.header(IF_NONE_MATCH, retrieved.etag.as_str());
        }

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(source) => {
                return Err(DownloadFailure::new(
                    cached_path,
                    PluginError::Download {
                        url: url.to_string(),
                        source,
                    },
                ))
            }
        };

        match response.status {
            STATUS_NOT_MODIFIED => {
                debug!("{} not modified", url);
                Ok(cached_path)
            }
            STATUS_OK => {
                self.cache.progress().message(&format!("Downloading {}", url));
                let etag = response.header(ETAG).unwrap_or_default().to_string();

                match entry.store(response.body, &etag, checksum, hasher) {
                    Ok(()) => {
                        info!("Downloaded {} to {}", url, entry.download_file().display());
                        Ok(Some(entry.download_file().to_path_buf()))
                    }
                    Err(err) => Err(DownloadFailure::new(cached_path, err)),
                }
            }
            status => Err(DownloadFailure::new(
                cached_path,
                PluginError::UnexpectedStatus {
                    status,
                    url: url.to_string(),
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EtagStore, HashAlgorithm};
    use crate::error::TransportError;
    use crate::http::{HttpTransport, Response, TransportOptions};
    use crate::ui::RecordingSink;
    use httpmock::prelude::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    const URL: &str = "http://host/path/file.extension";
    const CONTENT: &str = "download content";
    const CONTENT_SHA256: &str = "79dbdd760b4e80686e81c81466424ca6a21ed70b353a19e2154984e41a3e6e4b";

    /// Transport that replays canned responses and records requests.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<Response, TransportError>>>,
        requests: RefCell<Vec<Request>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, etag: Option<&str>, body: &str) -> Self {
            let headers = etag
                .map(|e| vec![("etag".to_string(), e.to_string())])
                .unwrap_or_default();
            self.responses.borrow_mut().push_back(Ok(Response {
                status,
                headers,
                body: Box::new(io::Cursor::new(body.as_bytes().to_vec())),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(message.to_string().into()));
            self
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &Request) -> Result<Response, TransportError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected request")
        }
    }

    struct Fixture {
        temp: TempDir,
        sink: Rc<RecordingSink>,
        cache: Cache,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let sink = Rc::new(RecordingSink::new());
            let progress: Rc<dyn ProgressSink> = sink.clone();
            let cache = Cache::with_root(temp.path(), progress).unwrap();
            Self { temp, sink, cache }
        }

        fn file(&self) -> PathBuf {
            self.temp.path().join("file.extension")
        }

        fn etag(&self) -> String {
            self.cache.entry(URL).retrieve().unwrap().etag
        }

        fn seed(&self, content: &str, etag: &str) {
            fs::write(self.file(), content).unwrap();
            crate::cache::EtagIndex::new(self.cache.index_path())
                .unwrap()
                .set_etag_for_url(URL, etag)
                .unwrap();
        }

        fn download(
            &self,
            transport: &dyn Transport,
            checksum: &str,
        ) -> Result<Option<PathBuf>, DownloadFailure> {
            Downloader::new(&self.cache, transport).download_file(
                URL,
                checksum,
                HashAlgorithm::Sha256.hasher(),
            )
        }
    }

    #[test]
    fn fresh_download_stores_file_and_etag() {
        let fx = Fixture::new();
        let transport = ScriptedTransport::default().respond(200, Some("etag"), CONTENT);

        let path = fx.download(&transport, CONTENT_SHA256).unwrap();

        assert_eq!(path, Some(fx.file()));
        assert_eq!(fs::read_to_string(fx.file()).unwrap(), CONTENT);
        assert_eq!(fx.etag(), "etag");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url(), URL);
        assert_eq!(requests[0].header_value(IF_NONE_MATCH), None);
        assert!(fx.sink.saw(&format!("Downloading {}", URL)));
    }

    #[test]
    fn download_without_etag_leaves_index_alone() {
        let fx = Fixture::new();
        let transport = ScriptedTransport::default().respond(200, None, CONTENT);

        let path = fx.download(&transport, CONTENT_SHA256).unwrap();

        assert_eq!(path, Some(fx.file()));
        assert_eq!(fx.etag(), "");
    }

    #[test]
    fn not_modified_returns_cached_file_untouched() {
        let fx = Fixture::new();
        fx.seed("cached", "\"v1\"");
        let transport = ScriptedTransport::default().respond(304, None, "");

        let path = fx.download(&transport, "irrelevant").unwrap();

        assert_eq!(path, Some(fx.file()));
        assert_eq!(fs::read_to_string(fx.file()).unwrap(), "cached");
        assert_eq!(fx.etag(), "\"v1\"");
        assert_eq!(
            transport.requests()[0].header_value(IF_NONE_MATCH),
            Some("\"v1\"")
        );
        assert!(!fx.sink.saw("Downloading"));
    }

    #[test]
    fn missing_cached_file_still_sends_etag() {
        let fx = Fixture::new();
        fx.seed("cached", "etag");
        fs::remove_file(fx.file()).unwrap();
        let transport = ScriptedTransport::default().respond(304, None, "");

        let path = fx.download(&transport, CONTENT_SHA256).unwrap();

        assert_eq!(path, None);
        assert_eq!(
            transport.requests()[0].header_value(IF_NONE_MATCH),
            Some("etag")
        );
        assert!(fx.sink.saw("cannot be found on local disk"));
    }

    #[test]
    fn missing_cached_file_redownloads_on_200() {
        let fx = Fixture::new();
        fx.seed("cached", "\"v1\"");
        fs::remove_file(fx.file()).unwrap();
        let transport = ScriptedTransport::default().respond(200, Some("\"v2\""), CONTENT);

        let path = fx.download(&transport, CONTENT_SHA256).unwrap();

        assert_eq!(path, Some(fx.file()));
        assert_eq!(fx.etag(), "\"v2\"");
    }

    #[test]
    fn modified_content_replaces_cached_file() {
        let fx = Fixture::new();
        fx.seed("stale", "\"v1\"");
        let transport = ScriptedTransport::default().respond(200, Some("\"v2\""), CONTENT);

        let path = fx.download(&transport, CONTENT_SHA256).unwrap();

        assert_eq!(path, Some(fx.file()));
        assert_eq!(fs::read_to_string(fx.file()).unwrap(), CONTENT);
        assert_eq!(fx.etag(), "\"v2\"");
    }

    #[test]
    fn transport_failure_reports_cached_path() {
        let fx = Fixture::new();
        fx.seed("cached", "\"v1\"");
        let transport = ScriptedTransport::default().fail("connection refused");

        let failure = fx.download(&transport, CONTENT_SHA256).unwrap_err();

        assert_eq!(failure.cached_path, Some(fx.file()));
        match &failure.source {
            PluginError::Download { url, source } => {
                assert_eq!(url, URL);
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected Download, got {other:?}"),
        }
        assert!(failure.to_string().contains("failed"));
    }

    #[test]
    fn unexpected_status_is_error() {
        let fx = Fixture::new();
        let transport = ScriptedTransport::default().respond(404, None, "not found");

        let failure = fx.download(&transport, CONTENT_SHA256).unwrap_err();

        assert_eq!(failure.cached_path, None);
        assert!(matches!(
            failure.source,
            PluginError::UnexpectedStatus { status: 404, .. }
        ));
        assert_eq!(
            failure.to_string(),
            format!("Unexpected response '404' downloading from '{}'", URL)
        );
        assert!(!fx.file().exists());
    }

    #[test]
    fn checksum_mismatch_keeps_previous_etag() {
        let fx = Fixture::new();
        fx.seed("stale", "\"v1\"");
        let transport = ScriptedTransport::default().respond(200, Some("\"v2\""), CONTENT);

        let failure = fx.download(&transport, "not the checksum").unwrap_err();

        assert_eq!(failure.cached_path, Some(fx.file()));
        assert!(matches!(
            failure.source,
            PluginError::ChecksumMismatch { .. }
        ));
        assert_eq!(fx.etag(), "\"v1\"");
    }

    #[test]
    fn unreadable_index_fails_before_request() {
        let fx = Fixture::new();
        fs::remove_file(fx.cache.index_path()).unwrap();
        let transport = ScriptedTransport::default();

        let failure = fx.download(&transport, CONTENT_SHA256).unwrap_err();

        assert_eq!(failure.cached_path, None);
        assert!(matches!(failure.source, PluginError::FileAccess { .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn failure_converts_to_plugin_error() {
        let failure = DownloadFailure::new(
            None,
            PluginError::UnexpectedStatus {
                status: 500,
                url: URL.to_string(),
            },
        );
        let err: PluginError = failure.into();
        assert!(matches!(err, PluginError::UnexpectedStatus { status: 500, .. }));
    }

    #[test]
    fn second_download_is_conditional() {
        let fx = Fixture::new();
        let server = MockServer::start();
        let url = server.url("/path/file.extension");
        let transport = HttpTransport::new(TransportOptions::default()).unwrap();
        let downloader = Downloader::new(&fx.cache, &transport);

        let mut fresh = server.mock(|when, then| {
            when.method(GET).path("/path/file.extension");
            then.status(200).header("ETag", "\"v1\"").body(CONTENT);
        });
        let first = downloader
            .download_file(&url, CONTENT_SHA256, HashAlgorithm::Sha256.hasher())
            .unwrap();
        fresh.assert();
        fresh.delete();

        let unchanged = server.mock(|when, then| {
            when.method(GET)
                .path("/path/file.extension")
                .header("If-None-Match", "\"v1\"");
            then.status(304);
        });
        let second = downloader
            .download_file(&url, CONTENT_SHA256, HashAlgorithm::Sha256.hasher())
            .unwrap();
        unchanged.assert();

        assert_eq!(first, Some(fx.file()));
        assert_eq!(second, first);
        assert_eq!(fs::read_to_string(fx.file()).unwrap(), CONTENT);
    }
}
