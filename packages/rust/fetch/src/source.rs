//! Document sources: where raw markup comes from.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use ballot_shared::{BallotError, Result};

use crate::cache::{DiskCache, ResponseCache, cache_key};

/// User-Agent string for document requests.
const USER_AGENT: &str = concat!("Ballot/", env!("CARGO_PKG_VERSION"));

/// Async capability for retrieving the raw markup behind a URL.
///
/// Fetching is idempotent per URL. Implementations decide timeouts and
/// retries; callers only see a `Fetch` error on failure.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Retrieves documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| BallotError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl DocumentSource for HttpSource {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching document");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| BallotError::fetch(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BallotError::fetch(url.as_str(), format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BallotError::fetch(url.as_str(), format!("body read failed: {e}")))?;

        debug!(len = body.len(), "document fetched");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// Serves documents from a directory laid out like [`DiskCache`], never
/// touching the network. A missing file is a fetch failure.
#[derive(Debug, Clone)]
pub struct FileSource {
    store: DiskCache,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: DiskCache::at(dir),
        }
    }
}

impl DocumentSource for FileSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.store.get(&cache_key(url))?.ok_or_else(|| {
            BallotError::fetch(url.as_str(), "not present in offline document store")
        })
    }
}
