//! Response caching around a [`DocumentSource`].
//!
//! The cache is an explicit capability handed to [`CachedSource`]; nothing
//! here is process-global. Keys are slugs of the full URL.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use url::Url;

use ballot_shared::{BallotError, Result, slugify};

use crate::source::DocumentSource;

/// Cache key for a URL: `https://en.wikipedia.org/wiki/Joe_Biden` →
/// `https-en-wikipedia-org-wiki-joe-biden`.
pub fn cache_key(url: &Url) -> String {
    slugify(url.as_str())
}

/// Key-value store for fetched documents.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, body: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// DiskCache
// ---------------------------------------------------------------------------

/// One `<key>.html` file per entry under a directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Open (creating if needed) a cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| BallotError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Use `dir` as-is without creating it.
    pub(crate) fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.html"))
    }
}

impl ResponseCache for DiskCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BallotError::io(path, e)),
        }
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        let path = self.entry_path(key);
        std::fs::write(&path, body).map_err(|e| BallotError::io(path, e))
    }
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// In-process cache, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), body.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CachedSource
// ---------------------------------------------------------------------------

/// Consults `cache` before delegating to `inner`, and stores what `inner` returns.
///
/// Cache read or write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct CachedSource<S, C> {
    inner: S,
    cache: C,
}

impl<S, C> CachedSource<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<S: DocumentSource, C: ResponseCache> DocumentSource for CachedSource<S, C> {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let key = cache_key(url);

        match self.cache.get(&key) {
            Ok(Some(body)) => {
                debug!(%url, "cache hit");
                return Ok(body);
            }
            Ok(None) => debug!(%url, "cache miss"),
            Err(e) => warn!(%url, error = %e, "cache read failed"),
        }

        let body = self.inner.fetch(url).await?;

        if let Err(e) = self.cache.put(&key, &body) {
            warn!(%url, error = %e, "cache write failed");
        }

        Ok(body)
    }
}
