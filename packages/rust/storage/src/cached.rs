//! Memoizing wrapper around a content service.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use mfnf_shared::{ContentService, Result};

use crate::hash::call_key;
use crate::store::CacheStore;

/// Hit/miss counters of a [`CachedService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes `get_content` and `render_html` of the wrapped service.
///
/// A hit never calls the inner service. A miss calls it once and stores the
/// result; failed calls are not stored.
pub struct CachedService<S, C> {
    inner: S,
    store: C,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: ContentService, C: CacheStore> CachedService<S, C> {
    pub fn new(inner: S, store: C) -> Self {
        Self {
            inner,
            store,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    fn memoize(
        &self,
        function: &str,
        args: &[&str],
        call: impl FnOnce() -> Result<String>,
    ) -> Result<String> {
        let key = call_key(function, args, &BTreeMap::new());

        if let Some(value) = self.store.get(&key)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(function, key = %&key[..12], "cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(function, key = %&key[..12], "cache miss");
        let value = call()?;
        self.store.put(&key, &value)?;
        Ok(value)
    }
}

impl<S: ContentService, C: CacheStore> ContentService for CachedService<S, C> {
    fn get_content(&self, title: &str) -> Result<String> {
        self.memoize("get_content", &[title], || self.inner.get_content(title))
    }

    fn render_html(&self, title: &str, text: &str) -> Result<String> {
        self.memoize("render_html", &[title, text], || {
            self.inner.render_html(title, text)
        })
    }
}
