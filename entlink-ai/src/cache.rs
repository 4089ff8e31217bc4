//! In-memory analysis cache
//!
//! Content-addressed: the key is the SHA-256 of the input text and every
//! analysis option, so any change to either is a miss. Least recently used
//! entries are evicted once `capacity` is reached. Nothing is persisted.

use crate::pipeline::{Analysis, AnalysisOptions};
use entlink_common::hashing::content_hash;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

/// Cache key for `text` analysed with `options`
pub fn cache_key(text: &str, options: &AnalysisOptions) -> String {
    content_hash([
        text,
        options.title.as_str(),
        if options.link { "link" } else { "no-link" },
        if options.geocode { "geocode" } else { "no-geocode" },
    ])
}

/// Bounded LRU of completed analyses
///
/// `None` when the configured capacity is 0.
pub struct AnalysisCache {
    entries: Option<Mutex<LruCache<String, Analysis>>>,
}

impl AnalysisCache {
    /// `capacity` 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached analysis for `key`, marking it most recently used
    pub fn get(&self, key: &str) -> Option<Analysis> {
        self.entries.as_ref()?.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, analysis: Analysis) {
        let Some(entries) = &self.entries else {
            return;
        };

        if let Some((evicted, _)) = entries.lock().push(key.clone(), analysis) {
            if evicted != key {
                debug!(key = %evicted, "Evicted cached analysis");
            }
        }
    }
}
