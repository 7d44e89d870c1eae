use std::{
    future::Future,
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use lru::LruCache;

/// How long a rendered home page stays warm by default
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

/// Number of pages kept warm at once; least recently used ones go first
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => panic!("capacity must be positive"),
};

#[derive(Clone)]
struct CachedPage {
    content: Arc<str>,
    expires_at: Instant,
}

/// Short-lived cache of rendered pages, keyed by request path and page number.
///
/// A warm entry is served verbatim until it expires, is evicted by newer
/// entries, or [`PageCache::clear`] is called, so writes made in the meantime
/// are not visible to readers of the cached route. Entries are replaced whole;
/// readers only ever observe either no entry or a complete one.
pub struct PageCache {
    ttl: Duration,
    slots: Mutex<LruCache<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: NonZeroUsize) -> Self {
        Self {
            ttl,
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn slots(&self) -> MutexGuard<'_, LruCache<String, CachedPage>> {
        // entries are replaced whole, so a poisoned map is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns content of a live entry
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Arc<str>> {
        let mut slots = self.slots();

        match slots.get(key) {
            Some(page) if page.expires_at > now => Some(page.content.clone()),
            Some(_) => {
                slots.pop(key);
                None
            }
            None => None,
        }
    }

    /// Stores freshly rendered content, replacing whatever was there
    pub fn insert(&self, key: impl Into<String>, content: impl Into<Arc<str>>) -> Arc<str> {
        self.insert_at(key.into(), content.into(), Instant::now())
    }

    fn insert_at(&self, key: String, content: Arc<str>, now: Instant) -> Arc<str> {
        let mut slots = self.slots();

        let expired: Vec<String> = slots
            .iter()
            .filter(|(_, page)| page.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            slots.pop(key);
        }

        slots.put(
            key,
            CachedPage {
                content: content.clone(),
                expires_at: now + self.ttl,
            },
        );

        content
    }

    /// Serves live entry for `key` or renders it with `render` and stores the result.
    ///
    /// The lock is not held while rendering; concurrent misses may both render,
    /// and the last one to finish wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        render: F,
    ) -> Result<Arc<str>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(content) = self.get(key) {
            tracing::debug!(key, "page cache hit");
            return Ok(content);
        }

        tracing::debug!(key, "page cache miss");
        let content = render().await?;

        Ok(self.insert(key, content))
    }

    /// Drops every entry unconditionally
    pub fn clear(&self) {
        let mut slots = self.slots();
        let dropped = slots.len();
        slots.clear();

        tracing::info!(dropped, "page cache cleared");
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
