//! In-memory translation cache bounded by size and age.
//!
//! Entries are keyed by target locale plus `"text:context"`. When full, the
//! oldest inserted entry is evicted (insertion order, not LRU). Entries older
//! than the TTL are never returned, and a background sweeper removes them.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Size and age limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub max_size: usize,
    pub ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_millis(3_600_000),
        }
    }
}

/// A cached translation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub locale: String,
    pub context: Option<String>,
    /// Wall-clock time of the last write
    pub last_updated: DateTime<Utc>,
    written_at: Instant,
}

/// Lookup key for a source string with its context.
pub fn cache_key(text: &str, context: Option<&str>) -> String {
    format!("{}:{}", text, context.unwrap_or(""))
}

type Key = (String, String);

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<Key, CacheEntry>,
    order: VecDeque<Key>,
}

#[derive(Debug)]
pub struct TranslationCache {
    options: CacheOptions,
    inner: Mutex<CacheInner>,
}

impl TranslationCache {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            options,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh cached translation of `text` into `locale`, if any.
    pub fn get(&self, locale: &str, text: &str, context: Option<&str>) -> Option<String> {
        let key = (locale.to_string(), cache_key(text, context));
        let inner = self.lock();
        inner
            .entries
            .get(&key)
            .filter(|entry| entry.written_at.elapsed() < self.options.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store a translation. Evicts the oldest inserted entry when a new key would overflow.
    pub fn put(&self, locale: &str, text: &str, context: Option<&str>, value: impl Into<String>) {
        let key = (locale.to_string(), cache_key(text, context));
        let entry = CacheEntry {
            value: value.into(),
            locale: locale.to_string(),
            context: context.map(str::to_string),
            last_updated: Utc::now(),
            written_at: Instant::now(),
        };

        let mut inner = self.lock();
        if let Some(existing) = inner.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        while inner.entries.len() >= self.options.max_size.max(1) {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, entry);
    }

    /// Drop one entry, e.g. a translation that later failed validation.
    pub fn remove(&self, locale: &str, text: &str, context: Option<&str>) -> bool {
        let key = (locale.to_string(), cache_key(text, context));
        let mut inner = self.lock();
        if inner.entries.remove(&key).is_none() {
            return false;
        }
        inner.order.retain(|k| k != &key);
        true
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically remove expired entries. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.options.ttl;
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.written_at.elapsed() < ttl);
        let CacheInner { entries, order } = &mut *inner;
        order.retain(|key| entries.contains_key(key));
        before - entries.len()
    }

    /// Start a task that sweeps expired entries once per TTL.
    ///
    /// The task stops when the returned handle is stopped or dropped, or when
    /// the cache itself is dropped.
    pub fn spawn_sweeper(cache: &Arc<Self>) -> SweeperHandle {
        let period = cache.options.ttl.max(Duration::from_millis(1));
        let weak: Weak<Self> = Arc::downgrade(cache);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let removed = cache.sweep_expired();
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        });
        SweeperHandle { task }
    }
}

/// Owns the background sweep task; aborts it on `stop` or drop.
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max_size: usize, ttl_ms: u64) -> TranslationCache {
        TranslationCache::new(CacheOptions {
            max_size,
            ttl: Duration::from_millis(ttl_ms),
        })
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("Hello", Some("{\"a\":1}")), "Hello:{\"a\":1}");
        assert_eq!(cache_key("Hello", None), "Hello:");
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let c = cache(10, 60_000);
        c.put("ru", "Hello", Some("ctx"), "Privet");

        assert_eq!(c.get("ru", "Hello", Some("ctx")), Some("Privet".to_string()));
        // Different context or locale is a different entry
        assert_eq!(c.get("ru", "Hello", None), None);
        assert_eq!(c.get("de", "Hello", Some("ctx")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_not_returned_before_sweep() {
        let c = cache(10, 1_000);
        c.put("ru", "Hello", None, "Privet");

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(c.get("ru", "Hello", None).is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(c.get("ru", "Hello", None).is_none());
        // Still physically present until swept
        assert_eq!(c.len(), 1);
        assert_eq!(c.sweep_expired(), 1);
        assert!(c.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_inserted() {
        let max_size = 5;
        let c = cache(max_size, 60_000);
        for i in 0..=max_size {
            c.put("ru", &format!("key{}", i), None, format!("value{}", i));
        }

        assert_eq!(c.len(), max_size);
        assert!(c.get("ru", "key0", None).is_none());
        for i in 1..=max_size {
            assert!(c.get("ru", &format!("key{}", i), None).is_some());
        }
    }

    #[tokio::test]
    async fn test_eviction_is_insertion_order_not_lru() {
        let c = cache(2, 60_000);
        c.put("ru", "a", None, "1");
        c.put("ru", "b", None, "2");
        // Reading "a" does not protect it
        assert!(c.get("ru", "a", None).is_some());
        c.put("ru", "c", None, "3");

        assert!(c.get("ru", "a", None).is_none());
        assert!(c.get("ru", "b", None).is_some());
    }

    #[tokio::test]
    async fn test_overwrite_existing_key_does_not_evict() {
        let c = cache(2, 60_000);
        c.put("ru", "a", None, "1");
        c.put("ru", "b", None, "2");
        c.put("ru", "a", None, "1b");

        assert_eq!(c.len(), 2);
        assert_eq!(c.get("ru", "a", None), Some("1b".to_string()));
        assert!(c.get("ru", "b", None).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_refreshes_age() {
        let c = cache(2, 1_000);
        c.put("ru", "a", None, "1");
        tokio::time::advance(Duration::from_millis(800)).await;
        c.put("ru", "a", None, "2");
        tokio::time::advance(Duration::from_millis(800)).await;
        assert_eq!(c.get("ru", "a", None), Some("2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let c = Arc::new(cache(10, 1_000));
        let handle = TranslationCache::spawn_sweeper(&c);
        c.put("ru", "Hello", None, "Privet");

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(c.is_empty());
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_sweeper_no_longer_runs() {
        let c = Arc::new(cache(10, 1_000));
        let handle = TranslationCache::spawn_sweeper(&c);
        handle.stop();
        c.put("ru", "Hello", None, "Privet");

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        // Logically expired but never physically removed
        assert_eq!(c.len(), 1);
        assert!(c.get("ru", "Hello", None).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_ends_when_cache_dropped() {
        let c = Arc::new(cache(10, 1_000));
        let handle = TranslationCache::spawn_sweeper(&c);
        drop(c);

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_remove_frees_capacity() {
        let c = cache(2, 60_000);
        c.put("ru", "a", None, "1");
        c.put("ru", "b", None, "2");
        assert!(c.remove("ru", "a", None));
        assert!(!c.remove("ru", "a", None));

        c.put("ru", "c", None, "3");
        assert!(c.get("ru", "b", None).is_some());
        assert!(c.get("ru", "c", None).is_some());
    }
}
