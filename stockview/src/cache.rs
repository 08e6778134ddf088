use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::EntryMap;
use crate::query::{QueryDescriptor, derive_key};

/// Default maximum number of cached result pages.
pub const DEFAULT_CAPACITY: usize = 50;
/// Default time-to-live for a cached result page (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// Configuration for [`ResultCache`]. Fixed for the lifetime of the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheOptions {
    /// Maximum number of entries held at once.
    pub capacity: usize,
    /// Age (in ms) at which an entry stops being served.
    pub ttl_ms: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl CacheOptions {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }
}

/// Counters describing how the cache has been used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because they outlived the TTL (lazily or via `clear_expired`).
    pub expired: u64,
    /// Entries dropped to make room for a new key.
    pub evictions: u64,
    pub inserts: u64,
    pub updates: u64,
}

/// A cached result page handed out to callers.
///
/// The item payload is immutable and shared; the stored entry itself is never exposed.
#[derive(Clone, Debug)]
pub struct CachedPage<T> {
    pub key: String,
    pub items: Arc<[T]>,
    pub total_count: u64,
    pub created_at_ms: u64,
}

impl<T> CachedPage<T> {
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

#[derive(Clone, Debug)]
struct CacheEntry<T> {
    items: Arc<[T]>,
    total_count: u64,
    created_at_ms: u64,
    // Breaks `created_at_ms` ties so eviction follows insertion order.
    seq: u64,
}

impl<T> CacheEntry<T> {
    fn order(&self) -> (u64, u64) {
        (self.created_at_ms, self.seq)
    }
}

/// A bounded, time-limited cache of query result pages keyed by [`derive_key`].
///
/// The cache is an explicit value: construct one per browsing session and pass it by reference
/// to whatever needs lookups. It never reads a clock; every time-dependent call takes `now_ms`.
///
/// Invariants:
/// - `len() <= options.capacity` at all times.
/// - An entry with `now_ms - created_at_ms >= ttl_ms` is never returned.
/// - Entries are immutable once stored; `set` on an existing key replaces it wholesale.
#[derive(Clone, Debug)]
pub struct ResultCache<T> {
    options: CacheOptions,
    entries: EntryMap<CacheEntry<T>>,
    next_seq: u64,
    stats: CacheStats,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<T> ResultCache<T> {
    pub fn new(options: CacheOptions) -> Self {
        sdebug!(
            capacity = options.capacity,
            ttl_ms = options.ttl_ms,
            "ResultCache::new"
        );
        Self {
            options,
            entries: EntryMap::new(),
            next_seq: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    fn is_fresh(&self, created_at_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(created_at_ms) < self.options.ttl_ms
    }

    /// Looks up a descriptor. Expired entries are purged and reported as absent.
    pub fn get(&mut self, descriptor: &QueryDescriptor, now_ms: u64) -> Option<CachedPage<T>> {
        let key = derive_key(descriptor);
        self.get_by_key(&key, now_ms)
    }

    /// Like [`ResultCache::get`], for a key already produced by [`derive_key`].
    pub fn get_by_key(&mut self, key: &str, now_ms: u64) -> Option<CachedPage<T>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.misses += 1;
            strace!(key, "cache miss");
            return None;
        };

        if !self.is_fresh(entry.created_at_ms, now_ms) {
            self.entries.remove(key);
            self.stats.expired += 1;
            self.stats.misses += 1;
            strace!(key, now_ms, "cache entry expired");
            return None;
        }

        self.stats.hits += 1;
        strace!(key, "cache hit");
        Some(CachedPage {
            key: String::from(key),
            items: Arc::clone(&entry.items),
            total_count: entry.total_count,
            created_at_ms: entry.created_at_ms,
        })
    }

    /// Returns `true` when a fresh entry exists for `key`. Does not purge or count as a lookup.
    pub fn contains_key(&self, key: &str, now_ms: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| self.is_fresh(e.created_at_ms, now_ms))
    }

    /// Stores a result page with `created_at = now_ms`.
    ///
    /// Inserting a new key into a full cache evicts the oldest entries (by creation time) until
    /// the new one fits. Overwriting an existing key never evicts anything else.
    pub fn set(
        &mut self,
        descriptor: &QueryDescriptor,
        items: impl Into<Arc<[T]>>,
        total_count: u64,
        now_ms: u64,
    ) {
        let key = derive_key(descriptor);
        self.set_by_key(key, items, total_count, now_ms);
    }

    /// Like [`ResultCache::set`], for a key already produced by [`derive_key`].
    pub fn set_by_key(
        &mut self,
        key: String,
        items: impl Into<Arc<[T]>>,
        total_count: u64,
        now_ms: u64,
    ) {
        if self.options.capacity == 0 {
            swarn!(key = key.as_str(), "ResultCache has zero capacity; entry dropped");
            return;
        }

        let is_update = self.entries.contains_key(&key);
        if !is_update {
            while self.entries.len() >= self.options.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let entry = CacheEntry {
            items: items.into(),
            total_count,
            created_at_ms: now_ms,
            seq,
        };
        strace!(key = key.as_str(), total_count, now_ms, is_update, "cache set");
        self.entries.insert(key, entry);

        if is_update {
            self.stats.updates += 1;
        } else {
            self.stats.inserts += 1;
        }
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.order())
            .map(|(k, _)| k.clone());
        let Some(key) = oldest else {
            return false;
        };
        sdebug!(key = key.as_str(), "cache evict oldest");
        self.entries.remove(&key);
        self.stats.evictions += 1;
        true
    }

    /// Empties the cache. Usage counters are kept.
    pub fn clear(&mut self) {
        sdebug!(entries = self.entries.len(), "cache clear");
        self.entries.clear();
    }

    /// Drops every entry whose age has reached the TTL. Returns how many were dropped.
    pub fn clear_expired(&mut self, now_ms: u64) -> usize {
        let ttl_ms = self.options.ttl_ms;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now_ms.saturating_sub(e.created_at_ms) < ttl_ms);
        let removed = before - self.entries.len();
        self.stats.expired += removed as u64;
        if removed > 0 {
            sdebug!(removed, now_ms, "cache clear_expired");
        }
        removed
    }

    /// Keys currently stored (fresh or not), oldest first.
    pub fn keys_by_age(&self) -> Vec<String> {
        let mut keys: Vec<(&String, (u64, u64))> =
            self.entries.iter().map(|(k, e)| (k, e.order())).collect();
        keys.sort_by_key(|(_, order)| *order);
        keys.into_iter().map(|(k, _)| k.clone()).collect()
    }
}
