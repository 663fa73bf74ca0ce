use super::CacheKey;
use kestrel_dns_domain::{Answer, RecordType};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
struct CacheEntry {
    answer: Answer,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn remaining_ttl(&self, now: Instant) -> u32 {
        self.expires_at
            .saturating_duration_since(now)
            .as_secs()
            .min(u32::MAX as u64) as u32
    }
}

#[derive(Debug, Default)]
struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
    expired_evictions: AtomicU64,
}

/// Stats snapshot for the operator status view.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub maxsize: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)` as a fraction; `0.0` before any lookup.
    pub hit_rate: f64,
}

/// Bounded DNS answer cache with TTL clamping and strict LRU eviction.
///
/// A single mutex guards the LRU list — every critical section is an O(1)
/// `get`/`push`, so the recency order can never be corrupted and no caller
/// waits on network I/O while holding the lock. Hit/miss counters are
/// atomics read without the lock.
pub struct DnsCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    max_entries: usize,
    min_ttl: u32,
    max_ttl: u32,
    metrics: CacheMetrics,
}

impl DnsCache {
    pub fn new(max_entries: usize, min_ttl: u32, max_ttl: u32) -> Self {
        info!(
            max_entries = max_entries,
            min_ttl = min_ttl,
            max_ttl = max_ttl,
            "Initializing DNS cache"
        );

        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            max_entries: max_entries.max(1),
            min_ttl,
            max_ttl,
            metrics: CacheMetrics::default(),
        }
    }

    /// No critical section here can panic, so a poisoned lock only means a
    /// panicked unwind elsewhere; the map itself is still consistent.
    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry, refreshing its recency.
    ///
    /// An expired entry is removed on sight and reported as a miss; the
    /// returned `u32` is the remaining TTL in seconds.
    pub fn get(&self, domain: &str, record_type: RecordType) -> Option<(Answer, u32)> {
        let key = CacheKey::new(domain, record_type);
        let now = Instant::now();

        let mut entries = self.entries();
        let expired = match entries.get(&key) {
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => {
                let result = (entry.answer.clone(), entry.remaining_ttl(now));
                drop(entries);
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                debug!(domain = %domain, record_type = %record_type, "Cache HIT");
                return Some(result);
            }
            None => false,
        };

        if expired {
            entries.pop(&key);
            self.metrics
                .expired_evictions
                .fetch_add(1, Ordering::Relaxed);
        }
        drop(entries);
        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or refresh an entry.
    ///
    /// The upstream TTL is clamped into `[min_ttl, max_ttl]`; pushing into
    /// a full cache evicts the least-recently-used entry first, so the
    /// live count never exceeds `max_entries`.
    pub fn insert(&self, domain: &str, record_type: RecordType, answer: Answer, upstream_ttl: u32) {
        let key = CacheKey::new(domain, record_type);
        let effective_ttl = self.effective_ttl(upstream_ttl);
        let now = Instant::now();
        let entry = CacheEntry {
            answer,
            inserted_at: now,
            expires_at: now + std::time::Duration::from_secs(u64::from(effective_ttl)),
        };
        debug_assert!(entry.expires_at >= entry.inserted_at);

        let evicted = self.entries().push(key.clone(), entry);

        self.metrics.insertions.fetch_add(1, Ordering::Relaxed);
        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                self.metrics.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(domain = %evicted_key.domain, "Evicted LRU entry");
            }
        }

        debug!(
            domain = %domain,
            record_type = %record_type,
            upstream_ttl = upstream_ttl,
            effective_ttl = effective_ttl,
            "Inserted into cache"
        );
    }

    pub fn effective_ttl(&self, upstream_ttl: u32) -> u32 {
        upstream_ttl.clamp(self.min_ttl, self.max_ttl)
    }

    /// Clear all entries and reset hit/miss counters. Cumulative query
    /// counters live in the stats aggregator and are unaffected.
    pub fn flush(&self) {
        self.entries().clear();
        self.metrics.hits.store(0, Ordering::Relaxed);
        self.metrics.misses.store(0, Ordering::Relaxed);
        self.metrics.evictions.store(0, Ordering::Relaxed);
        self.metrics.expired_evictions.store(0, Ordering::Relaxed);
        info!("Cache flushed");
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.metrics.hits.load(Ordering::Relaxed);
        let misses = self.metrics.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            size: self.len(),
            maxsize: self.max_entries,
            hits,
            misses,
            hit_rate,
        }
    }
}
