use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use kestrel_dns_domain::{
    DomainStatRow, OutcomeFilter, QueryOutcome, QueryOutcomeRecord, RecordType,
};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StatKey {
    domain: Arc<str>,
    record_type: RecordType,
}

/// Per-key aggregate; all fields are atomics so concurrent queries for the
/// same domain never contend on a lock.
#[derive(Debug, Default)]
struct DomainStat {
    hits: AtomicU64,
    cache_hits: AtomicU64,
    cached: AtomicU64,
    forwarded: AtomicU64,
    nxdomain: AtomicU64,
    error: AtomicU64,
    latency_ms_sum: AtomicU64,
    latency_samples: AtomicU64,
    last_seen_unix: AtomicI64,
}

impl DomainStat {
    fn outcome_count(&self, filter: OutcomeFilter) -> u64 {
        match filter {
            OutcomeFilter::All => self.hits.load(Ordering::Relaxed),
            OutcomeFilter::Cached => self.cached.load(Ordering::Relaxed),
            OutcomeFilter::Forwarded => self.forwarded.load(Ordering::Relaxed),
            OutcomeFilter::NxDomain => self.nxdomain.load(Ordering::Relaxed),
            OutcomeFilter::Error => self.error.load(Ordering::Relaxed),
        }
    }

    fn snapshot_row(&self, key: &StatKey) -> DomainStatRow {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        let avg_latency_ms = if samples > 0 {
            self.latency_ms_sum.load(Ordering::Relaxed) as f64 / samples as f64
        } else {
            0.0
        };

        DomainStatRow {
            domain: Arc::clone(&key.domain),
            record_type: key.record_type,
            hits: self.hits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            avg_latency_ms,
            last_seen: unix_to_datetime(self.last_seen_unix.load(Ordering::Relaxed)),
        }
    }
}

fn unix_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Per-domain grouped statistics, the backing store for the operator
/// "top domains" views.
#[derive(Debug, Default)]
pub struct DomainStatTable {
    rows: DashMap<StatKey, DomainStat, FxBuildHasher>,
}

impl DomainStatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: &QueryOutcomeRecord) {
        let key = StatKey {
            domain: Arc::clone(&record.domain),
            record_type: record.record_type,
        };

        let stat = self.rows.entry(key).or_default();
        stat.hits.fetch_add(1, Ordering::Relaxed);

        match record.outcome {
            QueryOutcome::Cached => {
                stat.cache_hits.fetch_add(1, Ordering::Relaxed);
                stat.cached.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::Forwarded => {
                stat.forwarded.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::NxDomain => {
                stat.nxdomain.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::Error => {
                stat.error.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Some(latency_ms) = record.latency_ms {
            stat.latency_ms_sum.fetch_add(latency_ms, Ordering::Relaxed);
            stat.latency_samples.fetch_add(1, Ordering::Relaxed);
        }

        stat.last_seen_unix
            .store(record.timestamp.timestamp(), Ordering::Relaxed);
    }

    /// Rows that saw at least one query of the requested outcome class,
    /// sorted by total hits descending, capped at `limit`.
    pub fn grouped(&self, filter: OutcomeFilter, limit: usize) -> Vec<DomainStatRow> {
        let mut rows: Vec<DomainStatRow> = self
            .rows
            .iter()
            .filter(|entry| entry.value().outcome_count(filter) > 0)
            .map(|entry| entry.value().snapshot_row(entry.key()))
            .collect();

        rows.sort_by(|a, b| b.hits.cmp(&a.hits));
        rows.truncate(limit);
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
