use kestrel_dns_domain::{QueryOutcome, QueryOutcomeRecord};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global query counters.
///
/// Owned by the control surface and shared as an `Arc`; all updates are
/// relaxed atomic increments. Cumulative for the process lifetime — cache
/// flushes and resolver restarts do not reset these.
#[derive(Debug, Default)]
pub struct ResolverStats {
    total_queries: AtomicU64,
    cached_queries: AtomicU64,
    forwarded_queries: AtomicU64,
    nxdomain_queries: AtomicU64,
    error_queries: AtomicU64,
    /// Sum/count pair backing the running mean over forwarded queries.
    upstream_latency_ms_sum: AtomicU64,
    upstream_latency_samples: AtomicU64,
}

/// Point-in-time copy of the counters for the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub total_queries: u64,
    pub cached_queries: u64,
    pub forwarded_queries: u64,
    pub nxdomain_queries: u64,
    pub error_queries: u64,
    pub avg_upstream_ms: f64,
}

impl ResolverStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: &QueryOutcomeRecord) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);

        match record.outcome {
            QueryOutcome::Cached => {
                self.cached_queries.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::Forwarded => {
                self.forwarded_queries.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::NxDomain => {
                self.nxdomain_queries.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::Error => {
                self.error_queries.fetch_add(1, Ordering::Relaxed);
            }
        }

        // Only forwarded answers feed the mean; NXDOMAIN round-trips carry
        // a latency too but are kept out of the sample pair.
        if record.outcome == QueryOutcome::Forwarded {
            if let Some(latency_ms) = record.latency_ms {
                self.upstream_latency_ms_sum
                    .fetch_add(latency_ms, Ordering::Relaxed);
                self.upstream_latency_samples.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let samples = self.upstream_latency_samples.load(Ordering::Relaxed);
        let avg_upstream_ms = if samples > 0 {
            self.upstream_latency_ms_sum.load(Ordering::Relaxed) as f64 / samples as f64
        } else {
            0.0
        };

        StatsSnapshot {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            cached_queries: self.cached_queries.load(Ordering::Relaxed),
            forwarded_queries: self.forwarded_queries.load(Ordering::Relaxed),
            nxdomain_queries: self.nxdomain_queries.load(Ordering::Relaxed),
            error_queries: self.error_queries.load(Ordering::Relaxed),
            avg_upstream_ms,
        }
    }
}
