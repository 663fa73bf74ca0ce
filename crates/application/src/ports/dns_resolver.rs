use async_trait::async_trait;
use kestrel_dns_domain::{Answer, DnsQuery, DomainError};
use std::sync::Arc;

/// Result of one resolution through the cache → upstream path.
#[derive(Debug, Clone)]
pub struct DnsResolution {
    pub answer: Answer,
    pub cache_hit: bool,
    /// Display form of the upstream that answered; `None` for cache hits.
    pub upstream_server: Option<Arc<str>>,
    /// Upstream round-trip; `None` for cache hits.
    pub latency_ms: Option<u64>,
    /// TTL to stamp on the encoded response. Cache hits carry the remaining
    /// lifetime of the entry rather than the original record TTL.
    pub response_ttl: Option<u32>,
}

impl DnsResolution {
    pub fn cached(answer: Answer, remaining_ttl: u32) -> Self {
        Self {
            answer,
            cache_hit: true,
            upstream_server: None,
            latency_ms: None,
            response_ttl: Some(remaining_ttl),
        }
    }

    pub fn forwarded(answer: Answer, upstream_server: Arc<str>, latency_ms: u64) -> Self {
        Self {
            answer,
            cache_hit: false,
            upstream_server: Some(upstream_server),
            latency_ms: Some(latency_ms),
            response_ttl: None,
        }
    }
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError>;
}
