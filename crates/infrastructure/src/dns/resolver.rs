//! Cache-first resolution: consult the cache, forward on miss, store the
//! result (positive or NXDOMAIN) before returning.

use async_trait::async_trait;
use kestrel_dns_application::ports::{DnsResolution, DnsResolver};
use kestrel_dns_domain::{DnsQuery, DomainError};
use std::sync::Arc;
use tracing::debug;

use super::cache::DnsCache;
use super::upstream::ForwardingResolver;

pub struct CachingResolver {
    cache: Arc<DnsCache>,
    upstream: ForwardingResolver,
}

impl CachingResolver {
    pub fn new(cache: Arc<DnsCache>, upstream: ForwardingResolver) -> Self {
        Self { cache, upstream }
    }

    pub fn cache(&self) -> &Arc<DnsCache> {
        &self.cache
    }
}

#[async_trait]
impl DnsResolver for CachingResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError> {
        if let Some((answer, remaining_ttl)) = self.cache.get(&query.domain, query.record_type) {
            debug!(
                domain = %query.domain,
                record_type = %query.record_type,
                remaining_ttl,
                "Cache hit"
            );
            return Ok(DnsResolution::cached(answer, remaining_ttl));
        }

        let forwarded = self.upstream.resolve(query).await?;

        // NXDOMAIN gets cached too, with the SOA-derived negative TTL.
        self.cache.insert(
            &query.domain,
            query.record_type,
            forwarded.answer.clone(),
            forwarded.upstream_ttl,
        );

        Ok(DnsResolution::forwarded(
            forwarded.answer,
            forwarded.upstream_server,
            forwarded.latency_ms,
        ))
    }
}
