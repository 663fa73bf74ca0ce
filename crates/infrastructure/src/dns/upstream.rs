//! Upstream failover: iterate the configured targets in order, per-attempt
//! timeout, first valid response wins.

use hickory_proto::op::ResponseCode;
use kestrel_dns_domain::{Answer, DnsQuery, DomainError, ResolverConfig, UpstreamTarget};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::forwarding::{MessageBuilder, ResponseParser, UpstreamResponse};
use super::transport::{self, tcp::TcpTransport, DnsTransport, Transport};

/// Resolution straight off the wire, before the cache sees it.
#[derive(Debug, Clone)]
pub struct ForwardedAnswer {
    pub answer: Answer,
    /// Upstream-declared TTL (or the negative-cache default); the cache
    /// clamps it into its configured bounds on store.
    pub upstream_ttl: u32,
    pub upstream_server: Arc<str>,
    pub latency_ms: u64,
}

pub struct ForwardingResolver {
    upstreams: Vec<UpstreamTarget>,
    timeout: Duration,
    dot_enabled: bool,
    /// Negative-cache TTL when NXDOMAIN carries no SOA; conservatively the
    /// configured cache_min_ttl.
    negative_ttl_default: u32,
}

impl ForwardingResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            upstreams: config.upstreams.clone(),
            timeout: config.timeout_duration(),
            dot_enabled: config.dot_enabled,
            negative_ttl_default: config.cache_min_ttl,
        }
    }

    /// Forward a query with ordered failover.
    ///
    /// A valid response — including authoritative NXDOMAIN — returns
    /// immediately and short-circuits the rest of the list; timeouts and
    /// transport errors advance to the next target, anything else aborts
    /// the loop. Exhausting the list is the `error` outcome, a class
    /// distinct from NXDOMAIN.
    pub async fn resolve(&self, query: &DnsQuery) -> Result<ForwardedAnswer, DomainError> {
        let (id, query_bytes) = MessageBuilder::build_query(&query.domain, &query.record_type)?;

        for target in &self.upstreams {
            match self.attempt(target, id, &query_bytes).await {
                Ok(forwarded) => {
                    debug!(
                        domain = %query.domain,
                        record_type = %query.record_type,
                        upstream = %forwarded.upstream_server,
                        latency_ms = forwarded.latency_ms,
                        "Upstream answered"
                    );
                    return Ok(forwarded);
                }
                Err(e) if e.is_transport_error() => {
                    warn!(
                        domain = %query.domain,
                        upstream = %target.display(),
                        error = %e,
                        "Upstream attempt failed, trying next"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::AllUpstreamsExhausted)
    }

    async fn attempt(
        &self,
        target: &UpstreamTarget,
        id: u16,
        query_bytes: &[u8],
    ) -> Result<ForwardedAnswer, DomainError> {
        let start = Instant::now();
        let transport = transport::create_transport(target, self.dot_enabled)?;

        let response = transport.send(query_bytes, self.timeout).await?;
        let mut parsed = ResponseParser::parse(&response.bytes, id)?;

        // TC bit on a plain-UDP answer: retry the same target over TCP
        // within the remaining timeout budget.
        if parsed.truncated && matches!(transport, Transport::Udp(_)) {
            let remaining = self
                .timeout
                .checked_sub(start.elapsed())
                .unwrap_or(Duration::from_millis(500));
            debug!(upstream = %target.display(), "Response truncated, retrying via TCP");

            let tcp = TcpTransport::new(target.socket_addr()?);
            let tcp_response = tcp.send(query_bytes, remaining).await?;
            parsed = ResponseParser::parse(&tcp_response.bytes, id)?;
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        self.classify(target, parsed, latency_ms)
    }

    fn classify(
        &self,
        target: &UpstreamTarget,
        parsed: UpstreamResponse,
        latency_ms: u64,
    ) -> Result<ForwardedAnswer, DomainError> {
        let upstream_server: Arc<str> = Arc::from(target.display());

        match parsed.rcode {
            ResponseCode::NoError => Ok(ForwardedAnswer {
                upstream_ttl: parsed
                    .min_ttl
                    .or(parsed.negative_soa_ttl)
                    .unwrap_or(self.negative_ttl_default),
                answer: Answer::records(parsed.records),
                upstream_server,
                latency_ms,
            }),
            ResponseCode::NXDomain => Ok(ForwardedAnswer {
                upstream_ttl: parsed
                    .negative_soa_ttl
                    .unwrap_or(self.negative_ttl_default),
                answer: Answer::NxDomain,
                upstream_server,
                latency_ms,
            }),
            other => Err(DomainError::UpstreamUnreachable {
                server: target.display(),
                reason: format!("upstream returned {:?}", other),
            }),
        }
    }
}
