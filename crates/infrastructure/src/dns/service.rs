//! Resolver service lifecycle and the shared query pipeline.
//!
//! `ResolverService` owns the long-lived stats, while the cache, forwarder
//! and UDP listener live in a `RunningCore` that is rebuilt on every
//! start/restart. Stats therefore survive a restart; cache contents and
//! uptime do not.

use hickory_proto::op::ResponseCode;
use kestrel_dns_application::ports::{DnsResolution, DnsResolver};
use kestrel_dns_application::{DomainStatTable, QueryEventEmitter, ResolverStats, StatsSnapshot};
use kestrel_dns_domain::{
    Answer, Config, DnsQuery, DomainError, DomainStatRow, OutcomeFilter, QueryOutcome,
    QueryOutcomeRecord, QuerySource, RecordType, UpstreamTarget,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::cache::{CacheStats, DnsCache};
use super::codec;
use super::resolver::CachingResolver;
use super::upstream::ForwardingResolver;

const STOP_GRACE: Duration = Duration::from_secs(5);
const MAX_DATAGRAM: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceState {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing status snapshot.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub state: ServiceState,
    pub running: bool,
    /// Actual bound address; `None` while stopped.
    pub listen: Option<String>,
    pub uptime_seconds: Option<u64>,
    pub cache: CacheStats,
    pub stats: StatsSnapshot,
    /// Configured targets as-is, for the status surface's config section.
    pub upstreams: Vec<UpstreamTarget>,
}

/// Human-readable result of an ad-hoc lookup.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    /// `"cache"` for hits, otherwise the answering upstream.
    pub server: String,
    /// Record data lines, or a single `"NXDOMAIN"`.
    pub answers: Vec<String>,
}

/// The single Cache → Upstream path shared by the UDP listener and the
/// ad-hoc lookup, with outcome accounting bolted on.
struct QueryPipeline {
    resolver: CachingResolver,
    stats: Arc<ResolverStats>,
    table: Arc<DomainStatTable>,
    emitter: QueryEventEmitter,
}

impl QueryPipeline {
    async fn process(
        &self,
        query: &DnsQuery,
        source: QuerySource,
    ) -> Result<DnsResolution, DomainError> {
        let result = self.resolver.resolve(query).await;

        let (outcome, latency_ms, upstream_server) = match &result {
            Ok(r) if r.cache_hit => (QueryOutcome::Cached, None, None),
            Ok(r) if r.answer.is_nxdomain() => {
                (QueryOutcome::NxDomain, r.latency_ms, r.upstream_server.clone())
            }
            Ok(r) => (QueryOutcome::Forwarded, r.latency_ms, r.upstream_server.clone()),
            Err(_) => (QueryOutcome::Error, None, None),
        };

        let record = QueryOutcomeRecord {
            domain: query.domain.clone(),
            record_type: query.record_type,
            outcome,
            latency_ms,
            upstream_server,
            source,
            timestamp: chrono::Utc::now(),
        };
        self.stats.record(&record);
        self.table.record(&record);
        if source == QuerySource::Client {
            self.emitter.emit(record);
        }

        result
    }
}

/// Everything torn down and rebuilt across a restart.
struct RunningCore {
    cache: Arc<DnsCache>,
    pipeline: Arc<QueryPipeline>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    listen_addr: SocketAddr,
    started_at: Instant,
}

pub struct ResolverService {
    config: RwLock<Config>,
    stats: Arc<ResolverStats>,
    table: Arc<DomainStatTable>,
    state: AtomicU8,
    core: tokio::sync::Mutex<Option<RunningCore>>,
}

impl ResolverService {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            stats: Arc::new(ResolverStats::new()),
            table: Arc::new(DomainStatTable::new()),
            state: AtomicU8::new(ServiceState::Stopped as u8),
            core: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ServiceState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub async fn current_config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Bind the listener and bring the resolver online.
    pub async fn start(&self) -> Result<(), DomainError> {
        let mut slot = self.core.lock().await;
        if slot.is_some() {
            return Err(DomainError::ServiceState(
                "service is already running".to_string(),
            ));
        }

        self.set_state(ServiceState::Starting);
        match self.spin_up().await {
            Ok(core) => {
                info!(listen = %core.listen_addr, "DNS service started");
                *slot = Some(core);
                self.set_state(ServiceState::Running);
                Ok(())
            }
            Err(e) => {
                self.set_state(ServiceState::Stopped);
                error!(error = %e, "DNS service failed to start");
                Err(e)
            }
        }
    }

    async fn spin_up(&self) -> Result<RunningCore, DomainError> {
        let config = self.config.read().await.clone();
        config.validate()?;

        let listen = config.server.dns_listen();
        let socket = UdpSocket::bind(&listen)
            .await
            .map_err(|e| DomainError::Io(format!("failed to bind {}: {}", listen, e)))?;
        let listen_addr = socket
            .local_addr()
            .map_err(|e| DomainError::Io(e.to_string()))?;

        let cache = Arc::new(DnsCache::new(
            config.resolver.cache_size,
            config.resolver.cache_min_ttl,
            config.resolver.cache_max_ttl,
        ));
        let forwarder = ForwardingResolver::new(&config.resolver);
        let resolver = CachingResolver::new(cache.clone(), forwarder);

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let emitter = if config.resolver.log_queries {
            let (emitter, rx) = QueryEventEmitter::enabled();
            spawn_log_drain(&tracker, cancel.clone(), rx);
            emitter
        } else {
            QueryEventEmitter::disabled()
        };

        let pipeline = Arc::new(QueryPipeline {
            resolver,
            stats: self.stats.clone(),
            table: self.table.clone(),
            emitter,
        });

        spawn_listener(
            &tracker,
            cancel.clone(),
            Arc::new(socket),
            pipeline.clone(),
        );

        Ok(RunningCore {
            cache,
            pipeline,
            cancel,
            tracker,
            listen_addr,
            started_at: Instant::now(),
        })
    }

    /// Cancel the listener and wait out in-flight queries.
    pub async fn stop(&self) -> Result<(), DomainError> {
        let mut slot = self.core.lock().await;
        let Some(core) = slot.take() else {
            return Err(DomainError::ServiceState(
                "service is not running".to_string(),
            ));
        };

        self.set_state(ServiceState::Stopping);
        core.cancel.cancel();
        core.tracker.close();
        if timeout(STOP_GRACE, core.tracker.wait()).await.is_err() {
            warn!("In-flight queries did not drain within grace period");
        }
        self.set_state(ServiceState::Stopped);
        info!("DNS service stopped");
        Ok(())
    }

    pub async fn restart(&self) -> Result<(), DomainError> {
        if self.stop().await.is_err() {
            debug!("Restart requested while stopped");
        }
        self.start().await
    }

    /// Drop every cached answer; cumulative query counters are untouched.
    pub async fn flush(&self) -> Result<(), DomainError> {
        let slot = self.core.lock().await;
        match slot.as_ref() {
            Some(core) => {
                core.cache.flush();
                Ok(())
            }
            None => Err(DomainError::ServiceState(
                "service is not running".to_string(),
            )),
        }
    }

    /// Replace the configuration after validating it.
    ///
    /// A validation failure leaves the previous config active. On success
    /// a running service is restarted to pick up the new settings; there
    /// is no hot patching.
    pub async fn update_config(&self, new: Config) -> Result<(), DomainError> {
        new.validate()?;

        let was_running = self.core.lock().await.is_some();
        *self.config.write().await = new;
        info!(restart = was_running, "Configuration replaced");

        if was_running {
            self.restart().await?;
        }
        Ok(())
    }

    /// Ad-hoc lookup through the same pipeline as wire queries. Counted in
    /// the stats but not emitted to the query-log sink.
    pub async fn lookup(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<LookupOutcome, DomainError> {
        let pipeline = {
            let slot = self.core.lock().await;
            slot.as_ref()
                .map(|core| core.pipeline.clone())
                .ok_or_else(|| {
                    DomainError::ServiceState("service is not running".to_string())
                })?
        };

        let query = DnsQuery::normalized(domain, record_type);
        let resolution = pipeline.process(&query, QuerySource::Operator).await?;

        let server = match &resolution.upstream_server {
            Some(upstream) => upstream.to_string(),
            None => "cache".to_string(),
        };
        let answers = match &resolution.answer {
            Answer::Records(records) => {
                records.iter().map(|r| r.data.to_string()).collect()
            }
            Answer::NxDomain => vec!["NXDOMAIN".to_string()],
        };

        Ok(LookupOutcome {
            domain: query.domain,
            record_type,
            server,
            answers,
        })
    }

    pub async fn status(&self) -> StatusSnapshot {
        let config = self.config.read().await.clone();
        let slot = self.core.lock().await;

        let (cache, listen, uptime_seconds) = match slot.as_ref() {
            Some(core) => (
                core.cache.stats(),
                Some(core.listen_addr.to_string()),
                Some(core.started_at.elapsed().as_secs()),
            ),
            None => (
                CacheStats {
                    size: 0,
                    maxsize: config.resolver.cache_size,
                    hits: 0,
                    misses: 0,
                    hit_rate: 0.0,
                },
                None,
                None,
            ),
        };

        let state = self.state();
        StatusSnapshot {
            state,
            running: state == ServiceState::Running,
            listen,
            uptime_seconds,
            cache,
            stats: self.stats.snapshot(),
            upstreams: config.resolver.upstreams.clone(),
        }
    }

    pub fn grouped_log(&self, filter: OutcomeFilter, limit: usize) -> Vec<DomainStatRow> {
        self.table.grouped(filter, limit)
    }
}

fn spawn_log_drain(
    tracker: &TaskTracker,
    cancel: CancellationToken,
    mut rx: mpsc::UnboundedReceiver<QueryOutcomeRecord>,
) {
    tracker.spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(e) => info!(
                        domain = %e.domain,
                        record_type = %e.record_type,
                        outcome = e.outcome.as_str(),
                        latency_ms = ?e.latency_ms,
                        upstream = ?e.upstream_server,
                        "Query completed"
                    ),
                    None => break,
                },
            }
        }
    });
}

fn spawn_listener(
    tracker: &TaskTracker,
    cancel: CancellationToken,
    socket: Arc<UdpSocket>,
    pipeline: Arc<QueryPipeline>,
) {
    let handler_tracker = tracker.clone();
    tracker.spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = socket.recv_from(&mut buf) => match received {
                    Ok((len, peer)) => {
                        let bytes = buf[..len].to_vec();
                        handler_tracker.spawn(handle_datagram(
                            pipeline.clone(),
                            socket.clone(),
                            bytes,
                            peer,
                        ));
                    }
                    Err(e) => warn!(error = %e, "UDP receive failed"),
                },
            }
        }
    });
}

async fn handle_datagram(
    pipeline: Arc<QueryPipeline>,
    socket: Arc<UdpSocket>,
    bytes: Vec<u8>,
    peer: SocketAddr,
) {
    let reply = match codec::decode_query(&bytes) {
        Ok(wire) => match wire.record_type {
            Some(record_type) => {
                let query = DnsQuery::new(wire.qname.clone(), record_type);
                match pipeline.process(&query, QuerySource::Client).await {
                    Ok(resolution) => {
                        codec::encode_answer(&wire, &resolution.answer, resolution.response_ttl)
                    }
                    Err(e) => {
                        warn!(domain = %wire.qname, error = %e, "Resolution failed");
                        codec::encode_failure(&wire, ResponseCode::ServFail)
                    }
                }
            }
            None => codec::encode_failure(&wire, ResponseCode::NotImp),
        },
        Err(e) => match codec::recover_id(&bytes) {
            Some(id) => {
                debug!(peer = %peer, error = %e, "Malformed query, replying FORMERR");
                codec::encode_format_error(id)
            }
            // Not even an ID to echo; drop silently.
            None => return,
        },
    };

    match reply {
        Ok(reply_bytes) => {
            if let Err(e) = socket.send_to(&reply_bytes, peer).await {
                warn!(peer = %peer, error = %e, "Failed to send reply");
            }
        }
        Err(e) => error!(peer = %peer, error = %e, "Failed to encode reply"),
    }
}
