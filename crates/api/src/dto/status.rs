use kestrel_dns_domain::UpstreamTarget;
use kestrel_dns_infrastructure::dns::{CacheStats, StatusSnapshot};
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct StatusResponse {
    pub running: bool,
    pub state: String,
    /// `"active"` / `"inactive"`, the dashboard's coarse label.
    pub service: String,
    pub listen: Option<String>,
    pub uptime_seconds: Option<u64>,
    pub total_queries: u64,
    pub cached_queries: u64,
    pub forwarded_queries: u64,
    pub nxdomain_queries: u64,
    pub error_queries: u64,
    pub avg_upstream_ms: f64,
    pub cache: CacheSection,
    pub config: ConfigSection,
}

#[derive(Serialize, Debug, Clone)]
pub struct CacheSection {
    pub size: usize,
    pub maxsize: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Configured upstreams as structured records, not display strings.
#[derive(Serialize, Debug, Clone)]
pub struct ConfigSection {
    pub upstreams: Vec<UpstreamTarget>,
}

impl From<CacheStats> for CacheSection {
    fn from(stats: CacheStats) -> Self {
        Self {
            size: stats.size,
            maxsize: stats.maxsize,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate,
        }
    }
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            running: snapshot.running,
            state: snapshot.state.as_str().to_string(),
            service: if snapshot.running { "active" } else { "inactive" }.to_string(),
            listen: snapshot.listen,
            uptime_seconds: snapshot.uptime_seconds,
            total_queries: snapshot.stats.total_queries,
            cached_queries: snapshot.stats.cached_queries,
            forwarded_queries: snapshot.stats.forwarded_queries,
            nxdomain_queries: snapshot.stats.nxdomain_queries,
            error_queries: snapshot.stats.error_queries,
            avg_upstream_ms: snapshot.stats.avg_upstream_ms,
            cache: snapshot.cache.into(),
            config: ConfigSection {
                upstreams: snapshot.upstreams,
            },
        }
    }
}
