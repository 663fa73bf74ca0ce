use crate::dns_record::RecordType;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Source of a DNS query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuerySource {
    /// Query received on the DNS listener.
    #[default]
    Client,
    /// Ad-hoc lookup issued through the control surface. Updates in-memory
    /// stats but is never forwarded to the query-log sink.
    Operator,
}

impl QuerySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuerySource::Client => "client",
            QuerySource::Operator => "operator",
        }
    }
}

/// How a completed query was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Answered from the cache (positive or negative entry).
    Cached,
    /// Forwarded upstream and answered with records.
    Forwarded,
    /// Forwarded upstream and answered authoritatively nonexistent.
    NxDomain,
    /// Every configured upstream failed.
    Error,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Cached => "cached",
            QueryOutcome::Forwarded => "forwarded",
            QueryOutcome::NxDomain => "nxdomain",
            QueryOutcome::Error => "error",
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter selector for the grouped query-log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeFilter {
    #[default]
    All,
    Cached,
    Forwarded,
    NxDomain,
    Error,
}

impl OutcomeFilter {
    pub fn matches(&self, outcome: QueryOutcome) -> bool {
        match self {
            OutcomeFilter::All => true,
            OutcomeFilter::Cached => outcome == QueryOutcome::Cached,
            OutcomeFilter::Forwarded => outcome == QueryOutcome::Forwarded,
            OutcomeFilter::NxDomain => outcome == QueryOutcome::NxDomain,
            OutcomeFilter::Error => outcome == QueryOutcome::Error,
        }
    }
}

impl FromStr for OutcomeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(OutcomeFilter::All),
            "cached" => Ok(OutcomeFilter::Cached),
            "forwarded" => Ok(OutcomeFilter::Forwarded),
            "nxdomain" => Ok(OutcomeFilter::NxDomain),
            "error" => Ok(OutcomeFilter::Error),
            other => Err(format!("unknown outcome filter: {}", other)),
        }
    }
}

/// Ephemeral record of one completed query, consumed by the stats
/// aggregator and (best-effort) the query-log sink.
#[derive(Debug, Clone)]
pub struct QueryOutcomeRecord {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub outcome: QueryOutcome,
    /// Upstream round-trip; `None` for cache hits.
    pub latency_ms: Option<u64>,
    pub upstream_server: Option<Arc<str>>,
    pub source: QuerySource,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Aggregate snapshot row for one `(qname, qtype)` key.
#[derive(Debug, Clone)]
pub struct DomainStatRow {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub hits: u64,
    pub cache_hits: u64,
    /// Mean upstream latency over forwarded queries only.
    pub avg_latency_ms: f64,
    pub last_seen: chrono::DateTime<chrono::Utc>,
}
