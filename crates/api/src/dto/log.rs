use kestrel_dns_domain::DomainStatRow;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct GroupedLogParams {
    /// Outcome class filter; defaults to `all`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Maximum rows; defaults to 50.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize, Debug, Clone)]
pub struct GroupedLogRow {
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub hits: u64,
    pub cache_hits: u64,
    pub avg_latency_ms: f64,
    pub last_seen: String,
}

impl From<DomainStatRow> for GroupedLogRow {
    fn from(row: DomainStatRow) -> Self {
        Self {
            domain: row.domain.to_string(),
            record_type: row.record_type.as_str().to_string(),
            hits: row.hits,
            cache_hits: row.cache_hits,
            avg_latency_ms: row.avg_latency_ms,
            last_seen: row.last_seen.to_rfc3339(),
        }
    }
}
