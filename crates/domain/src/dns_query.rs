use super::RecordType;
use std::sync::Arc;

/// DNS query (domain + record type).
/// Uses `Arc<str>` for zero-cost cloning across cache → upstream → stats layers.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    pub fn new(domain: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            domain: domain.into(),
            record_type,
        }
    }

    /// Lowercase the name and ensure a trailing dot.
    ///
    /// All cache keys and stat rows are built from the normalized form so
    /// `Example.COM` and `example.com.` land on the same entry.
    pub fn normalized(domain: &str, record_type: RecordType) -> Self {
        let mut name = domain.trim().to_ascii_lowercase();
        if !name.ends_with('.') {
            name.push('.');
        }
        Self::new(name, record_type)
    }
}
