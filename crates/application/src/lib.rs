//! Kestrel DNS Application Layer
//!
//! Ports (the resolver seam) and the stats & query-log aggregator.
pub mod ports;
pub mod stats;

pub use ports::{DnsResolution, DnsResolver};
pub use stats::{
    DomainStatTable, QueryEvent, QueryEventEmitter, ResolverStats, StatsSnapshot,
};
