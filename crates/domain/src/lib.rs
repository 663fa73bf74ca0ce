//! Kestrel DNS Domain Layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod query_log;

pub use config::{CliOverrides, Config, ResolverConfig, UpstreamTarget};
pub use dns_query::DnsQuery;
pub use dns_record::{Answer, DnsRecord, RecordData, RecordType};
pub use errors::DomainError;
pub use query_log::{DomainStatRow, OutcomeFilter, QueryOutcome, QueryOutcomeRecord, QuerySource};
