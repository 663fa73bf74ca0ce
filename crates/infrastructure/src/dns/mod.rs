pub mod cache;
pub mod codec;
pub mod forwarding;
pub mod record_map;
pub mod resolver;
pub mod service;
pub mod transport;
pub mod upstream;

pub use cache::{CacheStats, DnsCache};
pub use resolver::CachingResolver;
pub use service::{LookupOutcome, ResolverService, ServiceState, StatusSnapshot};
pub use upstream::ForwardingResolver;
