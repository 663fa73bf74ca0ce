//! Stats & query-log aggregation.
//!
//! Every completed query is recorded synchronously into lock-free counters
//! (never blocking the query path); external log sinks hang off the
//! fire-and-forget [`QueryEventEmitter`] instead.

pub mod counters;
pub mod emitter;
pub mod table;

pub use counters::{ResolverStats, StatsSnapshot};
pub use emitter::{QueryEvent, QueryEventEmitter};
pub use table::DomainStatTable;
