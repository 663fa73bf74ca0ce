//! Configuration for the Kestrel DNS resolver core.
//!
//! - `resolver`: upstream list, cache sizing, TTL bounds, timeout
//! - `server`: listener ports and bind address
//! - `logging`: log level
//! - `root`: file loading and CLI overrides

pub mod logging;
pub mod resolver;
pub mod root;
pub mod server;

pub use logging::LoggingConfig;
pub use resolver::{ResolverConfig, UpstreamTarget};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
