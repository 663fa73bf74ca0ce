#![allow(dead_code)]
pub mod mock_upstream;

pub use mock_upstream::{MockBehavior, MockUpstream};

use kestrel_dns_domain::{Config, UpstreamTarget};

/// Service config wired to a single mock upstream on an ephemeral port.
pub fn config_for(upstream: &MockUpstream) -> Config {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.dns_port = 0;
    config.resolver.upstreams = vec![UpstreamTarget::new(
        upstream.addr().ip().to_string(),
        upstream.addr().port(),
        "mock",
        false,
    )];
    config.resolver.timeout = 0.2;
    config
}
