use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::errors::DomainError;

/// One upstream DNS server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamTarget {
    /// IP address or hostname of the upstream.
    pub host: String,

    #[serde(default = "default_dns_port")]
    pub port: u16,

    /// Operator-facing label (e.g. "Cloudflare").
    #[serde(default)]
    pub name: String,

    /// Per-target DNS-over-TLS opt-in. Only effective while the global
    /// `dot_enabled` override is also set.
    #[serde(default)]
    pub dot: bool,
}

impl UpstreamTarget {
    pub fn new(host: impl Into<String>, port: u16, name: impl Into<String>, dot: bool) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
            dot,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(SocketAddr::new(self.ip_addr()?, self.port))
    }

    fn ip_addr(&self) -> Result<IpAddr, DomainError> {
        self.host.parse().map_err(|_| {
            DomainError::InvalidConfig(format!(
                "upstream '{}' is not an IP address",
                self.host
            ))
        })
    }

    /// Display form used in status output and query logs.
    pub fn display(&self) -> String {
        if self.dot {
            format!("tls://{}:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.host.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "upstream host must not be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(DomainError::InvalidConfig(format!(
                "upstream '{}' has port 0",
                self.host
            )));
        }
        // Hostnames never resolve at query time, so they are rejected here
        // before any restart is attempted.
        self.ip_addr()?;
        Ok(())
    }
}

/// Resolver core configuration.
///
/// A single process-wide instance; replacing it goes through the control
/// surface and triggers a full resolver restart, never an in-place patch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default = "default_upstreams")]
    pub upstreams: Vec<UpstreamTarget>,

    /// Maximum number of live cache entries.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Lower clamp for cached-entry TTLs, seconds.
    #[serde(default = "default_cache_min_ttl")]
    pub cache_min_ttl: u32,

    /// Upper clamp for cached-entry TTLs, seconds.
    #[serde(default = "default_cache_max_ttl")]
    pub cache_max_ttl: u32,

    /// Per-upstream-attempt timeout, fractional seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    #[serde(default = "default_true")]
    pub log_queries: bool,

    /// Global DNS-over-TLS override; per-target `dot` opt-in is ignored
    /// while this is off.
    #[serde(default)]
    pub dot_enabled: bool,
}

impl ResolverConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    /// Synchronous validation, run before any restart is attempted so a
    /// bad write leaves the previous configuration active.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.upstreams.is_empty() {
            return Err(DomainError::InvalidConfig(
                "at least one upstream server is required".to_string(),
            ));
        }
        for upstream in &self.upstreams {
            upstream.validate()?;
        }
        if self.cache_size == 0 {
            return Err(DomainError::InvalidConfig(
                "cache_size must be positive".to_string(),
            ));
        }
        if self.cache_min_ttl > self.cache_max_ttl {
            return Err(DomainError::InvalidConfig(format!(
                "cache_min_ttl ({}) exceeds cache_max_ttl ({})",
                self.cache_min_ttl, self.cache_max_ttl
            )));
        }
        if !(self.timeout > 0.0) {
            return Err(DomainError::InvalidConfig(
                "timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upstreams: default_upstreams(),
            cache_size: default_cache_size(),
            cache_min_ttl: default_cache_min_ttl(),
            cache_max_ttl: default_cache_max_ttl(),
            timeout: default_timeout(),
            log_queries: true,
            dot_enabled: false,
        }
    }
}

fn default_upstreams() -> Vec<UpstreamTarget> {
    vec![
        UpstreamTarget::new("1.1.1.1", 53, "Cloudflare", true),
        UpstreamTarget::new("8.8.8.8", 53, "Google", true),
    ]
}

fn default_dns_port() -> u16 {
    53
}

fn default_cache_size() -> usize {
    10_000
}

fn default_cache_min_ttl() -> u32 {
    60
}

fn default_cache_max_ttl() -> u32 {
    86_400
}

fn default_timeout() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}
