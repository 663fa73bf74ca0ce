pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use kestrel_dns_domain::{DomainError, UpstreamTarget};
use std::time::Duration;

/// Result of a raw DNS transport operation.
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format).
    pub bytes: Vec<u8>,
    /// Which protocol was used.
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport — stack-allocated, no Box/vtable overhead.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            Self::Tls(_) => "TLS",
        }
    }
}

/// Create the transport for an upstream target.
///
/// DoT requires both the per-target opt-in and the global override; any
/// other combination resolves over plain UDP (with TCP retry on
/// truncation handled by the failover loop).
pub fn create_transport(
    target: &UpstreamTarget,
    dot_enabled: bool,
) -> Result<Transport, DomainError> {
    if target.dot && dot_enabled {
        Ok(Transport::Tls(tls::TlsTransport::new(
            target.socket_addr()?,
            target.host.clone(),
        )?))
    } else {
        Ok(Transport::Udp(udp::UdpTransport::new(target.socket_addr()?)))
    }
}
