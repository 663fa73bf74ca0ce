use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use kestrel_dns_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP: 2-byte length-prefixed messages on a fresh connection.
/// Used for retrying truncated UDP responses.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::UpstreamTimeout {
            server: self.server_addr.to_string(),
        }
    }

    fn unreachable(&self, reason: impl std::fmt::Display) -> DomainError {
        DomainError::UpstreamUnreachable {
            server: self.server_addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let mut stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let mut framed = Vec::with_capacity(2 + message_bytes.len());
        framed.extend_from_slice(&(message_bytes.len() as u16).to_be_bytes());
        framed.extend_from_slice(message_bytes);

        tokio::time::timeout(timeout, stream.write_all(&framed))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let mut length_buf = [0u8; 2];
        tokio::time::timeout(timeout, stream.read_exact(&mut length_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let response_length = u16::from_be_bytes(length_buf) as usize;
        let mut response_buf = vec![0u8; response_length];
        tokio::time::timeout(timeout, stream.read_exact(&mut response_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        debug!(
            server = %self.server_addr,
            bytes_received = response_length,
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_buf,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
