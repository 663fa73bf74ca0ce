use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use kestrel_dns_domain::DomainError;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// DNS over TLS (RFC 7858): a TLS-wrapped stream carrying the same
/// 2-byte length-prefixed framing as plain TCP.
pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: ServerName<'static>,
    connector: TlsConnector,
}

impl TlsTransport {
    pub fn new(server_addr: SocketAddr, server_name: String) -> Result<Self, DomainError> {
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(rustls::RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let server_name = ServerName::try_from(server_name.clone()).map_err(|e| {
            DomainError::InvalidConfig(format!("invalid TLS server name '{}': {}", server_name, e))
        })?;

        Ok(Self {
            server_addr,
            server_name,
            connector: TlsConnector::from(Arc::new(config)),
        })
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
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let tcp_stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let mut tls_stream = tokio::time::timeout(
            timeout,
            self.connector.connect(self.server_name.clone(), tcp_stream),
        )
        .await
        .map_err(|_| self.timeout_error())?
        .map_err(|e| self.unreachable(format!("TLS handshake failed: {}", e)))?;

        let mut framed = Vec::with_capacity(2 + message_bytes.len());
        framed.extend_from_slice(&(message_bytes.len() as u16).to_be_bytes());
        framed.extend_from_slice(message_bytes);

        tokio::time::timeout(timeout, tls_stream.write_all(&framed))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let mut length_buf = [0u8; 2];
        tokio::time::timeout(timeout, tls_stream.read_exact(&mut length_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        let response_length = u16::from_be_bytes(length_buf) as usize;
        let mut response_buf = vec![0u8; response_length];
        tokio::time::timeout(timeout, tls_stream.read_exact(&mut response_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.unreachable(e))?;

        debug!(
            server = %self.server_addr,
            bytes_received = response_length,
            "DoT response received"
        );

        Ok(TransportResponse {
            bytes: response_buf,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
