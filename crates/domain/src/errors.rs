use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Unsupported record type: {0}")]
    NotImplemented(String),

    #[error("Upstream {server} timed out")]
    UpstreamTimeout { server: String },

    #[error("Upstream {server} unreachable: {reason}")]
    UpstreamUnreachable { server: String, reason: String },

    #[error("All upstream servers exhausted")]
    AllUpstreamsExhausted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Service state error: {0}")]
    ServiceState(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl DomainError {
    /// Failover advances past these; anything else aborts the attempt loop.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamTimeout { .. }
                | DomainError::UpstreamUnreachable { .. }
                | DomainError::Io(_)
        )
    }
}
