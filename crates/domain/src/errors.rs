use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Upstream {server} answered with {rcode}")]
    UpstreamRcode { server: String, rcode: &'static str },

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport error talking to {server}: {reason}")]
    TransportError { server: String, reason: String },

    #[error("All upstream servers are unreachable")]
    TransportAllServersUnreachable,

    #[error("no answer received")]
    NoDownstreamAnswer,

    #[error("Failed to write response: {0}")]
    WriteFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Deadline or cancellation, as opposed to an answer the upstream actually gave.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DomainError::Cancelled | DomainError::QueryTimeout)
    }
}

/// Failures of the alias chain locator on a single record set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasChainError {
    #[error("no CNAME records found")]
    NoAliasRecords,

    #[error("no CNAME records found for {0}")]
    NoAliasForName(String),

    #[error("circular reference found in CNAME chain starting at {0}")]
    CircularAlias(String),
}
