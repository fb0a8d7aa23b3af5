//! Error types for the protocol crate.

use thiserror::Error;

/// Protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Neither a hostname nor an IP address is configured.
    #[error("server has no host or IP address configured")]
    EmptyServerInfo,

    /// The hostname did not resolve to any address.
    #[error("unable to resolve hostname: {0}")]
    UnresolvedHostname(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
