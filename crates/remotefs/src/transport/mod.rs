//! Transport seam.
//!
//! The core never talks to a server directly. Every remote call goes through
//! a [`Transport`], which owns the session and keeps a transcript of the last
//! operation for diagnostics. Calls are synchronous and a single transport is
//! never used from two threads at once (see [`crate::Connection`]).

pub mod local;
#[cfg(test)]
pub(crate) mod mock;

use protocol::ListingEntry;
use thiserror::Error;

pub use local::LocalTransport;

/// Failure reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server refused or failed the operation.
    #[error("remote operation failed: {0}")]
    Failed(String),

    /// The listed path is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote file operations required by the item layer.
///
/// All paths are absolute remote paths, already confined by the caller.
pub trait Transport: Send {
    /// List a directory. The result may include `.` and `..`.
    fn list(&mut self, path: &str) -> Result<Vec<ListingEntry>, TransportError>;

    /// Create a single directory.
    fn mkdir(&mut self, path: &str) -> Result<(), TransportError>;

    /// Delete a file, or a directory and everything below it.
    fn delete(&mut self, path: &str) -> Result<(), TransportError>;

    /// Move `from` to `to`.
    fn rename(&mut self, from: &str, to: &str) -> Result<(), TransportError>;

    /// Read a whole file.
    fn get(&mut self, path: &str) -> Result<Vec<u8>, TransportError>;

    /// Write a whole file, replacing any previous content.
    fn put(&mut self, path: &str, data: &[u8]) -> Result<(), TransportError>;

    /// Log of the most recent operation.
    fn transcript(&self) -> String;
}
