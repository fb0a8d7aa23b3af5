//! Error types for item operations.

use std::fmt;

use thiserror::Error;

use crate::transport::TransportError;

/// Which kind of remote entity an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    File,
    Directory,
}

impl ItemKind {
    /// Type name used as the prefix of log records (`Directory::retrieve`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// Errors raised by item construction and remote operations.
#[derive(Debug, Error)]
pub enum ItemError {
    /// A path or name would resolve outside the chroot root.
    ///
    /// Raised before any remote call is made. Carries the rejected value.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The transport reported a failure for the requested operation.
    #[error("unreachable {kind}: {path}")]
    Unreachable {
        /// Kind of item the operation targeted.
        kind: ItemKind,
        /// Full remote path of the item.
        path: String,
        /// Failure reported by the transport.
        #[source]
        source: TransportError,
    },

    /// A previous holder of the transport panicked mid-operation.
    #[error("connection lock poisoned")]
    ConnectionPoisoned,
}

impl ItemError {
    /// Whether this error came from the transport rather than from the caller.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Result type alias for item operations.
pub type Result<T> = std::result::Result<T, ItemError>;
