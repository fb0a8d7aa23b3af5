//! Raw directory listing records.
//!
//! A transport answers a listing request with one [`ListingEntry`] per name
//! found in the remote directory, including the `.` and `..` pseudo-entries
//! when the server reports them. The records are plain metadata; turning
//! them into typed items is the job of the consuming crate.

use serde::{Deserialize, Serialize};

/// Type of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
    /// Other (device, socket, fifo, etc.).
    Other,
}

/// A single record from a raw remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub entry_type: EntryType,
    /// Size in bytes as reported by the server.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub modified: u64,
}

impl ListingEntry {
    /// Create a regular file record.
    pub fn file(name: impl Into<String>, size: u64, modified: u64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::File,
            size,
            modified,
        }
    }

    /// Create a directory record.
    pub fn directory(name: impl Into<String>, modified: u64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Directory,
            size: 0,
            modified,
        }
    }

    /// Whether this record describes a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.entry_type, EntryType::File)
    }

    /// Whether this record is the `.` pseudo-entry.
    pub fn is_current_dir(&self) -> bool {
        self.name == "."
    }

    /// Whether this record is the `..` pseudo-entry.
    pub fn is_parent_dir(&self) -> bool {
        self.name == ".."
    }
}
