//! # RemoteFS Protocol Library
//!
//! Transport-facing types shared between the RemoteFS core and any
//! transport implementation.
//!
//! ## Overview
//!
//! - **Listing Records**: the raw metadata a transport reports for each name
//!   in a remote directory
//! - **Server Descriptor**: host, port, credentials and home directory of the
//!   remote server, with hostname resolution
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{ListingEntry, ServerDescriptor};
//!
//! let server = ServerDescriptor::new("files.example.com", 22, "alice", "/home/alice");
//! assert_eq!(server.to_string(), "alice@files.example.com:22");
//!
//! let entry = ListingEntry::file("notes.txt", 512, 1704067200);
//! assert!(entry.is_file());
//! ```
//!
//! ## Modules
//!
//! - [`messages`]: Listing record definitions
//! - [`server`]: Server descriptor
//! - [`error`]: Error types

pub mod error;
pub mod messages;
pub mod server;

pub use error::{ProtocolError, Result};
pub use messages::{EntryType, ListingEntry};
pub use server::{ServerDescriptor, DEFAULT_SSH_PORT};
