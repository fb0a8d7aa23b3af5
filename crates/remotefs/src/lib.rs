//! # RemoteFS Library
//!
//! A chroot-confined, object view of a remote file hierarchy reachable over
//! a file-transfer session.
//!
//! ## Overview
//!
//! Callers work with [`Directory`] and [`File`] handles instead of raw path
//! strings and transport calls:
//!
//! - **Path Resolution**: relative, absolute and `~`-prefixed paths are
//!   resolved against a chroot root; no resolution may leave it
//! - **Item Lifecycle**: new items live in memory until created, moved items
//!   remember where they came from so an update can rename them
//! - **Lazy Content**: directory listings and file content are fetched on
//!   first access and cached
//! - **Transport Seam**: every remote call goes through the [`Transport`]
//!   trait and is logged with its transcript
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use remotefs::{Connection, Directory, Item, LocalTransport};
//! use remotefs::protocol::ServerDescriptor;
//!
//! fn main() -> anyhow::Result<()> {
//!     let server = ServerDescriptor::new("localhost", 22, "alice", "/home/alice");
//!     let conn = Connection::new(server, LocalTransport::new());
//!
//!     let mut docs = Directory::open(&conn, "~/docs", None)?;
//!     for entry in docs.content()? {
//!         println!("{}{}", entry.name(), if entry.is_dir() { "/" } else { "" });
//!     }
//!
//!     let mut reports = Directory::new_at(&conn, "~/docs", None)?;
//!     reports.set_name("reports")?;
//!     reports.create()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`connection`]: Server, transport and logging context shared by items
//! - [`error`]: Error types
//! - [`item`]: Path resolution, files and directories
//! - [`logging`]: Tracing subscriber setup
//! - [`transport`]: Transport trait and local filesystem implementation

pub mod config;
pub mod connection;
pub mod error;
pub mod item;
pub mod logging;
pub mod transport;

// Re-export protocol for convenience
pub use protocol;

pub use config::{Config, ConfigError};
pub use connection::Connection;
pub use error::{ItemError, ItemKind, Result};
pub use item::{Directory, Entry, File, Item, ItemPath};
pub use transport::{LocalTransport, Transport, TransportError};
