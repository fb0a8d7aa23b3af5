//! Remote items: files and directories.
//!
//! Both kinds share [`ItemPath`] for location, confinement and lifecycle
//! state, and implement [`Item`] for the remote operations. A directory
//! listing holds its children as [`Entry`] values.
//!
//! Every remote call is logged twice: a debug record with the transport
//! transcript and an info record stating what was attempted and whether it
//! succeeded. A failed call becomes [`ItemError::Unreachable`].

pub mod directory;
pub mod file;
pub mod path;

use std::sync::Arc;

pub use directory::Directory;
pub use file::File;
pub use path::ItemPath;

use crate::connection::Connection;
use crate::error::{ItemError, ItemKind, Result};
use crate::transport::{Transport, TransportError};

/// Run one transport call, log its outcome and map failure to
/// [`ItemError::Unreachable`].
pub(crate) fn remote_call<T>(
    conn: &Connection,
    kind: ItemKind,
    operation: &str,
    message: &str,
    path: &str,
    call: impl FnOnce(&mut dyn Transport) -> std::result::Result<T, TransportError>,
) -> Result<T> {
    let _entered = conn.span().enter();
    let operation = format!("{}::{}", kind.label(), operation);

    let outcome = conn.with_transport(|transport| {
        let result = call(&mut *transport);
        (result, transport.transcript())
    });
    let (result, transcript) = match outcome {
        Ok(done) => done,
        Err(err) => {
            tracing::debug!(operation = %operation, error = %err, "transport unavailable");
            tracing::info!(
                "{} - {} on server \"{}\" failed",
                operation,
                message,
                conn.server()
            );
            return Err(err);
        }
    };

    let outcome = if result.is_ok() { "succeed" } else { "failed" };

    tracing::debug!(operation = %operation, transcript = %transcript, "transport transcript");
    tracing::info!(
        "{} - {} on server \"{}\" {}",
        operation,
        message,
        conn.server(),
        outcome
    );

    result.map_err(|source| ItemError::Unreachable {
        kind,
        path: path.to_string(),
        source,
    })
}

/// Move `from` to `to` on the server, logged as a rename.
pub(crate) fn move_remote(conn: &Connection, kind: ItemKind, from: &str, to: &str) -> Result<()> {
    remote_call(
        conn,
        kind,
        "rename",
        &format!("Renaming \"{}\" to \"{}\"", from, to),
        to,
        |t| t.rename(from, to),
    )
}

/// Remote operations shared by files and directories.
pub trait Item {
    /// Kind reported in logs and errors.
    const KIND: ItemKind;

    /// What [`retrieve`](Item::retrieve) hands back for diagnostics.
    type Retrieved;

    fn connection(&self) -> &Arc<Connection>;

    fn item_path(&self) -> &ItemPath;

    fn item_path_mut(&mut self) -> &mut ItemPath;

    /// Fetch the item's content from the server.
    fn retrieve(&mut self) -> Result<Self::Retrieved>;

    /// Materialise the item on the server.
    fn create(&mut self) -> Result<()>;

    /// Push local changes (location, content) to the server.
    fn update(&mut self) -> Result<()>;

    /// Remove the item from the server.
    fn delete(&mut self) -> Result<()> {
        let path = self.item_path().full_path();
        remote_call(
            self.connection(),
            Self::KIND,
            "remove",
            &format!("Removing \"{}\"", path),
            &path,
            |t| t.delete(&path),
        )
    }

    /// Move the item from its first recorded location to its current one.
    ///
    /// The recorded location is not refreshed on success, so a second rename
    /// starts again from the original location.
    fn rename(&mut self) -> Result<()> {
        let old_path = self.item_path().old_full_path();
        let new_path = self.item_path().full_path();
        move_remote(self.connection(), Self::KIND, &old_path, &new_path)
    }

    fn name(&self) -> &str {
        self.item_path().name()
    }

    fn path(&self) -> &str {
        self.item_path().path()
    }

    fn full_path(&self) -> String {
        self.item_path().full_path()
    }

    fn relative_path(&self) -> String {
        self.item_path().relative_path()
    }

    /// Rename locally; fails if the result would leave the chroot root.
    fn set_name(&mut self, name: &str) -> Result<()> {
        self.item_path_mut().set_name(name, true).map(|_| ())
    }

    /// Move locally; fails if the result would leave the chroot root.
    fn set_path(&mut self, path: &str) -> Result<()> {
        self.item_path_mut().set_path(path, true).map(|_| ())
    }

    fn is_new(&self) -> bool {
        self.item_path().is_new()
    }

    fn is_retrieved(&self) -> bool {
        self.item_path().is_retrieved()
    }

    fn mtime(&self) -> Option<u64> {
        self.item_path().mtime()
    }
}

/// A child of a directory listing.
#[derive(Debug)]
pub enum Entry {
    File(File),
    Directory(Directory),
}

impl Entry {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::File(_) => ItemKind::File,
            Self::Directory(_) => ItemKind::Directory,
        }
    }

    pub fn item_path(&self) -> &ItemPath {
        match self {
            Self::File(file) => file.item_path(),
            Self::Directory(dir) => dir.item_path(),
        }
    }

    pub fn name(&self) -> &str {
        self.item_path().name()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut File> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    pub fn delete(&mut self) -> Result<()> {
        match self {
            Self::File(file) => file.delete(),
            Self::Directory(dir) => dir.delete(),
        }
    }

    pub fn rename(&mut self) -> Result<()> {
        match self {
            Self::File(file) => file.rename(),
            Self::Directory(dir) => dir.rename(),
        }
    }
}
