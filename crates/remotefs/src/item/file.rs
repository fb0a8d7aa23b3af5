//! Remote files.

use std::sync::Arc;

use super::{move_remote, remote_call, Item, ItemPath};
use crate::connection::Connection;
use crate::error::{ItemKind, Result};

/// A remote file.
///
/// `size` is listing metadata and is never recomputed from local content.
/// Content is downloaded on first access and uploaded by
/// [`create`](Item::create) and [`update`](Item::update).
#[derive(Debug)]
pub struct File {
    conn: Arc<Connection>,
    item: ItemPath,
    content: Option<Vec<u8>>,
    size: Option<u64>,
}

impl File {
    /// Handle on an existing file. `root` defaults to the connection's
    /// default root when `None` or empty.
    pub fn open(conn: &Arc<Connection>, pathname: &str, root: Option<&str>) -> Result<Self> {
        Self::build(conn, pathname, root, false)
    }

    /// Handle on a file to be created under `pathname`.
    pub fn new_at(conn: &Arc<Connection>, pathname: &str, root: Option<&str>) -> Result<Self> {
        Self::build(conn, pathname, root, true)
    }

    fn build(
        conn: &Arc<Connection>,
        pathname: &str,
        root: Option<&str>,
        is_new: bool,
    ) -> Result<Self> {
        let root = match root {
            Some(root) if !root.is_empty() => root,
            _ => conn.default_root(),
        };
        let item = ItemPath::resolve(pathname, root, is_new)?;
        Ok(Self::from_parts(Arc::clone(conn), item))
    }

    pub(super) fn from_parts(conn: Arc<Connection>, item: ItemPath) -> Self {
        Self {
            conn,
            item,
            content: None,
            size: None,
        }
    }

    /// Size reported by the last listing, if any.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    /// File content, downloading it first if it was never fetched.
    ///
    /// A new file with no content set reads as empty.
    pub fn content(&mut self) -> Result<&[u8]> {
        if self.content.is_none() && !self.item.is_retrieved() && !self.item.is_new() {
            self.retrieve()?;
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Replace the content held locally. Nothing is sent until
    /// [`create`](Item::create) or [`update`](Item::update).
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = Some(content.into());
    }

    fn upload(&self, operation: &str, verb: &str) -> Result<()> {
        let full_path = self.item.full_path();
        let data = self.content.as_deref().unwrap_or_default();
        remote_call(
            &self.conn,
            Self::KIND,
            operation,
            &format!("{} \"{}\" ({} bytes)", verb, full_path, data.len()),
            &full_path,
            |t| t.put(&full_path, data),
        )
    }
}

impl Item for File {
    const KIND: ItemKind = ItemKind::File;

    /// Number of bytes downloaded.
    type Retrieved = usize;

    fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    fn item_path(&self) -> &ItemPath {
        &self.item
    }

    fn item_path_mut(&mut self) -> &mut ItemPath {
        &mut self.item
    }

    fn retrieve(&mut self) -> Result<usize> {
        let full_path = self.item.full_path();
        let data = remote_call(
            &self.conn,
            Self::KIND,
            "retrieve",
            &format!("Downloading \"{}\"", full_path),
            &full_path,
            |t| t.get(&full_path),
        )?;

        let len = data.len();
        self.content = Some(data);
        self.item.mark_retrieved();
        Ok(len)
    }

    /// Write the held content (empty if none) at the current location.
    fn create(&mut self) -> Result<()> {
        self.upload("create", "Creating")?;
        self.item.set_new(false);
        self.item.mark_synced();
        Ok(())
    }

    /// Move the file if its location changed since it was last written,
    /// then upload held content.
    fn update(&mut self) -> Result<()> {
        if self.item.is_moved_since_sync() {
            let from = self.item.synced_full_path();
            let to = self.item.full_path();
            move_remote(&self.conn, Self::KIND, &from, &to)?;
            self.item.mark_synced();
        }
        if self.content.is_some() {
            self.upload("update", "Uploading")?;
        }
        Ok(())
    }
}
