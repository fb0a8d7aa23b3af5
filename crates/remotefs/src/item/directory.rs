//! Remote directories.

use std::slice;
use std::sync::Arc;

use protocol::ListingEntry;

use super::{remote_call, Entry, File, Item, ItemPath};
use crate::connection::Connection;
use crate::error::{ItemKind, Result};

/// A remote directory and its cached listing.
///
/// The listing is fetched on first access through [`content`](Self::content)
/// and kept until the next [`retrieve`](Item::retrieve). Directories come
/// before files, each group in ascending byte order of name.
#[derive(Debug)]
pub struct Directory {
    conn: Arc<Connection>,
    item: ItemPath,
    content: Vec<Entry>,
}

impl Directory {
    /// Handle on an existing directory. `root` defaults to the connection's
    /// default root when `None` or empty.
    pub fn open(conn: &Arc<Connection>, pathname: &str, root: Option<&str>) -> Result<Self> {
        Self::build(conn, pathname, root, false)
    }

    /// Handle on a directory to be created under `pathname`.
    ///
    /// Give it a name with [`Item::set_name`] before calling
    /// [`Item::create`].
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
        Ok(Self {
            conn: Arc::clone(conn),
            item: ItemPath::resolve(pathname, root, is_new)?,
            content: Vec::new(),
        })
    }

    /// Children, retrieving the listing first if it was never fetched.
    pub fn content(&mut self) -> Result<&[Entry]> {
        if !self.item.is_retrieved() && !self.item.is_new() {
            self.retrieve()?;
        }
        Ok(&self.content)
    }

    /// Replace the cached children.
    pub fn set_content(&mut self, content: Vec<Entry>) {
        self.content = content;
    }

    /// Cached children, without touching the server.
    pub fn children(&self) -> &[Entry] {
        &self.content
    }

    /// Number of cached children; zero before the first retrieval.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.content.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.content.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.content.iter()
    }

    fn child(&self, entry: &ListingEntry) -> Result<Entry> {
        let mut item = self.item.child(&entry.name)?;
        item.set_mtime(entry.modified);

        let conn = Arc::clone(&self.conn);
        Ok(if entry.is_file() {
            let mut file = File::from_parts(conn, item);
            file.set_size(entry.size);
            Entry::File(file)
        } else {
            Entry::Directory(Self {
                conn,
                item,
                content: Vec::new(),
            })
        })
    }
}

impl Item for Directory {
    const KIND: ItemKind = ItemKind::Directory;

    type Retrieved = Vec<ListingEntry>;

    fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    fn item_path(&self) -> &ItemPath {
        &self.item
    }

    fn item_path_mut(&mut self) -> &mut ItemPath {
        &mut self.item
    }

    /// List the directory and rebuild the cached children.
    ///
    /// `.` is always skipped, `..` only at the chroot root. Returns the raw
    /// listing.
    fn retrieve(&mut self) -> Result<Vec<ListingEntry>> {
        let full_path = self.item.full_path();
        let listing = remote_call(
            &self.conn,
            Self::KIND,
            "retrieve",
            &format!("Listing \"{}\"", full_path),
            &full_path,
            |t| t.list(&full_path),
        )?;

        let at_root = self.item.relative_path().is_empty();
        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in &listing {
            if entry.is_current_dir() || (at_root && entry.is_parent_dir()) {
                continue;
            }
            match self.child(entry)? {
                Entry::File(file) => files.push(Entry::File(file)),
                dir => directories.push(dir),
            }
        }

        directories.sort_by(|a, b| a.name().cmp(b.name()));
        files.sort_by(|a, b| a.name().cmp(b.name()));
        directories.append(&mut files);

        self.content = directories;
        self.item.mark_retrieved();
        Ok(listing)
    }

    fn create(&mut self) -> Result<()> {
        let full_path = self.item.full_path();
        remote_call(
            &self.conn,
            Self::KIND,
            "create",
            &format!("Creating \"{}\"", full_path),
            &full_path,
            |t| t.mkdir(&full_path),
        )?;
        self.item.set_new(false);
        Ok(())
    }

    /// A directory has no content of its own to push: updating moves it.
    fn update(&mut self) -> Result<()> {
        self.rename()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
