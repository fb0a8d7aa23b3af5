//! Path resolution and chroot confinement.
//!
//! An [`ItemPath`] splits a remote location into a directory component and a
//! leaf, both relative to a chroot root. Every validated assignment checks
//! that the resolved location stays below that root: the relative path is
//! normalised lexically and may never climb above it.

use std::cell::OnceCell;
use std::mem;

use crate::error::{ItemError, Result};

/// Location and lifecycle state shared by files and directories.
#[derive(Debug, Clone)]
pub struct ItemPath {
    /// Absolute confinement root, without trailing slash (`""` for `/`).
    chroot_dir: String,
    /// Directory component, relative to `chroot_dir`, no surrounding slashes.
    path: String,
    /// Leaf component.
    name: String,
    /// First directory component assigned; never overwritten.
    old_path: OnceCell<String>,
    /// First non-empty leaf assigned; never overwritten.
    old_name: OnceCell<String>,
    is_new: bool,
    retrieved: bool,
    mtime: Option<u64>,
    /// Location last written to the server by a create or update.
    synced: Option<(String, String)>,
}

/// Split a pathname into directory and leaf the way `dirname`/`basename` do.
///
/// A bare name yields `"."` as directory. Trailing slashes are ignored.
fn split_pathname(pathname: &str) -> (String, String) {
    let trimmed = pathname.trim_end_matches('/');
    if trimmed.is_empty() {
        let dir = if pathname.starts_with('/') { "/" } else { "" };
        return (dir.to_string(), String::new());
    }

    match trimmed.rfind('/') {
        None => (".".to_string(), trimmed.to_string()),
        Some(i) => {
            let dir = trimmed[..i].trim_end_matches('/');
            let dir = if dir.is_empty() { "/" } else { dir };
            (dir.to_string(), trimmed[i + 1..].to_string())
        }
    }
}

/// Resolve `.` and `..` segments. `None` if the path climbs above its start.
fn normalize(relative: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}

impl ItemPath {
    /// Resolve `pathname` against `chroot_dir`.
    ///
    /// `~` alone designates the root itself and a leading `~/` is relative to
    /// it. For a new item the leaf is folded into the directory component and
    /// the name is left empty, to be assigned with [`set_name`](Self::set_name)
    /// before the item is created. New items skip confinement validation
    /// until then.
    pub fn resolve(pathname: &str, chroot_dir: &str, is_new: bool) -> Result<Self> {
        let mut item = Self {
            chroot_dir: chroot_dir.trim_end_matches('/').to_string(),
            path: String::new(),
            name: String::new(),
            old_path: OnceCell::new(),
            old_name: OnceCell::new(),
            is_new,
            retrieved: false,
            mtime: None,
            synced: None,
        };

        let (mut dir, mut leaf) = split_pathname(pathname);

        if dir == "." && leaf == "~" {
            dir = "~/".to_string();
            leaf.clear();
        } else if dir == "~" {
            dir = "~/".to_string();
        } else if dir == "." {
            dir.clear();
        }

        if is_new {
            dir = if dir.is_empty() {
                mem::take(&mut leaf)
            } else {
                format!("{}/{}", dir, mem::take(&mut leaf))
            };
        }

        item.set_name(&leaf, false)?;
        item.set_path(&dir, !is_new)?;

        if !is_new {
            // Existing items remember where they were found, even at the root.
            let _ = item.old_path.set(item.path.clone());
            let _ = item.old_name.set(item.name.clone());
        }

        Ok(item)
    }

    /// Existing item named `name` directly inside this one.
    ///
    /// `name` is a raw listing name and is taken literally: no `~` or
    /// pathname splitting applies to it.
    pub fn child(&self, name: &str) -> Result<Self> {
        let path = self.relative_path();
        let item = Self {
            chroot_dir: self.chroot_dir.clone(),
            old_path: OnceCell::from(path.clone()),
            old_name: OnceCell::from(name.to_string()),
            path,
            name: name.to_string(),
            is_new: false,
            retrieved: false,
            mtime: None,
            synced: None,
        };

        if name.is_empty() || !item.validate_path() {
            return Err(ItemError::InvalidPath(name.to_string()));
        }
        Ok(item)
    }

    /// Assign the leaf, checking confinement when `validate` is set.
    ///
    /// On failure the previous name is kept and the rejected one is returned
    /// in [`ItemError::InvalidPath`].
    pub fn set_name(&mut self, name: &str, validate: bool) -> Result<&mut Self> {
        let previous = mem::replace(&mut self.name, name.to_string());

        if validate && !self.validate_path() {
            let rejected = mem::replace(&mut self.name, previous);
            return Err(ItemError::InvalidPath(rejected));
        }

        if !self.name.is_empty() {
            let _ = self.old_name.set(self.name.clone());
        }

        Ok(self)
    }

    /// Assign the directory component, checking confinement when `validate`
    /// is set.
    ///
    /// A leading chroot root or `~/` is stripped once, then surrounding
    /// slashes are trimmed.
    pub fn set_path(&mut self, path: &str, validate: bool) -> Result<&mut Self> {
        let stripped = self.strip_root(path);
        let previous = mem::replace(&mut self.path, stripped.trim_matches('/').to_string());

        if validate && !self.validate_path() {
            let rejected = mem::replace(&mut self.path, previous);
            return Err(ItemError::InvalidPath(rejected));
        }

        if !self.path.is_empty() {
            let _ = self.old_path.set(self.path.clone());
        }

        Ok(self)
    }

    fn strip_root<'a>(&self, path: &'a str) -> &'a str {
        let root = self.chroot_dir.as_str();
        if !root.is_empty() {
            if path == root {
                return "";
            }
            if let Some(rest) = path.strip_prefix(root) {
                if rest.starts_with('/') {
                    return rest;
                }
            }
        }

        path.strip_prefix("~/").unwrap_or(path)
    }

    /// Whether the item resolves inside the chroot root.
    pub fn validate_path(&self) -> bool {
        self.confined_path().is_some()
    }

    /// Full path with `.` and `..` resolved, or `None` if it escapes the root.
    pub fn confined_path(&self) -> Option<String> {
        let relative = self.relative_path();
        let segments = normalize(&relative)?;
        Some(format!("{}/{}", self.chroot_dir, segments.join("/")))
    }

    /// `chroot_dir + "/" + relative_path()`.
    pub fn full_path(&self) -> String {
        self.full_path_at(None, None)
    }

    /// Full path with the directory and/or leaf replaced.
    pub fn full_path_at(&self, path: Option<&str>, name: Option<&str>) -> String {
        format!("{}/{}", self.chroot_dir, self.relative_path_at(path, name))
    }

    /// Directory and leaf joined with `/`.
    pub fn relative_path(&self) -> String {
        self.relative_path_at(None, None)
    }

    /// Relative path with the directory and/or leaf replaced.
    ///
    /// A trailing slash is trimmed only when the item's own (empty) leaf is
    /// used.
    pub fn relative_path_at(&self, path: Option<&str>, name: Option<&str>) -> String {
        let dir = path.unwrap_or(&self.path);

        let mut relative = String::new();
        if !dir.is_empty() {
            relative.push_str(dir);
            relative.push('/');
        }

        match name {
            Some(name) => {
                relative.push_str(name);
                relative
            }
            None => {
                relative.push_str(&self.name);
                relative.trim_end_matches('/').to_string()
            }
        }
    }

    pub fn chroot_dir(&self) -> &str {
        &self.chroot_dir
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory component the item was first given.
    pub fn old_path(&self) -> &str {
        self.old_path.get().map(String::as_str).unwrap_or(&self.path)
    }

    /// Leaf the item was first given.
    pub fn old_name(&self) -> &str {
        self.old_name.get().map(String::as_str).unwrap_or(&self.name)
    }

    /// Full path of the first recorded location.
    pub fn old_full_path(&self) -> String {
        self.full_path_at(Some(self.old_path()), Some(self.old_name()))
    }

    /// Whether the current location differs from the first recorded one.
    pub fn is_moved(&self) -> bool {
        self.old_path() != self.path || self.old_name() != self.name
    }

    /// Full path the server currently holds the item at: the location last
    /// written by a create or update, else the first recorded one.
    pub fn synced_full_path(&self) -> String {
        match &self.synced {
            Some((path, name)) => self.full_path_at(Some(path), Some(name)),
            None => self.old_full_path(),
        }
    }

    /// Whether the current location differs from [`synced_full_path`](Self::synced_full_path).
    pub fn is_moved_since_sync(&self) -> bool {
        match &self.synced {
            Some((path, name)) => *path != self.path || *name != self.name,
            None => self.is_moved(),
        }
    }

    /// Record the current location as the one held by the server.
    pub(crate) fn mark_synced(&mut self) {
        self.synced = Some((self.path.clone(), self.name.clone()));
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn set_new(&mut self, is_new: bool) {
        self.is_new = is_new;
    }

    pub fn is_retrieved(&self) -> bool {
        self.retrieved
    }

    pub(crate) fn mark_retrieved(&mut self) {
        self.retrieved = true;
    }

    pub fn mtime(&self) -> Option<u64> {
        self.mtime
    }

    pub fn set_mtime(&mut self, mtime: u64) {
        self.mtime = Some(mtime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/home/alice";

    fn existing(pathname: &str) -> ItemPath {
        ItemPath::resolve(pathname, ROOT, false).unwrap()
    }

    #[test]
    fn test_split_pathname() {
        let pair = |dir: &str, leaf: &str| (dir.to_string(), leaf.to_string());
        assert_eq!(split_pathname("a/b/c"), pair("a/b", "c"));
        assert_eq!(split_pathname("c"), pair(".", "c"));
        assert_eq!(split_pathname("/c"), pair("/", "c"));
        assert_eq!(split_pathname("a/b/"), pair("a", "b"));
        assert_eq!(split_pathname("a//b"), pair("a", "b"));
        assert_eq!(split_pathname("/"), pair("/", ""));
        assert_eq!(split_pathname(""), pair("", ""));
    }

    #[test]
    fn test_resolve_relative() {
        let item = existing("docs/report.txt");
        assert_eq!(item.path(), "docs");
        assert_eq!(item.name(), "report.txt");
        assert_eq!(item.relative_path(), "docs/report.txt");
        assert_eq!(item.full_path(), "/home/alice/docs/report.txt");
    }

    #[test]
    fn test_resolve_bare_name_sits_at_root() {
        let item = existing("report.txt");
        assert_eq!(item.path(), "");
        assert_eq!(item.name(), "report.txt");
        assert_eq!(item.full_path(), "/home/alice/report.txt");
    }

    #[test]
    fn test_resolve_strips_chroot_prefix() {
        let item = existing("/home/alice/docs/report.txt");
        assert_eq!(item.path(), "docs");
        assert_eq!(item.full_path(), "/home/alice/docs/report.txt");
    }

    #[test]
    fn test_resolve_prefix_must_end_on_segment_boundary() {
        let item = existing("/home/alice2/x");
        assert_eq!(item.path(), "home/alice2");
        assert_eq!(item.full_path(), "/home/alice/home/alice2/x");
    }

    #[test]
    fn test_resolve_absolute_outside_root_is_rebased() {
        let item = existing("/etc/passwd");
        assert_eq!(item.full_path(), "/home/alice/etc/passwd");
        assert!(item.validate_path());
    }

    #[test]
    fn test_resolve_tilde() {
        let item = existing("~");
        assert_eq!(item.path(), "");
        assert_eq!(item.name(), "");
        assert_eq!(item.full_path(), "/home/alice/");
    }

    #[test]
    fn test_resolve_tilde_child() {
        let item = existing("~/notes.txt");
        assert_eq!(item.path(), "");
        assert_eq!(item.name(), "notes.txt");

        let item = existing("~/docs/notes.txt");
        assert_eq!(item.path(), "docs");
        assert_eq!(item.name(), "notes.txt");
    }

    #[test]
    fn test_resolve_root_trailing_slashes() {
        let item = ItemPath::resolve("a", "/srv/share///", false).unwrap();
        assert_eq!(item.chroot_dir(), "/srv/share");
        assert_eq!(item.full_path(), "/srv/share/a");

        let item = ItemPath::resolve("a", "/", false).unwrap();
        assert_eq!(item.chroot_dir(), "");
        assert_eq!(item.full_path(), "/a");
    }

    #[test]
    fn test_resolve_new_folds_leaf() {
        let item = ItemPath::resolve("foo/bar", ROOT, true).unwrap();
        assert_eq!(item.path(), "foo/bar");
        assert!(item.path().ends_with("bar"));
        assert_eq!(item.name(), "");
        assert!(item.is_new());
    }

    #[test]
    fn test_resolve_new_bare_name() {
        let item = ItemPath::resolve("foo", ROOT, true).unwrap();
        assert_eq!(item.path(), "foo");
        assert_eq!(item.name(), "");
    }

    #[test]
    fn test_resolve_new_skips_validation_until_named() {
        let mut item = ItemPath::resolve("../outside", ROOT, true).unwrap();
        assert!(!item.validate_path());

        let result = item.set_name("x", true);
        assert!(matches!(result, Err(ItemError::InvalidPath(name)) if name == "x"));
    }

    #[test]
    fn test_traversal_rejected_before_anything_else() {
        let result = ItemPath::resolve("../../etc/passwd", ROOT, false);
        assert!(matches!(result, Err(ItemError::InvalidPath(path)) if path == "../../etc"));
    }

    #[test]
    fn test_dotdot_at_root_rejected() {
        assert!(ItemPath::resolve("..", ROOT, false).is_err());
        assert!(ItemPath::resolve("a/../..", ROOT, false).is_err());
        assert!(ItemPath::resolve("~/../bob", ROOT, false).is_err());
    }

    #[test]
    fn test_dotdot_inside_deeper_path_allowed() {
        let item = existing("a/b/../c");
        assert!(item.validate_path());
        assert_eq!(item.confined_path().unwrap(), "/home/alice/a/c");

        let parent_link = existing("docs/..");
        assert_eq!(parent_link.confined_path().unwrap(), "/home/alice/");
    }

    #[test]
    fn test_set_name_rejects_escape_and_keeps_previous() {
        let mut item = existing("docs/a.txt");
        let result = item.set_name("../../b.txt", true);

        assert!(matches!(result, Err(ItemError::InvalidPath(name)) if name == "../../b.txt"));
        assert_eq!(item.name(), "a.txt");
    }

    #[test]
    fn test_set_path_rejects_escape_and_keeps_previous() {
        let mut item = existing("docs/a.txt");
        let result = item.set_path("docs/../..", true);

        assert!(matches!(result, Err(ItemError::InvalidPath(path)) if path == "docs/../.."));
        assert_eq!(item.path(), "docs");
    }

    #[test]
    fn test_set_path_without_validation() {
        let mut item = existing("docs/a.txt");
        item.set_path("../..", false).unwrap();
        assert_eq!(item.path(), "../..");
        assert!(!item.validate_path());
    }

    #[test]
    fn test_set_path_is_idempotent() {
        for input in ["/home/alice/x/y/", "~/x/y", "x/y", "//x/y//"] {
            let mut item = existing("a.txt");
            item.set_path(input, true).unwrap();
            let once = item.path().to_string();
            item.set_path(input, true).unwrap();
            assert_eq!(item.path(), once, "input {:?}", input);
            assert_eq!(once, "x/y", "input {:?}", input);
        }
    }

    #[test]
    fn test_set_path_strips_only_once() {
        let mut item = existing("a.txt");
        item.set_path("~/~/x", true).unwrap();
        assert_eq!(item.path(), "~/x");

        item.set_path("/home/alice/home/alice/x", true).unwrap();
        assert_eq!(item.path(), "home/alice/x");
    }

    #[test]
    fn test_set_path_with_empty_root_still_strips_tilde() {
        let mut item = ItemPath::resolve("a", "/", false).unwrap();
        item.set_path("~/etc", true).unwrap();
        assert_eq!(item.path(), "etc");
        assert_eq!(item.full_path(), "/etc/a");
    }

    #[test]
    fn test_validate_matches_confinement() {
        let roots = ["/home/alice", "/", "/srv/a/b"];
        let paths = ["", "x", "x/y", "..", "x/..", "x/../..", "~/x", "x/./y", "./.."];
        let names = ["", "f", "..", "../f", "../../f", ".", "~"];

        for root in roots {
            for path in paths {
                for name in names {
                    let mut item = ItemPath::resolve("placeholder", root, false).unwrap();
                    item.set_path(path, false).unwrap();
                    item.set_name(name, false).unwrap();

                    let expected = normalize(&item.relative_path()).is_some();
                    assert_eq!(
                        item.validate_path(),
                        expected,
                        "root={:?} path={:?} name={:?}",
                        root,
                        path,
                        name
                    );

                    if let Some(resolved) = item.confined_path() {
                        let prefix = format!("{}/", item.chroot_dir());
                        assert!(resolved.starts_with(&prefix));
                        assert!(!resolved.split('/').any(|s| s == ".."));
                    }

                    if !item.relative_path().contains("..") {
                        assert!(item.validate_path());
                    }
                }
            }
        }
    }

    #[test]
    fn test_full_path_round_trips_relative_path() {
        for pathname in ["a", "a/b", "~/c/d.txt", "/home/alice/e/f", "~"] {
            let item = existing(pathname);
            assert_eq!(
                item.full_path(),
                format!("{}/{}", item.chroot_dir(), item.relative_path())
            );
            assert_eq!(
                item.full_path_at(Some(item.path()), None),
                item.full_path()
            );
        }
    }

    #[test]
    fn test_relative_path_overrides() {
        let item = existing("docs/a.txt");
        assert_eq!(item.relative_path_at(Some("other"), None), "other/a.txt");
        assert_eq!(item.relative_path_at(None, Some("b.txt")), "docs/b.txt");
        assert_eq!(item.relative_path_at(Some(""), Some("b.txt")), "b.txt");
        assert_eq!(item.relative_path_at(None, Some("")), "docs/");
    }

    #[test]
    fn test_relative_path_trims_for_empty_leaf() {
        let mut item = existing("docs/a.txt");
        item.set_name("", true).unwrap();
        assert_eq!(item.relative_path(), "docs");
    }

    #[test]
    fn test_old_location_first_write_wins() {
        let mut item = existing("docs/a.txt");
        item.set_name("b.txt", true).unwrap();
        item.set_path("archive", true).unwrap();
        item.set_name("c.txt", true).unwrap();

        assert_eq!(item.old_path(), "docs");
        assert_eq!(item.old_name(), "a.txt");
        assert_eq!(item.old_full_path(), "/home/alice/docs/a.txt");
        assert_eq!(item.full_path(), "/home/alice/archive/c.txt");
        assert!(item.is_moved());
    }

    #[test]
    fn test_old_location_at_root_is_recorded() {
        let mut item = existing("a.txt");
        item.set_path("archive", true).unwrap();

        assert_eq!(item.old_path(), "");
        assert_eq!(item.old_full_path(), "/home/alice/a.txt");
    }

    #[test]
    fn test_old_name_of_new_item_seeded_by_first_name() {
        let mut item = ItemPath::resolve("docs", ROOT, true).unwrap();
        assert_eq!(item.old_name(), "");

        item.set_name("first", true).unwrap();
        item.set_name("second", true).unwrap();
        assert_eq!(item.old_name(), "first");
        assert_eq!(item.old_path(), "docs");
    }

    #[test]
    fn test_rejected_values_do_not_seed_old_location() {
        let mut item = ItemPath::resolve("", ROOT, true).unwrap();
        assert!(item.set_name("..", true).is_err());
        item.set_name("ok", true).unwrap();
        assert_eq!(item.old_name(), "ok");
    }

    #[test]
    fn test_not_moved_initially() {
        assert!(!existing("docs/a.txt").is_moved());
    }

    #[test]
    fn test_lifecycle_flags() {
        let mut item = existing("docs/a.txt");
        assert!(!item.is_new());
        assert!(!item.is_retrieved());
        assert_eq!(item.mtime(), None);

        item.mark_retrieved();
        item.set_mtime(1704067200);
        item.set_new(true);

        assert!(item.is_retrieved());
        assert_eq!(item.mtime(), Some(1704067200));
        assert!(item.is_new());
    }

    #[test]
    fn test_child_takes_listing_name_literally() {
        let root = existing("~");

        let tilde = root.child("~").unwrap();
        assert_eq!(tilde.path(), "");
        assert_eq!(tilde.name(), "~");
        assert_eq!(tilde.full_path(), "/home/alice/~");
        assert!(!tilde.is_moved());

        let docs = existing("docs");
        let nested = docs.child("~").unwrap();
        assert_eq!(nested.path(), "docs");
        assert_eq!(nested.full_path(), "/home/alice/docs/~");
    }

    #[test]
    fn test_child_parent_entry() {
        assert!(existing("~").child("..").is_err());
        assert!(existing("docs").child("").is_err());

        let up = existing("docs").child("..").unwrap();
        assert_eq!(up.full_path(), "/home/alice/docs/..");
        assert_eq!(up.confined_path().unwrap(), "/home/alice/");
    }

    #[test]
    fn test_synced_location_follows_updates() {
        let mut item = existing("docs/a.txt");
        assert_eq!(item.synced_full_path(), "/home/alice/docs/a.txt");
        assert!(!item.is_moved_since_sync());

        item.set_name("b.txt", true).unwrap();
        assert!(item.is_moved_since_sync());

        item.mark_synced();
        assert!(!item.is_moved_since_sync());
        assert_eq!(item.synced_full_path(), "/home/alice/docs/b.txt");
        // The origin snapshot is untouched.
        assert!(item.is_moved());
        assert_eq!(item.old_full_path(), "/home/alice/docs/a.txt");
    }
}
