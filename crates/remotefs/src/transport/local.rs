//! Transport backed by the local filesystem.
//!
//! Remote paths are used as local paths verbatim, which makes this transport
//! useful for loopback setups (a chroot root pointing at a mounted share) and
//! for exercising the item layer against a real directory tree.

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;

use protocol::{EntryType, ListingEntry};

use super::{Transport, TransportError};

/// Local filesystem transport.
///
/// Listings report `.` and `..` like a raw SFTP listing. Symlinks are
/// reported as [`EntryType::Symlink`] and never followed.
#[derive(Debug, Default)]
pub struct LocalTransport {
    /// Transcript lines of the most recent operation.
    log: Vec<String>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, request: String) {
        self.log.clear();
        self.log.push(format!("-> {}", request));
    }

    fn finish<T>(&mut self, result: Result<T, TransportError>) -> Result<T, TransportError> {
        match &result {
            Ok(_) => self.log.push("<- OK".to_string()),
            Err(e) => self.log.push(format!("<- FAILURE: {}", e)),
        }
        result
    }
}

fn entry_type(metadata: &Metadata) -> EntryType {
    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        EntryType::Symlink
    } else if file_type.is_dir() {
        EntryType::Directory
    } else if file_type.is_file() {
        EntryType::File
    } else {
        EntryType::Other
    }
}

fn to_entry(name: String, metadata: &Metadata) -> ListingEntry {
    let entry_type = entry_type(metadata);

    let size = if matches!(entry_type, EntryType::File) {
        metadata.len()
    } else {
        0
    };

    let modified = metadata
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    ListingEntry {
        name,
        entry_type,
        size,
        modified,
    }
}

fn read_listing(path: &Path) -> Result<Vec<ListingEntry>, TransportError> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_dir() {
        return Err(TransportError::NotADirectory(path.display().to_string()));
    }

    let mut results = vec![to_entry(".".to_string(), &metadata)];

    let parent = path.parent().unwrap_or(path);
    if let Ok(parent_metadata) = fs::metadata(parent) {
        results.push(to_entry("..".to_string(), &parent_metadata));
    }

    for entry_result in fs::read_dir(path)? {
        let entry = match entry_result {
            Ok(e) => e,
            Err(_) => continue, // Skip entries we can't read
        };

        // Don't follow symlinks
        let metadata = match fs::symlink_metadata(entry.path()) {
            Ok(m) => m,
            Err(_) => continue, // Skip entries we can't stat
        };

        let name = entry.file_name().to_string_lossy().to_string();
        results.push(to_entry(name, &metadata));
    }

    Ok(results)
}

fn remove(path: &Path) -> Result<(), TransportError> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

impl Transport for LocalTransport {
    fn list(&mut self, path: &str) -> Result<Vec<ListingEntry>, TransportError> {
        self.begin(format!("LIST {}", path));
        let result = read_listing(Path::new(path));
        if let Ok(entries) = &result {
            self.log.push(format!("<- {} entries", entries.len()));
        }
        self.finish(result)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), TransportError> {
        self.begin(format!("MKDIR {}", path));
        let result = fs::create_dir(path).map_err(TransportError::from);
        self.finish(result)
    }

    fn delete(&mut self, path: &str) -> Result<(), TransportError> {
        self.begin(format!("REMOVE {}", path));
        let result = remove(Path::new(path));
        self.finish(result)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), TransportError> {
        self.begin(format!("RENAME {} {}", from, to));
        let result = fs::rename(from, to).map_err(TransportError::from);
        self.finish(result)
    }

    fn get(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        self.begin(format!("READ {}", path));
        let result = fs::read(path).map_err(TransportError::from);
        if let Ok(data) = &result {
            self.log.push(format!("<- {} bytes", data.len()));
        }
        self.finish(result)
    }

    fn put(&mut self, path: &str, data: &[u8]) -> Result<(), TransportError> {
        self.begin(format!("WRITE {} ({} bytes)", path, data.len()));
        let result = fs::write(path, data).map_err(TransportError::from);
        self.finish(result)
    }

    fn transcript(&self) -> String {
        self.log.join("\n")
    }
}
