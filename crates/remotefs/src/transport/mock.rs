//! In-memory transport that records every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use protocol::ListingEntry;

use super::{Transport, TransportError};

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub listings: HashMap<String, Vec<ListingEntry>>,
    pub files: HashMap<String, Vec<u8>>,
    pub calls: Vec<String>,
    pub failing: HashSet<&'static str>,
    pub last: String,
}

/// Cloneable handle; clones share state so tests can inspect calls after
/// handing one clone to a connection.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_listing(self, path: &str, entries: Vec<ListingEntry>) -> Self {
        self.state().listings.insert(path.to_string(), entries);
        self
    }

    pub fn with_file(self, path: &str, data: &[u8]) -> Self {
        self.state().files.insert(path.to_string(), data.to_vec());
        self
    }

    /// Make every call of `operation` fail.
    pub fn failing(self, operation: &'static str) -> Self {
        self.state().failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &'static str, args: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.calls.push(format!("{} {}", operation, args));
        if state.failing.contains(operation) {
            state.last = format!("{} {} -> failure", operation, args);
            return Err(TransportError::Failed(format!("{} refused", operation)));
        }
        state.last = format!("{} {} -> ok", operation, args);
        Ok(())
    }
}

impl Transport for MockTransport {
    fn list(&mut self, path: &str) -> Result<Vec<ListingEntry>, TransportError> {
        self.record("list", path)?;
        self.state()
            .listings
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::NotADirectory(path.to_string()))
    }

    fn mkdir(&mut self, path: &str) -> Result<(), TransportError> {
        self.record("mkdir", path)
    }

    fn delete(&mut self, path: &str) -> Result<(), TransportError> {
        self.record("delete", path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), TransportError> {
        self.record("rename", &format!("{} {}", from, to))
    }

    fn get(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        self.record("get", path)?;
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::Failed(format!("no such file: {}", path)))
    }

    fn put(&mut self, path: &str, data: &[u8]) -> Result<(), TransportError> {
        self.record("put", path)?;
        self.state().files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn transcript(&self) -> String {
        self.state().last.clone()
    }
}
