//! Peer directory: maps node names to network addresses.
//!
//! The gossip node only needs two lookups, expressed by [`PeerDirectory`].
//! [`StaticDirectory`] serves them from a fixed table, loaded from a JSON
//! file or registered in code.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use gossim_topology::NodeName;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DirectoryError;
use crate::protocol::BoxFuture;

/// Default selector for simulation peers.
pub const DEFAULT_SELECTOR: &str = "app=bcgossip";

/// A known peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEntry {
    /// Node name.
    pub name: NodeName,
    /// Address the node listens on.
    pub address: String,
    /// Labels used for selection.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl PeerEntry {
    /// Creates an entry without labels.
    #[must_use]
    pub fn new(name: impl Into<NodeName>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Equality selector over peer labels, written `key=value`.
///
/// An empty selector matches every peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirement: Option<(String, String)>,
}

impl LabelSelector {
    /// Selector matching every peer.
    #[must_use]
    pub const fn any() -> Self {
        Self { requirement: None }
    }

    /// Selector requiring `key` to equal `value`.
    #[must_use]
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            requirement: Some((key.into(), value.into())),
        }
    }

    /// Returns true if `labels` satisfy the selector.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match &self.requirement {
            None => true,
            Some((key, value)) => labels.get(key) == Some(value),
        }
    }
}

impl FromStr for LabelSelector {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::any());
        }
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(Self::equals(key.trim(), value.trim()))
            }
            _ => Err(DirectoryError::InvalidSelector(s.to_string())),
        }
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requirement {
            None => Ok(()),
            Some((key, value)) => write!(f, "{key}={value}"),
        }
    }
}

/// Name-to-address lookups.
///
/// Implementations may include the caller in [`Self::list_peers`]; the node
/// filters itself out.
pub trait PeerDirectory: Send + Sync {
    /// Resolves one node's address.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UnknownNode`] if the node is not known.
    fn resolve_address<'a>(&'a self, name: &'a NodeName) -> BoxFuture<'a, Result<String, DirectoryError>>;

    /// Lists every running peer matching `selector`.
    fn list_peers<'a>(
        &'a self,
        selector: &'a LabelSelector,
    ) -> BoxFuture<'a, Result<Vec<PeerEntry>, DirectoryError>>;
}

#[derive(Deserialize)]
struct DirectoryFile {
    peers: Vec<PeerEntry>,
}

/// Directory backed by a fixed table.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: RwLock<Vec<PeerEntry>>,
}

impl StaticDirectory {
    /// Creates a directory from entries.
    #[must_use]
    pub fn new(entries: Vec<PeerEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Loads `{"peers": [{"name", "address", "labels"}]}` from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DirectoryError::Source(format!("{}: {e}", path.display())))?;
        let file: DirectoryFile = serde_json::from_str(&content)
            .map_err(|e| DirectoryError::Source(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), peers = file.peers.len(), "loaded peer directory");
        Ok(Self::new(file.peers))
    }

    /// Adds or replaces the entry for `entry.name`.
    pub fn register(&self, entry: PeerEntry) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PeerDirectory for StaticDirectory {
    fn resolve_address<'a>(&'a self, name: &'a NodeName) -> BoxFuture<'a, Result<String, DirectoryError>> {
        let result = self
            .entries
            .read()
            .iter()
            .find(|e| &e.name == name)
            .map(|e| e.address.clone())
            .ok_or_else(|| DirectoryError::UnknownNode(name.clone()));
        Box::pin(async move { result })
    }

    fn list_peers<'a>(
        &'a self,
        selector: &'a LabelSelector,
    ) -> BoxFuture<'a, Result<Vec<PeerEntry>, DirectoryError>> {
        let peers: Vec<PeerEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| selector.matches(&e.labels))
            .cloned()
            .collect();
        Box::pin(async move { Ok(peers) })
    }
}
