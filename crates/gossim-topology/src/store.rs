//! Directory-backed storage for topology artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tracing::{debug, info};

use crate::artifact::{artifact_file_name, Topology};
use crate::error::TopologyError;
use crate::types::{Model, ModelParams};

/// Default directory artifacts are written to, relative to the working directory.
pub const DEFAULT_TOPOLOGY_DIR: &str = "topology";

/// Reads and writes artifacts in one directory.
#[derive(Debug, Clone)]
pub struct TopologyStore {
    dir: PathBuf,
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOPOLOGY_DIR)
    }
}

impl TopologyStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `topology` under a name derived from its size, model and the
    /// current local time. Returns the written path.
    pub fn save(&self, topology: &Topology, params: &ModelParams) -> Result<PathBuf, TopologyError> {
        fs::create_dir_all(&self.dir).map_err(|e| TopologyError::io(&self.dir, e))?;

        let name = artifact_file_name(topology.nodes().len(), params, &Local::now());
        let path = self.dir.join(name);
        fs::write(&path, topology.to_json()?).map_err(|e| TopologyError::io(&path, e))?;

        info!(path = %path.display(), "topology saved");
        Ok(path)
    }

    /// Loads an artifact from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Io`] if the file cannot be read and
    /// [`TopologyError::Malformed`] if it cannot be decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Topology, TopologyError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TopologyError::io(path, e))?;
        let topology = Topology::from_json(&content)?;
        debug!(
            path = %path.display(),
            nodes = topology.stats().total_nodes,
            edges = topology.stats().total_edges,
            "topology loaded"
        );
        Ok(topology)
    }

    /// Loads an artifact by file name from this store.
    pub fn open(&self, file_name: &str) -> Result<Topology, TopologyError> {
        Self::load(self.dir.join(file_name))
    }

    /// Finds the most recently written artifact for a node count and model.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotFound`] when nothing matches.
    pub fn find_latest(&self, node_count: usize, model: Model) -> Result<PathBuf, TopologyError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| TopologyError::io(&self.dir, e))?;

        let mut best: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(|e| TopologyError::io(&self.dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !matches_artifact(file_name, node_count, model) {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let path = entry.path();
            let newer = match &best {
                Some((time, current)) => modified > *time || (modified == *time && path > *current),
                None => true,
            };
            if newer {
                best = Some((modified, path));
            }
        }

        best.map(|(_, path)| path).ok_or_else(|| TopologyError::NotFound {
            dir: self.dir.clone(),
            node_count,
            model,
        })
    }
}

/// Matches `nodes<N>_<timestamp>_<model><param>.json`.
fn matches_artifact(file_name: &str, node_count: usize, model: Model) -> bool {
    let Some(rest) = file_name
        .strip_prefix(&format!("nodes{node_count}_"))
        .and_then(|rest| rest.strip_suffix(".json"))
    else {
        return false;
    };
    match rest.split_once('_') {
        Some((timestamp, tail)) => !timestamp.is_empty() && tail.starts_with(model.as_str()),
        None => false,
    }
}
