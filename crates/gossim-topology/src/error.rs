//! Error types for gossim-topology.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Model, NodeName};

/// Errors raised while generating a topology.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// The requested parameters can never produce a valid topology.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No connected graph was produced within the allowed attempts.
    #[error("graph is not connected after {attempts} attempt(s)")]
    NotConnected {
        /// Number of construction attempts made.
        attempts: u32,
    },

    /// Realized average degree fell below the requested degree.
    #[error("average degree {realized:.3} is below target {target}")]
    DegreeBelowTarget {
        /// Average degree of the built graph.
        realized: f64,
        /// Requested degree.
        target: usize,
    },

    /// Rounded average degree differs from the rounded expected degree.
    #[error("rounded average degree {realized} does not match expected {expected}")]
    DegreeMismatch {
        /// Rounded average degree of the repaired graph.
        realized: u64,
        /// Rounded `p * (n - 1)`.
        expected: u64,
    },
}

impl GenerateError {
    /// Returns true for configuration errors, which retrying cannot fix.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}

/// Errors raised while persisting, loading or reading a topology artifact.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// No artifact matches the requested node count and model.
    #[error("no topology artifact for {node_count} nodes ({model}) in {dir}")]
    NotFound {
        /// Directory that was searched.
        dir: PathBuf,
        /// Requested node count.
        node_count: usize,
        /// Requested model.
        model: Model,
    },

    /// The artifact could not be decoded.
    #[error("malformed topology artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// IO error.
    #[error("io error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The selected latency attribute is missing or not numeric on an edge.
    #[error("edge {source_node} -- {target_node} has no numeric '{attribute}' attribute")]
    MissingLatency {
        /// Attribute that was requested.
        attribute: String,
        /// One endpoint.
        source_node: NodeName,
        /// The other endpoint.
        target_node: NodeName,
    },

    /// Stored aggregate statistics disagree with the graph.
    #[error("stored statistics do not match graph: {0}")]
    StatsMismatch(String),
}

impl TopologyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
