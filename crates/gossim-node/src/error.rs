//! Error types for gossim-node.

use gossim_topology::{NodeName, TopologyError};
use thiserror::Error;

/// Errors raised while delivering a message to a peer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer could not be reached.
    #[error("peer {address} unreachable: {reason}")]
    Unreachable {
        /// Address that was dialed.
        address: String,
        /// Why the connection failed.
        reason: String,
    },

    /// The connection closed before an acknowledgment arrived.
    #[error("connection to {0} closed before acknowledgment")]
    Closed(String),

    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a peer directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No address is known for the node.
    #[error("no address known for {0}")]
    UnknownNode(NodeName),

    /// A label selector could not be parsed.
    #[error("invalid label selector '{0}', expected key=value")]
    InvalidSelector(String),

    /// The directory source could not be read.
    #[error("failed to read directory: {0}")]
    Source(String),
}

/// Errors that can occur in node operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The node's identity does not appear in the topology.
    #[error("node {0} is not part of the topology")]
    UnknownIdentity(NodeName),

    /// Topology lookup, decode or resolution failed.
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Peer lookup failed.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Message delivery failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Binding or accepting on the listen address failed.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Requested listen address.
        address: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
