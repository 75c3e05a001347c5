//! # gossim-node
//!
//! Runtime for one gossip simulation participant.
//!
//! A node receives a rumor, records what happened as a [`GossipEvent`], and
//! forwards first arrivals to its topology neighbors after each edge's
//! latency. Duplicates are recorded and dropped.
//!
//! ## Core Types
//!
//! - [`GossipNode`]: Dissemination state machine
//! - [`GossipServer`]: TCP listener feeding a node
//! - [`PeerDirectory`]: Name-to-address lookups ([`StaticDirectory`])
//! - [`GossipTransport`]: Message delivery ([`TcpTransport`], [`MemoryTransport`])
//! - [`Cluster`]: Every node of a topology in one process

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod directory;
pub mod error;
pub mod event;
pub mod node;
pub mod protocol;
pub mod seen;
pub mod server;
pub mod transport;

pub use cluster::{Cluster, RunSummary};
pub use directory::{LabelSelector, PeerDirectory, PeerEntry, StaticDirectory, DEFAULT_SELECTOR};
pub use error::{DirectoryError, NodeError, TransportError};
pub use event::{EventKind, GossipEvent};
pub use node::{initiate, GossipNode, NodeOptions, NodeState, Peer, EVENT_TARGET};
pub use protocol::{now_nanos, Acknowledgment, BoxFuture, GossipMessage};
pub use seen::SeenMessages;
pub use server::GossipServer;
pub use transport::{frame_codec, GossipTransport, MemoryTransport, TcpTransport};
