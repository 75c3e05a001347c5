//! # gossim-topology
//!
//! Synthetic network topologies for gossip simulations.
//!
//! This crate provides:
//!
//! - Connected graph generation for the preferential-attachment (`BA`) and
//!   random-edge-probability (`ER`) models
//! - Per-edge latency assignment
//! - The JSON topology artifact and a directory-backed store for it
//! - Neighbor resolution for a node identity
//!
//! ## Core Types
//!
//! - [`TopologyGenerator`]: Builds a [`Topology`] from a [`GeneratorConfig`]
//! - [`Topology`]: Nodes, weighted edges and aggregate [`TopologyStats`]
//! - [`TopologyStore`]: Saves, loads and looks up artifacts
//! - [`Neighbor`]: One entry of a node's neighbor set

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod generator;
pub mod graph;
pub mod latency;
pub mod resolver;
pub mod store;
pub mod types;

pub use artifact::{artifact_file_name, Edge, Topology, TopologyStats};
pub use error::{GenerateError, TopologyError};
pub use generator::TopologyGenerator;
pub use graph::RawGraph;
pub use latency::assign_latency;
pub use resolver::{resolve_neighbors, resolve_neighbors_with, LatencySource, Neighbor};
pub use store::{TopologyStore, DEFAULT_TOPOLOGY_DIR};
pub use types::{
    GeneratorConfig, LatencyRange, Model, ModelParams, NodeName, ParseModelError,
    DEFAULT_NODE_PREFIX,
};
