//! Topology artifact: the portable, immutable form of a generated graph.
//!
//! The JSON layout is node-link style:
//!
//! ```json
//! {
//!   "directed": false,
//!   "multigraph": false,
//!   "graph": {},
//!   "nodes": [{ "id": "gossip-statefulset-0" }, ...],
//!   "edges": [{ "source": "...", "target": "...", "weight": 12.0 }, ...],
//!   "weight_average": 42.5,
//!   "total_edges": 17,
//!   "total_nodes": 10
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::graph::RawGraph;
use crate::types::{ModelParams, NodeName};

/// One undirected edge with its latency weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// One endpoint.
    pub source: NodeName,
    /// The other endpoint.
    pub target: NodeName,
    /// Latency in milliseconds.
    pub weight: f64,
    /// Any further attributes found on the edge.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Edge {
    /// Creates an edge with no extra attributes.
    #[must_use]
    pub fn new(source: impl Into<NodeName>, target: impl Into<NodeName>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an extra attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the endpoint opposite to `name`, if `name` is an endpoint.
    #[must_use]
    pub fn other_end(&self, name: &NodeName) -> Option<&NodeName> {
        if &self.source == name {
            Some(&self.target)
        } else if &self.target == name {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Aggregate statistics stored next to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopologyStats {
    /// Mean edge weight.
    pub weight_average: f64,
    /// Number of edges.
    pub total_edges: usize,
    /// Number of nodes.
    pub total_nodes: usize,
}

impl TopologyStats {
    /// Computes statistics for the given nodes and edges.
    #[must_use]
    pub fn compute(node_count: usize, edges: &[Edge]) -> Self {
        let weight_average = if edges.is_empty() {
            0.0
        } else {
            edges.iter().map(|e| e.weight).sum::<f64>() / edges.len() as f64
        };
        Self {
            weight_average,
            total_edges: edges.len(),
            total_nodes: node_count,
        }
    }
}

/// A serialized graph plus its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    #[serde(default)]
    graph: serde_json::Map<String, serde_json::Value>,
    #[serde(with = "node_list")]
    nodes: Vec<NodeName>,
    edges: Vec<Edge>,
    #[serde(flatten)]
    stats: TopologyStats,
}

/// Nodes are written as `{"id": name}` and read from either that form or a
/// bare string.
mod node_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::NodeName;

    #[derive(Serialize)]
    struct NodeRef<'a> {
        id: &'a NodeName,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NodeEntry {
        Object { id: NodeName },
        Bare(NodeName),
    }

    pub fn serialize<S>(nodes: &[NodeName], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(nodes.iter().map(|id| NodeRef { id }))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NodeName>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<NodeEntry> = Vec::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| match entry {
                NodeEntry::Object { id } | NodeEntry::Bare(id) => id,
            })
            .collect())
    }
}

impl Topology {
    /// Creates a topology from nodes and edges, computing its statistics.
    #[must_use]
    pub fn new(nodes: Vec<NodeName>, edges: Vec<Edge>) -> Self {
        let stats = TopologyStats::compute(nodes.len(), &edges);
        Self {
            directed: false,
            multigraph: false,
            graph: serde_json::Map::new(),
            nodes,
            edges,
            stats,
        }
    }

    /// Renames raw node ids to `<prefix>-<id>` and captures every edge.
    ///
    /// Node and edge order follow the graph's insertion order. Edges whose
    /// latency was never assigned are written with weight 0.
    #[must_use]
    pub fn from_graph(graph: &RawGraph, prefix: &str) -> Self {
        let nodes = graph
            .nodes()
            .map(|id| NodeName::indexed(prefix, id))
            .collect();
        let edges = graph
            .all_edges()
            .map(|(a, b, weight)| {
                Edge::new(
                    NodeName::indexed(prefix, a),
                    NodeName::indexed(prefix, b),
                    weight.unwrap_or_default(),
                )
            })
            .collect();
        Self::new(nodes, edges)
    }

    /// Returns the node names.
    #[must_use]
    pub fn nodes(&self) -> &[NodeName] {
        &self.nodes
    }

    /// Returns the edges in stored order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the stored statistics.
    #[must_use]
    pub const fn stats(&self) -> &TopologyStats {
        &self.stats
    }

    /// Returns true if `name` is one of the nodes.
    #[must_use]
    pub fn contains(&self, name: &NodeName) -> bool {
        self.nodes.contains(name)
    }

    /// Checks stored statistics against the graph.
    pub fn verify_stats(&self) -> Result<(), TopologyError> {
        let computed = TopologyStats::compute(self.nodes.len(), &self.edges);
        if computed.total_nodes != self.stats.total_nodes {
            return Err(TopologyError::StatsMismatch(format!(
                "total_nodes is {} but graph has {}",
                self.stats.total_nodes, computed.total_nodes
            )));
        }
        if computed.total_edges != self.stats.total_edges {
            return Err(TopologyError::StatsMismatch(format!(
                "total_edges is {} but graph has {}",
                self.stats.total_edges, computed.total_edges
            )));
        }
        if (computed.weight_average - self.stats.weight_average).abs() > 1e-9 {
            return Err(TopologyError::StatsMismatch(format!(
                "weight_average is {} but edges average {}",
                self.stats.weight_average, computed.weight_average
            )));
        }
        Ok(())
    }

    /// Encodes the artifact as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TopologyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Malformed`] if the input is not a valid artifact.
    pub fn from_json(input: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Builds the artifact file name: `nodes<N>_<timestamp>_<model><param>.json`.
///
/// The timestamp has second granularity, e.g. `Dec232024194653`.
#[must_use]
pub fn artifact_file_name<Tz>(node_count: usize, params: &ModelParams, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "nodes{node_count}_{}_{}{}.json",
        at.format("%b%d%Y%H%M%S"),
        params.model(),
        params.parameter_label()
    )
}
