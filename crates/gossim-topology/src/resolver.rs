//! Neighbor resolution against a loaded topology.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::artifact::{Edge, Topology};
use crate::error::TopologyError;
use crate::types::NodeName;

/// Edge attribute treated as the authoritative latency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatencySource {
    /// The edge's `weight`.
    #[default]
    Weight,
    /// A named extra attribute on the edge.
    Attribute(String),
}

impl LatencySource {
    /// Reads this latency from an edge.
    #[must_use]
    pub fn read(&self, edge: &Edge) -> Option<f64> {
        match self {
            Self::Weight => Some(edge.weight),
            Self::Attribute(key) => edge.attributes.get(key).and_then(serde_json::Value::as_f64),
        }
    }

    /// Name of the attribute.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Weight => "weight",
            Self::Attribute(key) => key,
        }
    }
}

impl fmt::Display for LatencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LatencySource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "weight" {
            Ok(Self::Weight)
        } else {
            Ok(Self::Attribute(s.to_string()))
        }
    }
}

/// A neighbor and the latency of the edge leading to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Neighbor name.
    pub name: NodeName,
    /// Edge latency in milliseconds.
    pub latency_ms: f64,
}

/// Resolves neighbors using edge weights as latency.
///
/// Entries follow the stored edge order. Self-edges produce nothing and an
/// unknown or isolated identity yields an empty list.
#[must_use]
pub fn resolve_neighbors(identity: &NodeName, topology: &Topology) -> Vec<Neighbor> {
    topology
        .edges()
        .iter()
        .filter_map(|edge| neighbor_of(identity, edge).map(|name| (name, edge.weight)))
        .map(|(name, latency_ms)| Neighbor {
            name: name.clone(),
            latency_ms,
        })
        .collect()
}

/// Resolves neighbors reading latency from `source`.
///
/// # Errors
///
/// Returns [`TopologyError::MissingLatency`] if a matching edge lacks a
/// numeric value for the selected attribute.
pub fn resolve_neighbors_with(
    identity: &NodeName,
    topology: &Topology,
    source: &LatencySource,
) -> Result<Vec<Neighbor>, TopologyError> {
    let mut neighbors = Vec::new();
    for edge in topology.edges() {
        let Some(name) = neighbor_of(identity, edge) else {
            continue;
        };
        let latency_ms = source.read(edge).ok_or_else(|| TopologyError::MissingLatency {
            attribute: source.name().to_string(),
            source_node: edge.source.clone(),
            target_node: edge.target.clone(),
        })?;
        neighbors.push(Neighbor {
            name: name.clone(),
            latency_ms,
        });
    }
    Ok(neighbors)
}

fn neighbor_of<'a>(identity: &NodeName, edge: &'a Edge) -> Option<&'a NodeName> {
    if edge.source == edge.target {
        return None;
    }
    edge.other_end(identity)
}
