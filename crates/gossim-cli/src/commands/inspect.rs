//! `inspect` command.

use std::io::Write;

use gossim_topology::{resolve_neighbors_with, Neighbor, NodeName, TopologyStats, TopologyStore};
use serde::Serialize;

use super::load_topology;
use crate::cli::InspectArgs;
use crate::error::CliResult;

/// Report printed by `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Stored statistics.
    #[serde(flatten)]
    pub stats: TopologyStats,
    /// Whether the stored statistics match the nodes and edges.
    pub stats_consistent: bool,
    /// Neighbors of the requested node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<Vec<Neighbor>>,
}

/// Prints a topology's statistics and optionally one node's neighbors.
#[derive(Debug, Clone)]
pub struct InspectCommand {
    store: TopologyStore,
}

impl InspectCommand {
    /// Creates the command reading topologies from `store`.
    #[must_use]
    pub const fn new(store: TopologyStore) -> Self {
        Self { store }
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology cannot be loaded or the selected
    /// latency attribute is missing on the node's edges.
    pub fn execute<W: Write>(&self, out: &mut W, args: &InspectArgs) -> CliResult<InspectReport> {
        let topology = load_topology(&args.topology, &self.store)?;
        let neighbors = args
            .node
            .as_ref()
            .map(|name| {
                resolve_neighbors_with(&NodeName::new(name.clone()), &topology, &args.latency_option)
            })
            .transpose()?;

        let report = InspectReport {
            stats: *topology.stats(),
            stats_consistent: topology.verify_stats().is_ok(),
            neighbors,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossim_topology::{Edge, LatencySource, Topology};

    use crate::cli::TopologyArgs;
    use crate::error::CliError;

    fn fixture() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().expect("tempdir");
        let topology = Topology::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                Edge::new("a", "b", 4.0).with_attribute("rtt", 9.0),
                Edge::new("c", "a", 6.0),
            ],
        );
        let path = dir.path().join("t.json");
        std::fs::write(&path, topology.to_json().expect("encode")).expect("write");
        (dir, path.display().to_string())
    }

    fn args(file: String, node: Option<&str>, latency_option: LatencySource) -> InspectArgs {
        InspectArgs {
            node: node.map(ToString::to_string),
            latency_option,
            topology: TopologyArgs {
                file: Some(file),
                ..TopologyArgs::default()
            },
        }
    }

    #[test]
    fn reports_stats_and_neighbors() {
        let (dir, file) = fixture();
        let mut out = Vec::new();
        let report = InspectCommand::new(TopologyStore::new(dir.path()))
            .execute(&mut out, &args(file, Some("a"), LatencySource::Weight))
            .expect("inspect");

        assert_eq!(report.stats.total_nodes, 3);
        assert_eq!(report.stats.total_edges, 2);
        assert!(report.stats_consistent);
        let neighbors = report.neighbors.expect("neighbors");
        let names: Vec<&str> = neighbors.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        let printed: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(printed["total_nodes"], 3);
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let (dir, file) = fixture();
        let mut out = Vec::new();
        let result = InspectCommand::new(TopologyStore::new(dir.path())).execute(
            &mut out,
            &args(file, Some("a"), LatencySource::Attribute("rtt".to_string())),
        );
        assert!(matches!(result, Err(CliError::Topology(_))));
    }
}
