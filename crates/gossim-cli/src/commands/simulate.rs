//! `simulate` command.

use std::io::Write;
use std::time::Duration;

use gossim_node::{Cluster, NodeOptions, RunSummary};
use gossim_topology::{NodeName, TopologyStore};
use serde::Serialize;
use tracing::info;

use super::load_topology;
use crate::cli::SimulateArgs;
use crate::error::{CliError, CliResult};

#[derive(Serialize)]
struct SummaryLine<'a> {
    message: &'a str,
    origin: &'a str,
    nodes: usize,
    reached: usize,
    duplicates: usize,
    max_since_origin_ms: f64,
}

/// Runs a whole topology in process and reports the spread of one rumor.
#[derive(Debug, Clone)]
pub struct SimulateCommand {
    store: TopologyStore,
}

impl SimulateCommand {
    /// Creates the command reading topologies from `store`.
    #[must_use]
    pub const fn new(store: TopologyStore) -> Self {
        Self { store }
    }

    /// Runs the simulation, printing every event and then the summary as
    /// JSON lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology cannot be loaded, is empty, or the
    /// origin is not part of it.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &SimulateArgs) -> CliResult<RunSummary> {
        let topology = load_topology(&args.topology, &self.store)?;
        let origin = match &args.origin {
            Some(name) => NodeName::new(name.clone()),
            None => topology
                .nodes()
                .first()
                .cloned()
                .ok_or_else(|| CliError::InvalidArgument("topology has no nodes".to_string()))?,
        };

        let options = NodeOptions {
            latency_source: args.latency_option.clone(),
            ..NodeOptions::default()
        };
        let mut cluster = Cluster::from_topology(topology, &options)?;
        cluster.initiate(&origin, args.message.clone()).await?;
        let events = cluster
            .collect_events(Duration::from_millis(args.quiet_ms))
            .await;

        for event in &events {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        }

        let summary = RunSummary::from_events(&events, &args.message);
        info!(
            reached = summary.reached,
            nodes = cluster.len(),
            duplicates = summary.duplicates,
            "simulation finished"
        );
        let line = SummaryLine {
            message: &args.message,
            origin: origin.as_str(),
            nodes: cluster.len(),
            reached: summary.reached,
            duplicates: summary.duplicates,
            max_since_origin_ms: summary.max_since_origin_ms,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
        Ok(summary)
    }
}
