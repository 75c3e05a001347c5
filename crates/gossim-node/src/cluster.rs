//! In-process cluster: one [`GossipNode`] per topology node, wired through
//! [`MemoryTransport`] and a shared [`StaticDirectory`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use gossim_topology::{NodeName, Topology};
use tokio::sync::mpsc;
use tracing::info;

use crate::directory::{LabelSelector, PeerEntry, StaticDirectory};
use crate::error::NodeError;
use crate::event::{EventKind, GossipEvent};
use crate::node::{initiate, GossipNode, NodeOptions};
use crate::protocol::Acknowledgment;
use crate::transport::MemoryTransport;

/// Address scheme used for in-process nodes.
const MEMORY_SCHEME: &str = "mem://";

/// All nodes of a topology running in one process.
pub struct Cluster {
    nodes: BTreeMap<NodeName, Arc<GossipNode>>,
    directory: Arc<StaticDirectory>,
    transport: Arc<MemoryTransport>,
    events: mpsc::UnboundedReceiver<GossipEvent>,
    max_latency: Duration,
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl Cluster {
    /// Starts a node for every node in `topology`.
    ///
    /// # Errors
    ///
    /// Returns an error if a node's latencies cannot be resolved.
    pub fn from_topology(topology: Topology, options: &NodeOptions) -> Result<Self, NodeError> {
        let topology = Arc::new(topology);
        let directory = Arc::new(StaticDirectory::default());
        let transport = Arc::new(MemoryTransport::new());
        let (tx, events) = mpsc::unbounded_channel();

        let node_options = NodeOptions {
            latency_source: options.latency_source.clone(),
            selector: LabelSelector::any(),
        };

        let max_latency_ms = topology
            .edges()
            .iter()
            .filter_map(|edge| options.latency_source.read(edge))
            .fold(0.0_f64, f64::max);
        let max_latency = Duration::try_from_secs_f64(max_latency_ms / 1000.0).unwrap_or_default();

        let mut nodes = BTreeMap::new();
        for name in topology.nodes() {
            let address = format!("{MEMORY_SCHEME}{name}");
            let node = Arc::new(
                GossipNode::new(
                    name.clone(),
                    Arc::clone(&topology),
                    directory.clone(),
                    transport.clone(),
                    node_options.clone(),
                )?
                .with_event_sink(tx.clone()),
            );
            directory.register(PeerEntry::new(name.clone(), address.clone()));
            transport.register(address, &node);
            nodes.insert(name.clone(), node);
        }

        info!(nodes = nodes.len(), edges = topology.edges().len(), "in-process cluster started");
        Ok(Self {
            nodes,
            directory,
            transport,
            events,
            max_latency,
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cluster has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node by name.
    #[must_use]
    pub fn node(&self, name: &NodeName) -> Option<&Arc<GossipNode>> {
        self.nodes.get(name)
    }

    /// Makes `name` unreachable for every other node.
    pub fn disconnect(&self, name: &NodeName) {
        self.transport.unregister(&format!("{MEMORY_SCHEME}{name}"));
    }

    /// Starts a rumor at `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` is not part of the cluster.
    pub async fn initiate(
        &self,
        origin: &NodeName,
        payload: impl Into<String>,
    ) -> Result<Acknowledgment, NodeError> {
        initiate(self.directory.as_ref(), self.transport.as_ref(), origin, payload).await
    }

    /// Largest edge latency in the topology.
    #[must_use]
    pub const fn max_latency(&self) -> Duration {
        self.max_latency
    }

    /// Quiet window of at least `minimum` and never shorter than two hops
    /// over the slowest edge.
    #[must_use]
    pub fn settle_window(&self, minimum: Duration) -> Duration {
        minimum.max(self.max_latency.saturating_mul(2))
    }

    /// Collects events until none arrives for the [`settle_window`] of
    /// `quiet`.
    ///
    /// [`settle_window`]: Self::settle_window
    pub async fn collect_events(&mut self, quiet: Duration) -> Vec<GossipEvent> {
        let quiet = self.settle_window(quiet);
        let mut collected = Vec::new();
        while let Ok(Some(event)) = tokio::time::timeout(quiet, self.events.recv()).await {
            collected.push(event);
        }
        collected
    }
}

/// Per-rumor summary of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Nodes that got the rumor, including the origin.
    pub reached: usize,
    /// Duplicate deliveries.
    pub duplicates: usize,
    /// Largest time since origination among `received` events, in ms.
    pub max_since_origin_ms: f64,
}

impl RunSummary {
    /// Summarizes the events for `payload`.
    #[must_use]
    pub fn from_events(events: &[GossipEvent], payload: &str) -> Self {
        let mut summary = Self {
            reached: 0,
            duplicates: 0,
            max_since_origin_ms: 0.0,
        };
        for event in events.iter().filter(|e| e.message == payload) {
            match event.event_type {
                EventKind::Initiate => summary.reached += 1,
                EventKind::Received => {
                    summary.reached += 1;
                    let since = event.since_origin_ms.unwrap_or_default();
                    summary.max_since_origin_ms = summary.max_since_origin_ms.max(since);
                }
                EventKind::Duplicate => summary.duplicates += 1,
            }
        }
        summary
    }
}
