//! Gossip node and its dissemination state machine.
//!
//! On each inbound [`GossipMessage`] the node:
//!
//! 1. stamps the receive time;
//! 2. if it sent the message to itself, records `initiate`, marks the
//!    payload seen and fans out;
//! 3. else if the payload was seen before, records `duplicate` and stops;
//! 4. else computes the hop propagation time, marks the payload seen,
//!    records `received` and fans out.
//!
//! Fan-out sends to every neighbor except the one the message came from.
//! Each edge runs as its own task: it waits for the edge latency, then calls
//! the peer. Failures are logged and dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use gossim_topology::{resolve_neighbors_with, LatencySource, NodeName, Topology};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::directory::{LabelSelector, PeerDirectory};
use crate::error::NodeError;
use crate::event::{EventKind, GossipEvent};
use crate::protocol::{now_nanos, Acknowledgment, GossipMessage};
use crate::seen::SeenMessages;
use crate::transport::GossipTransport;

/// Tracing target for event records.
pub const EVENT_TARGET: &str = "gossim::event";

/// Whether the node is handling a message right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No message in progress.
    Idle,
    /// At least one message is being handled.
    Processing,
}

/// A neighbor with a resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    /// Neighbor name.
    pub name: NodeName,
    /// Address from the directory.
    pub address: String,
    /// Edge latency in milliseconds.
    pub latency_ms: f64,
}

/// Options for [`GossipNode::new`].
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Edge attribute used as latency.
    pub latency_source: LatencySource,
    /// Selector passed to the directory when listing peers.
    pub selector: LabelSelector,
}

/// One simulation participant.
pub struct GossipNode {
    identity: NodeName,
    topology: Arc<Topology>,
    options: NodeOptions,
    directory: Arc<dyn PeerDirectory>,
    transport: Arc<dyn GossipTransport>,
    seen: SeenMessages,
    neighbors: RwLock<Vec<Peer>>,
    events: Option<mpsc::UnboundedSender<GossipEvent>>,
    in_flight: AtomicUsize,
}

impl std::fmt::Debug for GossipNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GossipNode")
            .field("identity", &self.identity)
            .field("options", &self.options)
            .field("seen", &self.seen.len())
            .field("neighbors", &self.neighbors.read().len())
            .finish_non_exhaustive()
    }
}

impl GossipNode {
    /// Creates a node for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownIdentity`] if `identity` is not in the
    /// topology, or a topology error if the latency attribute cannot be read
    /// from this node's edges.
    pub fn new(
        identity: NodeName,
        topology: Arc<Topology>,
        directory: Arc<dyn PeerDirectory>,
        transport: Arc<dyn GossipTransport>,
        options: NodeOptions,
    ) -> Result<Self, NodeError> {
        if !topology.contains(&identity) {
            return Err(NodeError::UnknownIdentity(identity));
        }
        let neighbors = resolve_neighbors_with(&identity, &topology, &options.latency_source)?;
        if neighbors.is_empty() {
            warn!(node = %identity, "node has no neighbors in topology");
        }

        Ok(Self {
            identity,
            topology,
            options,
            directory,
            transport,
            seen: SeenMessages::new(),
            neighbors: RwLock::new(Vec::new()),
            events: None,
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Sends every event record to `sink` as well as to the log.
    #[must_use]
    pub fn with_event_sink(mut self, sink: mpsc::UnboundedSender<GossipEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Returns the node's name.
    #[must_use]
    pub const fn identity(&self) -> &NodeName {
        &self.identity
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> NodeState {
        if self.in_flight.load(Ordering::Acquire) == 0 {
            NodeState::Idle
        } else {
            NodeState::Processing
        }
    }

    /// Returns true if `payload` has been processed.
    #[must_use]
    pub fn has_seen(&self, payload: &str) -> bool {
        self.seen.contains(payload)
    }

    /// Number of distinct payloads processed.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Returns the cached neighbor list.
    #[must_use]
    pub fn cached_neighbors(&self) -> Vec<Peer> {
        self.neighbors.read().clone()
    }

    /// Re-resolves neighbors against the topology and directory and replaces
    /// the cache.
    ///
    /// Neighbors the directory does not list are left out.
    pub async fn refresh_neighbors(&self) -> Result<Vec<Peer>, NodeError> {
        let resolved =
            resolve_neighbors_with(&self.identity, &self.topology, &self.options.latency_source)?;
        let listed = self.directory.list_peers(&self.options.selector).await?;

        let mut peers = Vec::with_capacity(resolved.len());
        for neighbor in resolved {
            let entry = listed
                .iter()
                .find(|e| e.name == neighbor.name && e.name != self.identity);
            match entry {
                Some(entry) => peers.push(Peer {
                    name: neighbor.name,
                    address: entry.address.clone(),
                    latency_ms: neighbor.latency_ms,
                }),
                None => debug!(node = %self.identity, neighbor = %neighbor.name, "neighbor not listed in directory"),
            }
        }

        debug!(node = %self.identity, peers = peers.len(), "neighbors refreshed");
        *self.neighbors.write() = peers.clone();
        Ok(peers)
    }

    async fn neighbors(&self) -> Vec<Peer> {
        let cached = self.cached_neighbors();
        if !cached.is_empty() {
            return cached;
        }
        match self.refresh_neighbors().await {
            Ok(peers) => peers,
            Err(e) => {
                warn!(node = %self.identity, error = %e, "failed to resolve neighbors");
                Vec::new()
            }
        }
    }

    /// Handles one inbound message and returns the acknowledgment.
    ///
    /// Fan-out is started before returning but not awaited.
    pub async fn handle_message(&self, message: GossipMessage) -> Acknowledgment {
        let _guard = InFlight::enter(&self.in_flight);
        let received_timestamp = now_nanos();
        let from_self = message.sender_id == self.identity;
        let kind = self.seen.observe(&message.message, from_self);

        let (propagation_time, since_origin_ms, detail, ack) = match kind {
            EventKind::Initiate => {
                let at = Local
                    .timestamp_nanos(i64::try_from(received_timestamp).unwrap_or(i64::MAX))
                    .format("%Y-%m-%d %H:%M:%S");
                (
                    None,
                    None,
                    format!("Gossip initiated by {} at {at}", self.identity),
                    format!("Done propagate! {} received: '{}'", self.identity, message.message),
                )
            }
            EventKind::Duplicate => (
                None,
                None,
                format!(
                    "{} ignoring duplicate message: {} from {}",
                    self.identity, message.message, message.sender_id
                ),
                format!("Duplicate message ignored by ({})", self.identity),
            ),
            EventKind::Received => {
                let propagation = elapsed_ms(message.timestamp, received_timestamp);
                let since_origin = elapsed_ms(message.origin(), received_timestamp);
                (
                    Some(propagation),
                    Some(since_origin),
                    format!(
                        "{} received: '{}' from {} in {propagation:.2} ms",
                        self.identity, message.message, message.sender_id
                    ),
                    format!("{} received: '{}'", self.identity, message.message),
                )
            }
        };

        self.emit(GossipEvent {
            message: message.message.clone(),
            sender_id: message.sender_id.clone(),
            receiver_id: self.identity.clone(),
            received_timestamp,
            propagation_time,
            since_origin_ms,
            latency_ms: message.latency_ms,
            event_type: kind,
            detail,
        });

        if kind.disseminates() {
            self.fan_out(&message).await;
        }

        Acknowledgment::new(ack)
    }

    async fn fan_out(&self, message: &GossipMessage) {
        let peers = self.neighbors().await;
        for peer in peers {
            if peer.name == message.sender_id {
                continue;
            }

            let transport = Arc::clone(&self.transport);
            let outbound = message.forward(self.identity.clone(), peer.latency_ms);
            let sender = self.identity.clone();

            tokio::spawn(async move {
                let outbound = outbound.stamped(now_nanos());
                let delay = Duration::try_from_secs_f64(peer.latency_ms / 1000.0).unwrap_or_default();
                tokio::time::sleep(delay).await;

                match transport.send(&peer.address, outbound).await {
                    Ok(ack) => debug!(
                        node = %sender,
                        peer = %peer.name,
                        details = %ack.details,
                        "forwarded"
                    ),
                    Err(e) => warn!(
                        node = %sender,
                        peer = %peer.name,
                        address = %peer.address,
                        error = %e,
                        "failed to forward message"
                    ),
                }
            });
        }
    }

    fn emit(&self, event: GossipEvent) {
        match serde_json::to_string(&event) {
            Ok(record) => info!(target: EVENT_TARGET, %record, "{}", event.detail),
            Err(e) => warn!(error = %e, "failed to encode event record"),
        }
        if let Some(sink) = &self.events {
            // receiver gone means nobody is collecting
            let _ = sink.send(event);
        }
    }
}

fn elapsed_ms(from: u64, to: u64) -> f64 {
    to.saturating_sub(from) as f64 / 1e6
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Starts a rumor at `origin` by sending it a self-addressed message.
///
/// # Errors
///
/// Returns an error if `origin` cannot be resolved or reached.
pub async fn initiate(
    directory: &dyn PeerDirectory,
    transport: &dyn GossipTransport,
    origin: &NodeName,
    payload: impl Into<String>,
) -> Result<Acknowledgment, NodeError> {
    let address = directory.resolve_address(origin).await?;
    let message = GossipMessage::originate(origin.clone(), payload);
    info!(node = %origin, address = %address, payload = %message.message, "initiating gossip");
    Ok(transport.send(&address, message).await?)
}
