//! Structured records of what a node did with each message.

use std::fmt;

use gossim_topology::NodeName;
use serde::{Deserialize, Serialize};

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The node originated the rumor.
    Initiate,
    /// The rumor had already been processed.
    Duplicate,
    /// First arrival of the rumor from another node.
    Received,
}

impl EventKind {
    /// Returns true for events that trigger fan-out.
    #[must_use]
    pub const fn disseminates(&self) -> bool {
        matches!(self, Self::Initiate | Self::Received)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiate => write!(f, "initiate"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::Received => write!(f, "received"),
        }
    }
}

/// One event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GossipEvent {
    /// Payload.
    pub message: String,
    /// Node that delivered the message.
    pub sender_id: NodeName,
    /// Node that handled it.
    pub receiver_id: NodeName,
    /// Receive time in nanoseconds.
    pub received_timestamp: u64,
    /// Hop propagation time in milliseconds; only set for `received`.
    pub propagation_time: Option<f64>,
    /// Time since origination in milliseconds; only set for `received`.
    pub since_origin_ms: Option<f64>,
    /// Latency that was applied on the delivering hop.
    pub latency_ms: f64,
    /// Outcome.
    pub event_type: EventKind,
    /// Human-readable summary.
    pub detail: String,
}
