//! Wire protocol definitions.
//!
//! - [`GossipMessage`]: one hop of a rumor between two nodes
//! - [`Acknowledgment`]: the receiver's human-readable reply

use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};

use gossim_topology::NodeName;
use serde::{Deserialize, Serialize};

/// Boxed future type for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Current wall-clock time in nanoseconds since the Unix epoch.
#[must_use]
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// A gossip message as carried on the wire.
///
/// Two messages with the same `message` content are the same rumor,
/// whatever path they took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GossipMessage {
    /// Payload.
    pub message: String,
    /// Node that sent this hop. Equal to the receiver when initiating.
    pub sender_id: NodeName,
    /// Send time of this hop in nanoseconds.
    pub timestamp: u64,
    /// Latency applied on this hop in milliseconds.
    pub latency_ms: f64,
    /// Send time of the initiating message in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_timestamp: Option<u64>,
}

impl GossipMessage {
    /// Creates the self-addressed message that starts a rumor at `origin`.
    #[must_use]
    pub fn originate(origin: NodeName, message: impl Into<String>) -> Self {
        let now = now_nanos();
        Self {
            message: message.into(),
            sender_id: origin,
            timestamp: now,
            latency_ms: 0.0,
            origin_timestamp: Some(now),
        }
    }

    /// Creates the next hop of this rumor, sent by `sender` over an edge with
    /// `latency_ms`. The hop timestamp is filled in by [`Self::stamped`].
    #[must_use]
    pub fn forward(&self, sender: NodeName, latency_ms: f64) -> Self {
        Self {
            message: self.message.clone(),
            sender_id: sender,
            timestamp: 0,
            latency_ms,
            origin_timestamp: Some(self.origin()),
        }
    }

    /// Sets the hop send time.
    #[must_use]
    pub const fn stamped(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Origination time, falling back to this hop's timestamp for peers that
    /// do not carry one.
    #[must_use]
    pub fn origin(&self) -> u64 {
        self.origin_timestamp.unwrap_or(self.timestamp)
    }
}

/// Reply to a [`GossipMessage`].
///
/// Carries only a status string. A failed call, not the content, signals an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    /// Status text.
    pub details: String,
}

impl Acknowledgment {
    /// Creates an acknowledgment.
    #[must_use]
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let message = GossipMessage {
            message: "hello".to_string(),
            sender_id: "n-1".into(),
            timestamp: 42,
            latency_ms: 12.5,
            origin_timestamp: None,
        };
        let value = serde_json::to_value(&message).expect("encode");
        assert_eq!(value["message"], "hello");
        assert_eq!(value["sender_id"], "n-1");
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["latency_ms"], 12.5);
        assert!(value.get("origin_timestamp").is_none());
    }

    #[test]
    fn origin_timestamp_is_optional_on_decode() {
        let json = r#"{"message":"m","sender_id":"a","timestamp":7,"latency_ms":0}"#;
        let message: GossipMessage = serde_json::from_str(json).expect("decode");
        assert_eq!(message.origin(), 7);
    }

    #[test]
    fn forward_keeps_payload_and_origin() {
        let first = GossipMessage::originate("a".into(), "rumor");
        let hop = first.forward("b".into(), 15.0).stamped(99);

        assert_eq!(hop.message, "rumor");
        assert_eq!(hop.sender_id.as_str(), "b");
        assert_eq!(hop.timestamp, 99);
        assert_eq!(hop.origin(), first.timestamp);
        assert!((hop.latency_ms - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_moves_forward() {
        let a = now_nanos();
        let b = now_nanos();
        assert!(b >= a);
        assert!(a > 0);
    }
}
