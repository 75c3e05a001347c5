//! Message delivery between nodes.
//!
//! - [`TcpTransport`]: one TCP connection per call, length-delimited JSON frames
//! - [`MemoryTransport`]: direct calls into in-process nodes

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::error::TransportError;
use crate::node::GossipNode;
use crate::protocol::{Acknowledgment, BoxFuture, GossipMessage};

/// Delivers a message to the node listening at an address.
pub trait GossipTransport: Send + Sync {
    /// Sends `message` to `address` and waits for the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer cannot be reached or replies with an
    /// undecodable frame.
    fn send<'a>(
        &'a self,
        address: &'a str,
        message: GossipMessage,
    ) -> BoxFuture<'a, Result<Acknowledgment, TransportError>>;
}

/// Builds the frame codec shared by client and server.
#[must_use]
pub fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(TcpTransport::MAX_FRAME_LENGTH)
        .new_codec()
}

/// TCP transport.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TcpTransport {
    /// Largest accepted frame.
    pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

    /// Creates a transport with the default connect timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    async fn request(&self, address: &str, message: &GossipMessage) -> Result<Acknowledgment, TransportError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| TransportError::Unreachable {
                address: address.to_string(),
                reason: format!("connect timed out after {:?}", self.connect_timeout),
            })?
            .map_err(|e| TransportError::Unreachable {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        let mut framed = Framed::new(stream, frame_codec());
        framed.send(Bytes::from(serde_json::to_vec(message)?)).await?;

        let frame = framed
            .next()
            .await
            .ok_or_else(|| TransportError::Closed(address.to_string()))??;
        Ok(serde_json::from_slice(&frame)?)
    }
}

impl GossipTransport for TcpTransport {
    fn send<'a>(
        &'a self,
        address: &'a str,
        message: GossipMessage,
    ) -> BoxFuture<'a, Result<Acknowledgment, TransportError>> {
        Box::pin(async move { self.request(address, &message).await })
    }
}

/// In-process transport routing addresses to registered nodes.
///
/// Holds weak references so nodes can own the transport without a cycle.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: RwLock<HashMap<String, Weak<GossipNode>>>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `address` to `node`.
    pub fn register(&self, address: impl Into<String>, node: &Arc<GossipNode>) {
        self.routes.write().insert(address.into(), Arc::downgrade(node));
    }

    /// Removes the route for `address`, making it unreachable.
    pub fn unregister(&self, address: &str) {
        self.routes.write().remove(address);
    }

    fn lookup(&self, address: &str) -> Option<Arc<GossipNode>> {
        self.routes.read().get(address).and_then(Weak::upgrade)
    }
}

impl GossipTransport for MemoryTransport {
    fn send<'a>(
        &'a self,
        address: &'a str,
        message: GossipMessage,
    ) -> BoxFuture<'a, Result<Acknowledgment, TransportError>> {
        Box::pin(async move {
            let node = self.lookup(address).ok_or_else(|| TransportError::Unreachable {
                address: address.to_string(),
                reason: "no node registered".to_string(),
            })?;
            Ok(node.handle_message(message).await)
        })
    }
}
