//! TCP listener serving one [`GossipNode`].
//!
//! Each connection carries length-delimited JSON frames: a
//! [`GossipMessage`] in, an [`Acknowledgment`] out, repeated until the
//! client closes.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::error::{NodeError, TransportError};
use crate::node::GossipNode;
use crate::protocol::GossipMessage;
use crate::transport::frame_codec;

/// Server accepting gossip connections for one node.
#[derive(Debug)]
pub struct GossipServer {
    listener: TcpListener,
    node: Arc<GossipNode>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl GossipServer {
    /// Binds the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Bind`] if the address cannot be bound.
    pub async fn bind(address: &str, node: Arc<GossipNode>) -> Result<Self, NodeError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| NodeError::Bind {
                address: address.to_string(),
                source,
            })?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Ok(Self {
            listener,
            node,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Returns the bound address.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, NodeError> {
        self.listener.local_addr().map_err(|source| NodeError::Bind {
            address: "listener".to_string(),
            source,
        })
    }

    /// Returns a sender that stops [`Self::serve`] when signalled.
    #[must_use]
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Accepts connections until shut down.
    pub async fn serve(mut self) {
        let identity = self.node.identity().clone();
        if let Ok(addr) = self.listener.local_addr() {
            info!(node = %identity, addr = %addr, "gossip server listening");
        }

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let node = Arc::clone(&self.node);
                            tokio::spawn(async move {
                                match handle_connection(stream, &node).await {
                                    Ok(()) => debug!(peer = %peer_addr, "connection closed"),
                                    Err(e) => debug!(peer = %peer_addr, error = %e, "connection ended with error"),
                                }
                            });
                        }
                        Err(e) => warn!(error = %e, "failed to accept connection"),
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!(node = %identity, "shutdown signal received");
                    break;
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, node: &GossipNode) -> Result<(), TransportError> {
    let mut framed = Framed::new(stream, frame_codec());
    while let Some(frame) = framed.next().await {
        let message: GossipMessage = serde_json::from_slice(&frame?)?;
        let ack = node.handle_message(message).await;
        framed.send(Bytes::from(serde_json::to_vec(&ack)?)).await?;
    }
    Ok(())
}
