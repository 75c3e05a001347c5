//! End-to-end dissemination over loopback TCP.

use std::sync::Arc;
use std::time::Duration;

use gossim_node::{
    initiate, EventKind, GossipEvent, GossipNode, GossipServer, NodeOptions, PeerEntry,
    StaticDirectory, TcpTransport,
};
use gossim_topology::{Edge, Topology};
use tokio::sync::mpsc;
use tokio::time::timeout;

struct Running {
    directory: Arc<StaticDirectory>,
    transport: Arc<TcpTransport>,
    events: mpsc::UnboundedReceiver<GossipEvent>,
    shutdown: Vec<mpsc::Sender<()>>,
}

async fn start(topology: Topology) -> Running {
    let topology = Arc::new(topology);
    let directory = Arc::new(StaticDirectory::default());
    let transport = Arc::new(TcpTransport::new().with_connect_timeout(Duration::from_secs(1)));
    let (tx, events) = mpsc::unbounded_channel();
    let mut shutdown = Vec::new();

    for name in topology.nodes() {
        let node = GossipNode::new(
            name.clone(),
            Arc::clone(&topology),
            directory.clone(),
            transport.clone(),
            NodeOptions::default(),
        )
        .expect("node")
        .with_event_sink(tx.clone());

        let server = GossipServer::bind("127.0.0.1:0", Arc::new(node))
            .await
            .expect("bind");
        let addr = server.local_addr().expect("addr");
        directory.register(PeerEntry::new(name.clone(), addr.to_string()));
        shutdown.push(server.shutdown_handle());
        tokio::spawn(server.serve());
    }

    Running {
        directory,
        transport,
        events,
        shutdown,
    }
}

async fn drain(events: &mut mpsc::UnboundedReceiver<GossipEvent>) -> Vec<GossipEvent> {
    let mut collected = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_millis(300), events.recv()).await {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn rumor_crosses_tcp_line() {
    let topology = Topology::new(
        vec!["a".into(), "b".into(), "c".into()],
        vec![Edge::new("a", "b", 5.0), Edge::new("b", "c", 5.0)],
    );
    let mut running = start(topology).await;

    let ack = initiate(
        running.directory.as_ref(),
        running.transport.as_ref(),
        &"a".into(),
        "over tcp",
    )
    .await
    .expect("initiate");
    assert_eq!(ack.details, "Done propagate! a received: 'over tcp'");

    let events = drain(&mut running.events).await;
    assert_eq!(events.len(), 3);

    let at_c = events
        .iter()
        .find(|e| e.receiver_id.as_str() == "c")
        .expect("c reached");
    assert_eq!(at_c.event_type, EventKind::Received);
    assert_eq!(at_c.sender_id.as_str(), "b");
    assert!(at_c.since_origin_ms.expect("timing") >= 9.0);

    for tx in running.shutdown {
        tx.send(()).await.expect("shutdown");
    }
}

#[tokio::test]
async fn stopped_peer_is_skipped() {
    let topology = Topology::new(
        vec!["hub".into(), "up".into(), "down".into()],
        vec![Edge::new("hub", "up", 1.0), Edge::new("hub", "down", 1.0)],
    );
    let mut running = start(topology).await;
    // point "down" at a port with no listener
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let dead = closed.local_addr().expect("addr").to_string();
    drop(closed);
    running.directory.register(PeerEntry::new("down", dead));

    initiate(
        running.directory.as_ref(),
        running.transport.as_ref(),
        &"hub".into(),
        "partial",
    )
    .await
    .expect("initiate");

    let events = drain(&mut running.events).await;
    let receivers: Vec<&str> = events.iter().map(|e| e.receiver_id.as_str()).collect();
    assert_eq!(receivers.len(), 2);
    assert!(receivers.contains(&"hub"));
    assert!(receivers.contains(&"up"));
}
