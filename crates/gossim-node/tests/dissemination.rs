//! Dissemination tests over in-process clusters.
//!
//! Nodes run with real latency sleeps, so timings are asserted as lower
//! bounds only.

use std::collections::HashMap;
use std::time::Duration;

use gossim_node::{Cluster, EventKind, GossipEvent, NodeOptions, RunSummary};
use gossim_topology::{
    Edge, GeneratorConfig, LatencyRange, Model, ModelParams, NodeName, Topology, TopologyGenerator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_case::test_case;

// ============================================================================
// Helpers
// ============================================================================

const QUIET: Duration = Duration::from_millis(300);

fn ring(size: u32, latency_ms: f64) -> Topology {
    let nodes: Vec<NodeName> = (0..size).map(|i| NodeName::new(i.to_string())).collect();
    let edges = (0..size)
        .map(|i| Edge::new(i.to_string(), ((i + 1) % size).to_string(), latency_ms))
        .collect();
    Topology::new(nodes, edges)
}

fn events_at<'a>(events: &'a [GossipEvent], node: &str) -> Vec<&'a GossipEvent> {
    events.iter().filter(|e| e.receiver_id.as_str() == node).collect()
}

fn novel_counts(events: &[GossipEvent]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for event in events.iter().filter(|e| e.event_type.disseminates()) {
        *counts.entry(event.receiver_id.to_string()).or_default() += 1;
    }
    counts
}

// ============================================================================
// Ring
// ============================================================================

#[tokio::test]
async fn five_cycle_reaches_opposite_node_after_two_hops() {
    let mut cluster = Cluster::from_topology(ring(5, 10.0), &NodeOptions::default()).expect("cluster");
    cluster.initiate(&"0".into(), "hello").await.expect("initiate");
    let events = cluster.collect_events(QUIET).await;

    let at_origin = events_at(&events, "0");
    assert_eq!(at_origin.len(), 1);
    assert_eq!(at_origin[0].event_type, EventKind::Initiate);

    for neighbor in ["1", "4"] {
        let received = events_at(&events, neighbor);
        assert_eq!(received.len(), 1, "node {neighbor}");
        assert_eq!(received[0].sender_id.as_str(), "0");
        let since = received[0].since_origin_ms.expect("timing");
        assert!((9.0..40.0).contains(&since), "node {neighbor}: {since}");
    }

    let at_two: Vec<_> = events_at(&events, "2")
        .into_iter()
        .filter(|e| e.event_type == EventKind::Received)
        .collect();
    assert_eq!(at_two.len(), 1);
    assert_eq!(at_two[0].sender_id.as_str(), "1");
    let since = at_two[0].since_origin_ms.expect("timing");
    assert!((19.0..80.0).contains(&since), "since origin {since}");
    let hop = at_two[0].propagation_time.expect("timing");
    assert!((9.0..40.0).contains(&hop), "propagation {hop}");

    // 1 initiate, 4 received, 2 and 3 each get one duplicate
    assert_eq!(events.len(), 7);
    assert_eq!(
        events.iter().filter(|e| e.event_type == EventKind::Duplicate).count(),
        2
    );
}

#[tokio::test]
async fn duplicate_payload_is_ignored_everywhere() {
    let mut cluster = Cluster::from_topology(ring(4, 1.0), &NodeOptions::default()).expect("cluster");
    cluster.initiate(&"0".into(), "same").await.expect("initiate");
    let first = cluster.collect_events(QUIET).await;
    assert_eq!(RunSummary::from_events(&first, "same").reached, 4);

    let ack = cluster.initiate(&"2".into(), "same").await.expect("initiate");
    assert_eq!(ack.details, "Done propagate! 2 received: 'same'");
    let second = cluster.collect_events(QUIET).await;

    // only the new origin records an initiate; neighbors drop it as duplicate
    assert!(second
        .iter()
        .filter(|e| e.receiver_id.as_str() != "2")
        .all(|e| e.event_type == EventKind::Duplicate));
}

#[tokio::test]
async fn distinct_payloads_spread_independently() {
    let mut cluster = Cluster::from_topology(ring(6, 1.0), &NodeOptions::default()).expect("cluster");
    cluster.initiate(&"0".into(), "a").await.expect("initiate");
    cluster.initiate(&"3".into(), "b").await.expect("initiate");
    let events = cluster.collect_events(QUIET).await;

    assert_eq!(RunSummary::from_events(&events, "a").reached, 6);
    assert_eq!(RunSummary::from_events(&events, "b").reached, 6);
    for name in ["0", "3", "5"] {
        let node = cluster.node(&name.into()).expect("node");
        assert_eq!(node.seen_count(), 2);
    }
}

#[tokio::test]
async fn unreachable_node_does_not_block_others() {
    let mut cluster = Cluster::from_topology(
        Topology::new(
            vec!["hub".into(), "x".into(), "y".into()],
            vec![Edge::new("hub", "x", 1.0), Edge::new("hub", "y", 1.0)],
        ),
        &NodeOptions::default(),
    )
    .expect("cluster");
    cluster.disconnect(&"x".into());

    cluster.initiate(&"hub".into(), "m").await.expect("initiate");
    let events = cluster.collect_events(QUIET).await;

    assert!(events_at(&events, "x").is_empty());
    assert_eq!(events_at(&events, "y").len(), 1);
}

// ============================================================================
// Generated topologies
// ============================================================================

#[test_case(Model::Ba, "2" ; "preferential attachment")]
#[test_case(Model::Er, "0.3" ; "edge probability")]
#[tokio::test]
async fn every_node_gets_exactly_one_novel_event(model: Model, parameter: &str) {
    let params = ModelParams::parse(model, parameter, 0).expect("params");
    let config = GeneratorConfig::new(12, params, LatencyRange::new(1, 5).expect("range"));
    let generator = TopologyGenerator::new(config).expect("generator");
    // single-attempt models may reject a sample; take the first seed that passes
    let topology = (0..200)
        .find_map(|seed| generator.generate(&mut StdRng::seed_from_u64(seed)).ok())
        .expect("topology");
    let names: Vec<String> = topology.nodes().iter().map(ToString::to_string).collect();
    let origin = topology.nodes()[0].clone();

    let mut cluster = Cluster::from_topology(topology, &NodeOptions::default()).expect("cluster");
    cluster.initiate(&origin, "rumor").await.expect("initiate");
    let events = cluster.collect_events(QUIET).await;

    let counts = novel_counts(&events);
    assert_eq!(counts.len(), names.len());
    assert!(names.iter().all(|n| counts.get(n) == Some(&1)));
}
