//! Raw undirected graph used during generation, plus connectivity helpers.

use std::collections::HashSet;

use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;

/// Graph over raw integer node ids.
///
/// Edge weights are latencies in milliseconds; `None` marks an edge whose
/// latency has not been assigned yet. Parallel edges collapse and edge
/// iteration follows insertion order.
pub type RawGraph = UnGraphMap<u32, Option<f64>>;

/// Creates a graph holding nodes `0..node_count` and no edges.
#[must_use]
pub fn with_nodes(node_count: u32) -> RawGraph {
    let mut graph = RawGraph::with_capacity(node_count as usize, 0);
    for node in 0..node_count {
        graph.add_node(node);
    }
    graph
}

/// Adds an unweighted edge unless it already exists or is a self-loop.
///
/// Returns true if a new edge was inserted.
pub fn add_edge(graph: &mut RawGraph, a: u32, b: u32) -> bool {
    if a == b || graph.contains_edge(a, b) {
        return false;
    }
    graph.add_edge(a, b, None);
    true
}

/// Lists connected components in node insertion order.
#[must_use]
pub fn components(graph: &RawGraph) -> Vec<Vec<u32>> {
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut out = Vec::new();

    for start in graph.nodes() {
        if visited.contains(&start) {
            continue;
        }
        let mut component = Vec::new();
        let mut bfs = Bfs::new(graph, start);
        while let Some(node) = bfs.next(graph) {
            visited.insert(node);
            component.push(node);
        }
        out.push(component);
    }

    out
}

/// Returns true if every node is reachable from every other.
///
/// An empty graph is not considered connected.
#[must_use]
pub fn is_connected(graph: &RawGraph) -> bool {
    let Some(start) = graph.nodes().next() else {
        return false;
    };
    let mut bfs = Bfs::new(graph, start);
    let mut reached = 0usize;
    while bfs.next(graph).is_some() {
        reached += 1;
    }
    reached == graph.node_count()
}

/// Sum of degrees divided by `node_count`.
#[must_use]
pub fn average_degree(graph: &RawGraph, node_count: usize) -> f64 {
    if node_count == 0 {
        return 0.0;
    }
    (2 * graph.edge_count()) as f64 / node_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_rejects_self_loops_and_duplicates() {
        let mut graph = with_nodes(3);
        assert!(add_edge(&mut graph, 0, 1));
        assert!(!add_edge(&mut graph, 1, 0));
        assert!(!add_edge(&mut graph, 2, 2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn components_follow_node_order() {
        let mut graph = with_nodes(5);
        add_edge(&mut graph, 0, 2);
        add_edge(&mut graph, 3, 4);

        let comps = components(&graph);
        assert_eq!(comps.len(), 3);
        assert!(comps[0].contains(&0) && comps[0].contains(&2));
        assert_eq!(comps[1], vec![1]);
        assert!(comps[2].contains(&3) && comps[2].contains(&4));
    }

    #[test]
    fn connectivity() {
        let mut graph = with_nodes(3);
        assert!(!is_connected(&graph));
        add_edge(&mut graph, 0, 1);
        add_edge(&mut graph, 1, 2);
        assert!(is_connected(&graph));
        assert!(!is_connected(&RawGraph::new()));
        assert!(is_connected(&with_nodes(1)));
    }

    #[test]
    fn average_degree_counts_both_endpoints() {
        let mut graph = with_nodes(4);
        add_edge(&mut graph, 0, 1);
        add_edge(&mut graph, 2, 3);
        assert!((average_degree(&graph, 4) - 1.0).abs() < f64::EPSILON);
    }
}
