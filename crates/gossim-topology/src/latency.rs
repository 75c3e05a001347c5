//! Edge latency assignment.

use rand::Rng;

use crate::graph::RawGraph;
use crate::types::LatencyRange;

/// Draws a latency for every edge that does not have one yet.
///
/// Weights are whole milliseconds drawn uniformly from the inclusive range.
/// Edges that already carry a weight keep it. Returns the number of edges
/// that were assigned.
pub fn assign_latency<R: Rng + ?Sized>(graph: &mut RawGraph, range: LatencyRange, rng: &mut R) -> usize {
    let mut assigned = 0;
    for (_, _, weight) in graph.all_edges_mut() {
        if weight.is_none() {
            *weight = Some(f64::from(rng.gen_range(range.min_ms()..=range.max_ms())));
            assigned += 1;
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{add_edge, with_nodes};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn assigns_within_range() {
        let mut graph = with_nodes(4);
        add_edge(&mut graph, 0, 1);
        add_edge(&mut graph, 1, 2);
        add_edge(&mut graph, 2, 3);

        let range = LatencyRange::new(5, 9).expect("range");
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(assign_latency(&mut graph, range, &mut rng), 3);

        for (_, _, weight) in graph.all_edges() {
            let w = weight.expect("assigned");
            assert!((5.0..=9.0).contains(&w));
            assert!((w.fract()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn preserves_existing_weights() {
        let mut graph = with_nodes(3);
        graph.add_edge(0, 1, Some(42.0));
        add_edge(&mut graph, 1, 2);

        let range = LatencyRange::new(1, 2).expect("range");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(assign_latency(&mut graph, range, &mut rng), 1);
        assert_eq!(graph.edge_weight(0, 1).copied().flatten(), Some(42.0));
    }
}
