//! Topology generation.
//!
//! Builds a connected graph for one of the supported models:
//!
//! - **BA, standard**: preferential attachment; resampled up to
//!   [`GeneratorConfig::max_attempts`] times until the degree and
//!   connectivity checks pass.
//! - **BA, adjusted**: edge-by-edge construction with per-node degrees drawn
//!   from `[1, 2m - adjustment]`; a single attempt.
//! - **ER**: independent edges with probability `p`, followed by a repair
//!   pass that links disconnected components; a single attempt.
//!
//! Latency weights are assigned after the graph is final, then nodes are
//! renamed and wrapped in a [`Topology`].

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::artifact::Topology;
use crate::error::GenerateError;
use crate::graph::{self, RawGraph};
use crate::latency::assign_latency;
use crate::types::{GeneratorConfig, ModelParams};

/// Generates topologies from a validated [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct TopologyGenerator {
    config: GeneratorConfig,
}

impl TopologyGenerator {
    /// Creates a generator, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidConfig`] if the parameters are infeasible.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds the raw connected graph without latencies.
    pub fn build_graph<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RawGraph, GenerateError> {
        let node_count = self.config.node_count;
        let n = u32::try_from(node_count)
            .map_err(|_| GenerateError::InvalidConfig(format!("node count {node_count} is too large")))?;

        info!(
            nodes = node_count,
            model = %self.config.params.model(),
            parameter = %self.config.params.parameter_label(),
            "generating topology"
        );

        match self.config.params {
            ModelParams::BarabasiAlbert {
                parameter,
                adjustment: 0,
            } => self.standard_ba(n, parameter, rng),
            ModelParams::BarabasiAlbert {
                parameter,
                adjustment,
            } => adjusted_ba(n, parameter, adjustment, rng),
            ModelParams::ErdosRenyi { probability } => erdos_renyi_repaired(n, probability, rng),
        }
    }

    /// Builds a graph, assigns latencies and renames the nodes.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Topology, GenerateError> {
        let mut graph = self.build_graph(rng)?;
        let assigned = assign_latency(&mut graph, self.config.latency, rng);
        debug!(assigned, "assigned edge latencies");

        let topology = Topology::from_graph(&graph, &self.config.node_prefix);
        info!(
            nodes = topology.stats().total_nodes,
            edges = topology.stats().total_edges,
            weight_average = topology.stats().weight_average,
            "topology generated"
        );
        Ok(topology)
    }

    fn standard_ba<R: Rng + ?Sized>(
        &self,
        n: u32,
        parameter: usize,
        rng: &mut R,
    ) -> Result<RawGraph, GenerateError> {
        let attempts = self.config.max_attempts;
        let mut last_error = GenerateError::NotConnected { attempts };

        for attempt in 1..=attempts {
            let graph = preferential_attachment(n, parameter, rng);
            match check_ba(&graph, n as usize, parameter) {
                Ok(()) => {
                    debug!(attempt, "BA graph accepted");
                    return Ok(graph);
                }
                Err(e) => {
                    debug!(attempt, error = %e, "BA graph rejected, resampling");
                    last_error = match e {
                        GenerateError::NotConnected { .. } => GenerateError::NotConnected { attempts: attempt },
                        other => other,
                    };
                }
            }
        }

        warn!(attempts, error = %last_error, "BA generation exhausted attempts");
        Err(last_error)
    }
}

/// Barabási–Albert construction.
///
/// Starts from a star on `m + 1` nodes. Each later node attaches to `m`
/// distinct targets drawn from a list where every node appears once per
/// incident edge, so targets are chosen proportionally to degree.
fn preferential_attachment<R: Rng + ?Sized>(n: u32, m: usize, rng: &mut R) -> RawGraph {
    let mut graph = graph::with_nodes(n);
    let m32 = m as u32;
    let mut repeated: Vec<u32> = Vec::with_capacity(2 * m * n as usize);

    for leaf in 1..=m32.min(n.saturating_sub(1)) {
        graph::add_edge(&mut graph, 0, leaf);
        repeated.push(0);
        repeated.push(leaf);
    }

    for source in (m32 + 1)..n {
        let mut targets: Vec<u32> = Vec::with_capacity(m);
        while targets.len() < m {
            let Some(&candidate) = repeated.choose(rng) else {
                break;
            };
            if !targets.contains(&candidate) {
                targets.push(candidate);
            }
        }
        for &target in &targets {
            graph::add_edge(&mut graph, source, target);
        }
        repeated.extend_from_slice(&targets);
        repeated.extend(std::iter::repeat_n(source, m));
    }

    graph
}

fn check_ba(graph: &RawGraph, node_count: usize, target: usize) -> Result<(), GenerateError> {
    let realized = graph::average_degree(graph, node_count);
    if realized < target as f64 {
        return Err(GenerateError::DegreeBelowTarget { realized, target });
    }
    if !graph::is_connected(graph) {
        return Err(GenerateError::NotConnected { attempts: 1 });
    }
    Ok(())
}

/// Adjusted BA: one attempt, no resampling.
fn adjusted_ba<R: Rng + ?Sized>(
    n: u32,
    parameter: usize,
    adjustment: usize,
    rng: &mut R,
) -> Result<RawGraph, GenerateError> {
    let max_degree = (2 * parameter).saturating_sub(adjustment);
    if max_degree < parameter {
        return Err(GenerateError::InvalidConfig(format!(
            "maximum degree {max_degree} is below the target degree {parameter}"
        )));
    }

    let mut graph = graph::with_nodes(n);
    for node in 0..n {
        let degree = rng.gen_range(1..=max_degree);
        for _ in 0..degree {
            let candidate = rng.gen_range(0..n);
            graph::add_edge(&mut graph, node, candidate);
        }
    }

    check_ba(&graph, n as usize, parameter).inspect_err(|e| {
        warn!(error = %e, "adjusted BA graph rejected");
    })?;
    Ok(graph)
}

/// ER graph with component repair; one attempt, no resampling.
fn erdos_renyi_repaired<R: Rng + ?Sized>(
    n: u32,
    probability: f64,
    rng: &mut R,
) -> Result<RawGraph, GenerateError> {
    let expected = round_half_even(probability * f64::from(n.saturating_sub(1)));

    let mut graph = graph::with_nodes(n);
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.gen_bool(probability) {
                graph::add_edge(&mut graph, a, b);
            }
        }
    }

    let added = repair_connectivity(&mut graph, rng);
    if added > 0 {
        debug!(added, "linked disconnected components");
    }

    let realized = round_half_even(graph::average_degree(&graph, n as usize));
    if realized != expected {
        warn!(realized, expected, "ER graph rejected");
        return Err(GenerateError::DegreeMismatch { realized, expected });
    }
    if !graph::is_connected(&graph) {
        return Err(GenerateError::NotConnected { attempts: 1 });
    }
    Ok(graph)
}

/// Links consecutive components with one edge each until the graph is
/// connected. Only adds edges. Returns how many were added.
pub fn repair_connectivity<R: Rng + ?Sized>(graph: &mut RawGraph, rng: &mut R) -> usize {
    let components = graph::components(graph);
    let mut added = 0;

    for pair in components.windows(2) {
        let (Some(&a), Some(&b)) = (pair[0].choose(rng), pair[1].choose(rng)) else {
            continue;
        };
        if graph::add_edge(graph, a, b) {
            added += 1;
        }
        if graph::is_connected(graph) {
            break;
        }
    }

    added
}

fn round_half_even(value: f64) -> u64 {
    value.round_ties_even().max(0.0) as u64
}
