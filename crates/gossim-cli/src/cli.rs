//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gossim_node::{LabelSelector, DEFAULT_SELECTOR};
use gossim_topology::{LatencySource, Model, DEFAULT_NODE_PREFIX, DEFAULT_TOPOLOGY_DIR};

/// Gossip dissemination simulator.
#[derive(Parser, Debug, Clone)]
#[command(name = "gossim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding topology artifacts.
    #[arg(long, global = true, env = "GOSSIM_TOPOLOGY_DIR", default_value = DEFAULT_TOPOLOGY_DIR)]
    pub topology_dir: PathBuf,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a connected topology with edge latencies.
    Generate(GenerateArgs),

    /// Run one gossip node over TCP.
    Serve(ServeArgs),

    /// Start a rumor at a running node.
    Initiate(InitiateArgs),

    /// Run every node of a topology in this process and report the spread.
    Simulate(SimulateArgs),

    /// Show a topology's statistics and a node's neighbors.
    Inspect(InspectArgs),
}

/// Arguments for `generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of nodes.
    #[arg(long)]
    pub nodes: usize,

    /// Generation model.
    #[arg(long)]
    pub model: Model,

    /// Degree (BA) or edge probability (ER).
    #[arg(long)]
    pub parameter: String,

    /// BA adjustment; non-zero switches to edge-by-edge construction.
    #[arg(long, default_value_t = 0)]
    pub adjust: usize,

    /// Minimum edge latency in milliseconds.
    #[arg(long, default_value_t = 1)]
    pub min_latency: u32,

    /// Maximum edge latency in milliseconds.
    #[arg(long, default_value_t = 10)]
    pub max_latency: u32,

    /// Node name prefix.
    #[arg(long, default_value = DEFAULT_NODE_PREFIX)]
    pub prefix: String,

    /// Resampling bound for standard BA.
    #[arg(long, default_value_t = 100)]
    pub max_attempts: u32,

    /// RNG seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the artifact to the topology directory instead of stdout.
    #[arg(long)]
    pub save: bool,
}

/// Where to read a topology from.
#[derive(Args, Debug, Clone, Default)]
pub struct TopologyArgs {
    /// Artifact path, or file name inside the topology directory.
    #[arg(long = "topology", env = "FILENAME")]
    pub file: Option<String>,

    /// Node count of the newest artifact to use when no file is given.
    #[arg(long, requires = "model")]
    pub nodes: Option<usize>,

    /// Model of the newest artifact to use when no file is given.
    #[arg(long, requires = "nodes")]
    pub model: Option<Model>,
}

/// Arguments for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// This node's name in the topology.
    #[arg(long, env = "NODE_NAME")]
    pub name: String,

    /// Listen address.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5050")]
    pub listen: String,

    /// Peer directory file.
    #[arg(long, env = "PEER_DIRECTORY")]
    pub peers: PathBuf,

    /// Label selector applied to the peer directory.
    #[arg(long, env = "LABEL_SELECTOR", default_value = DEFAULT_SELECTOR)]
    pub selector: LabelSelector,

    /// Edge attribute used as latency.
    #[arg(long, env = "LATENCY_OPTION", default_value = "weight")]
    pub latency_option: LatencySource,

    /// Topology to serve.
    #[command(flatten)]
    pub topology: TopologyArgs,
}

/// Arguments for `initiate`.
#[derive(Args, Debug, Clone)]
pub struct InitiateArgs {
    /// Node to start the rumor at.
    #[arg(long, env = "NODE_NAME")]
    pub name: String,

    /// Payload.
    #[arg(long)]
    pub message: String,

    /// Peer directory file.
    #[arg(long, env = "PEER_DIRECTORY")]
    pub peers: PathBuf,
}

/// Arguments for `simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Payload.
    #[arg(long, default_value = "gossip")]
    pub message: String,

    /// Originating node; defaults to the first node.
    #[arg(long)]
    pub origin: Option<String>,

    /// Stop collecting after this long without an event, in milliseconds.
    /// Raised to twice the slowest edge latency when shorter.
    #[arg(long, default_value_t = 500)]
    pub quiet_ms: u64,

    /// Edge attribute used as latency.
    #[arg(long, env = "LATENCY_OPTION", default_value = "weight")]
    pub latency_option: LatencySource,

    /// Topology to simulate.
    #[command(flatten)]
    pub topology: TopologyArgs,
}

/// Arguments for `inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Also list this node's neighbors.
    #[arg(long)]
    pub node: Option<String>,

    /// Edge attribute used as latency.
    #[arg(long, default_value = "weight")]
    pub latency_option: LatencySource,

    /// Topology to inspect.
    #[command(flatten)]
    pub topology: TopologyArgs,
}
