//! # gossim-cli
//!
//! Command-line interface for the gossip simulator.
//!
//! Provides commands for:
//! - Generating and saving topologies
//! - Serving one node over TCP and starting rumors at it
//! - Running a whole topology in process
//! - Inspecting stored artifacts
//!
//! # Deployment
//!
//! ```text
//! gossim generate --save        topology/nodes10_..._BA2.json
//!        │
//!        ▼
//! gossim serve (per node) ◄──── peers.json (name → address)
//!        ▲
//!        │ self-addressed message
//! gossim initiate
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Commands, LogFormat};
pub use error::{CliError, CliResult};
