//! Command implementations.

mod generate;
mod initiate;
mod inspect;
mod serve;
mod simulate;

use std::path::Path;

use gossim_topology::{Topology, TopologyStore};
use tracing::info;

use crate::cli::TopologyArgs;
use crate::error::{CliError, CliResult};

pub use generate::GenerateCommand;
pub use initiate::InitiateCommand;
pub use inspect::InspectCommand;
pub use serve::ServeCommand;
pub use simulate::SimulateCommand;

/// Loads the topology selected by `args`.
///
/// An explicit file is taken as a path if it exists, otherwise as a name in
/// the store. Without a file the newest artifact for the node count and model
/// is used.
pub fn load_topology(args: &TopologyArgs, store: &TopologyStore) -> CliResult<Topology> {
    if let Some(file) = &args.file {
        let topology = if Path::new(file).is_file() {
            TopologyStore::load(file)?
        } else {
            store.open(file)?
        };
        return Ok(topology);
    }

    match (args.nodes, args.model) {
        (Some(nodes), Some(model)) => {
            let path = store.find_latest(nodes, model)?;
            info!(path = %path.display(), "using newest matching topology");
            Ok(TopologyStore::load(path)?)
        }
        _ => Err(CliError::InvalidArgument(
            "pass --topology, or --nodes with --model".to_string(),
        )),
    }
}
