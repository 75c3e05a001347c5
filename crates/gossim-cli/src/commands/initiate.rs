//! `initiate` command.

use std::io::Write;

use gossim_node::{initiate, StaticDirectory, TcpTransport};
use gossim_topology::NodeName;

use crate::cli::InitiateArgs;
use crate::error::CliResult;

/// Sends a self-addressed message to a running node.
#[derive(Debug, Clone, Default)]
pub struct InitiateCommand {
    transport: TcpTransport,
}

impl InitiateCommand {
    /// Creates the command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the command and prints the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or the node cannot
    /// be reached.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &InitiateArgs) -> CliResult<()> {
        let directory = StaticDirectory::from_file(&args.peers)?;
        let origin = NodeName::new(args.name.clone());
        let ack = initiate(&directory, &self.transport, &origin, args.message.clone()).await?;
        writeln!(out, "{}", ack.details)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    use gossim_node::NodeError;

    use crate::error::CliError;

    #[tokio::test]
    async fn unknown_node_is_reported() {
        let mut peers = tempfile::NamedTempFile::new().expect("tempfile");
        write!(peers, r#"{{"peers": []}}"#).expect("write");

        let args = InitiateArgs {
            name: "nobody".to_string(),
            message: "hi".to_string(),
            peers: peers.path().to_path_buf(),
        };
        let mut out = Vec::new();
        let result = InitiateCommand::new().execute(&mut out, &args).await;
        assert!(matches!(result, Err(CliError::Node(NodeError::Directory(_)))));
        assert!(out.is_empty());
    }
}
