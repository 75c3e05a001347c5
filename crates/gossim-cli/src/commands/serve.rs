//! `serve` command.

use std::sync::Arc;

use gossim_node::{GossipNode, GossipServer, NodeOptions, StaticDirectory, TcpTransport};
use gossim_topology::{NodeName, TopologyStore};
use tracing::{info, warn};

use super::load_topology;
use crate::cli::ServeArgs;
use crate::error::CliResult;

/// Runs one node until interrupted.
#[derive(Debug, Clone)]
pub struct ServeCommand {
    store: TopologyStore,
}

impl ServeCommand {
    /// Creates the command reading topologies from `store`.
    #[must_use]
    pub const fn new(store: TopologyStore) -> Self {
        Self { store }
    }

    /// Binds the node's server.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology, the peer directory or the listen
    /// address cannot be used, or if the node is not part of the topology.
    pub async fn bind(&self, args: &ServeArgs) -> CliResult<GossipServer> {
        let topology = Arc::new(load_topology(&args.topology, &self.store)?);
        let directory = Arc::new(StaticDirectory::from_file(&args.peers)?);
        let options = NodeOptions {
            latency_source: args.latency_option.clone(),
            selector: args.selector.clone(),
        };

        let node = GossipNode::new(
            NodeName::new(args.name.clone()),
            topology,
            directory,
            Arc::new(TcpTransport::new()),
            options,
        )?;
        info!(
            node = %args.name,
            latency_option = %args.latency_option,
            selector = %args.selector,
            "node configured"
        );

        Ok(GossipServer::bind(&args.listen, Arc::new(node)).await?)
    }

    /// Serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be started.
    pub async fn execute(&self, args: &ServeArgs) -> CliResult<()> {
        let server = self.bind(args).await?;
        let shutdown = server.shutdown_handle();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            let _ = shutdown.send(()).await;
        });

        server.serve().await;
        info!(node = %args.name, "node stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use gossim_node::NodeError;
    use gossim_topology::{Edge, ModelParams, Topology};

    use crate::cli::TopologyArgs;
    use crate::error::CliError;

    fn fixture() -> (tempfile::TempDir, ServeArgs) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TopologyStore::new(dir.path());
        let topology = Topology::new(vec!["a".into(), "b".into()], vec![Edge::new("a", "b", 1.0)]);
        let path = store
            .save(
                &topology,
                &ModelParams::BarabasiAlbert {
                    parameter: 1,
                    adjustment: 0,
                },
            )
            .expect("save");

        let peers = dir.path().join("peers.json");
        let mut file = std::fs::File::create(&peers).expect("create");
        write!(
            file,
            r#"{{"peers": [{{"name": "a", "address": "127.0.0.1:1", "labels": {{"app": "bcgossip"}}}}]}}"#
        )
        .expect("write");

        let args = ServeArgs {
            name: "a".to_string(),
            listen: "127.0.0.1:0".to_string(),
            peers,
            selector: gossim_node::LabelSelector::equals("app", "bcgossip"),
            latency_option: gossim_topology::LatencySource::Weight,
            topology: TopologyArgs {
                file: Some(path.display().to_string()),
                ..TopologyArgs::default()
            },
        };
        (dir, args)
    }

    #[tokio::test]
    async fn binds_configured_node() {
        let (dir, args) = fixture();
        let server = ServeCommand::new(TopologyStore::new(dir.path()))
            .bind(&args)
            .await
            .expect("bind");
        assert!(server.local_addr().expect("addr").port() > 0);
    }

    #[tokio::test]
    async fn rejects_node_outside_topology() {
        let (dir, mut args) = fixture();
        args.name = "stranger".to_string();
        let result = ServeCommand::new(TopologyStore::new(dir.path())).bind(&args).await;
        assert!(matches!(
            result,
            Err(CliError::Node(NodeError::UnknownIdentity(_)))
        ));
    }

    #[tokio::test]
    async fn rejects_missing_peer_file() {
        let (dir, mut args) = fixture();
        args.peers = dir.path().join("absent.json");
        let result = ServeCommand::new(TopologyStore::new(dir.path())).bind(&args).await;
        assert!(matches!(result, Err(CliError::Directory(_))));
    }
}
