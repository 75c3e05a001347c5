//! CLI error types.

use gossim_node::{DirectoryError, NodeError};
use gossim_topology::{GenerateError, TopologyError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Topology generation failed or was misconfigured.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// Topology could not be found, read or resolved.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Node start-up or initiation failed.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Peer directory could not be loaded.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Invalid argument combination.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be encoded.
    #[error("format error: {0}")]
    Format(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit status for usage errors.
    pub const USAGE_EXIT_CODE: u8 = 2;

    /// Returns true when the invocation itself is wrong and no retry with
    /// the same arguments can succeed.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        match self {
            Self::Generate(e) => e.is_config(),
            Self::InvalidArgument(_) => true,
            _ => false,
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_generation_config_is_usage() {
        let err = CliError::from(GenerateError::InvalidConfig("n < 1".to_string()));
        assert!(err.is_usage());
        assert!(CliError::InvalidArgument("x".to_string()).is_usage());
    }

    #[test]
    fn infeasible_generation_is_not_usage() {
        assert!(!CliError::from(GenerateError::NotConnected { attempts: 100 }).is_usage());
        assert!(!CliError::from(GenerateError::DegreeBelowTarget {
            realized: 2.5,
            target: 3
        })
        .is_usage());
        assert!(!CliError::from(std::io::Error::other("disk")).is_usage());
    }
}
