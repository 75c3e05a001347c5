//! Core types shared by topology generation and resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

/// Default prefix used when renaming raw node indices.
pub const DEFAULT_NODE_PREFIX: &str = "gossip-statefulset";

/// Logical name of a simulation participant (e.g. `gossip-statefulset-3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    /// Creates a node name from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds the name of the node at `index` under `prefix`.
    #[must_use]
    pub fn indexed(prefix: &str, index: u32) -> Self {
        Self(format!("{prefix}-{index}"))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Graph generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Preferential attachment (Barabási–Albert).
    #[serde(rename = "BA")]
    Ba,
    /// Independent edge probability (Erdős–Rényi).
    #[serde(rename = "ER")]
    Er,
}

impl Model {
    /// Returns the short label used in artifact names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ba => "BA",
            Self::Er => "ER",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a model label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}', expected BA or ER")]
pub struct ParseModelError(String);

impl FromStr for Model {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BA" => Ok(Self::Ba),
            "ER" => Ok(Self::Er),
            _ => Err(ParseModelError(s.to_string())),
        }
    }
}

/// Model selection together with its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelParams {
    /// Preferential attachment.
    BarabasiAlbert {
        /// Target average degree and edges attached per new node.
        parameter: usize,
        /// When non-zero, switches to edge-by-edge construction with degrees
        /// drawn from `[1, 2 * parameter - adjustment]`.
        adjustment: usize,
    },
    /// Random edges with independent probability.
    ErdosRenyi {
        /// Edge probability, strictly between 0 and 1.
        probability: f64,
    },
}

impl ModelParams {
    /// Parses a model parameter given on the command line.
    ///
    /// BA takes an integer degree, ER a floating point probability.
    pub fn parse(model: Model, parameter: &str, adjustment: usize) -> Result<Self, GenerateError> {
        match model {
            Model::Ba => {
                let parameter = parameter.trim().parse::<usize>().map_err(|e| {
                    GenerateError::InvalidConfig(format!(
                        "BA parameter must be an integer degree, got '{parameter}': {e}"
                    ))
                })?;
                Ok(Self::BarabasiAlbert {
                    parameter,
                    adjustment,
                })
            }
            Model::Er => {
                let probability = parameter.trim().parse::<f64>().map_err(|e| {
                    GenerateError::InvalidConfig(format!(
                        "ER parameter must be a probability, got '{parameter}': {e}"
                    ))
                })?;
                Ok(Self::ErdosRenyi { probability })
            }
        }
    }

    /// Returns the model this parameter set belongs to.
    #[must_use]
    pub const fn model(&self) -> Model {
        match self {
            Self::BarabasiAlbert { .. } => Model::Ba,
            Self::ErdosRenyi { .. } => Model::Er,
        }
    }

    /// Returns the parameter formatted for artifact names.
    #[must_use]
    pub fn parameter_label(&self) -> String {
        match self {
            Self::BarabasiAlbert { parameter, .. } => parameter.to_string(),
            Self::ErdosRenyi { probability } => probability.to_string(),
        }
    }
}

/// Inclusive latency range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    min_ms: u32,
    max_ms: u32,
}

impl LatencyRange {
    /// Creates a range, rejecting empty or non-positive bounds.
    pub fn new(min_ms: u32, max_ms: u32) -> Result<Self, GenerateError> {
        if min_ms == 0 {
            return Err(GenerateError::InvalidConfig(
                "minimum latency must be at least 1 ms".to_string(),
            ));
        }
        if min_ms > max_ms {
            return Err(GenerateError::InvalidConfig(format!(
                "minimum latency {min_ms} ms exceeds maximum latency {max_ms} ms"
            )));
        }
        Ok(Self { min_ms, max_ms })
    }

    /// Lower bound in milliseconds.
    #[must_use]
    pub const fn min_ms(&self) -> u32 {
        self.min_ms
    }

    /// Upper bound in milliseconds.
    #[must_use]
    pub const fn max_ms(&self) -> u32 {
        self.max_ms
    }
}

/// Everything needed to produce one topology.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Number of nodes in the resulting graph.
    pub node_count: usize,
    /// Model and parameter.
    pub params: ModelParams,
    /// Range latency weights are drawn from.
    pub latency: LatencyRange,
    /// Prefix for renamed node identifiers.
    pub node_prefix: String,
    /// Upper bound on resampling for the standard BA construction.
    pub max_attempts: u32,
}

impl GeneratorConfig {
    /// Default resampling bound for the standard BA path.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

    /// Creates a config with the default prefix and attempt bound.
    #[must_use]
    pub fn new(node_count: usize, params: ModelParams, latency: LatencyRange) -> Self {
        Self {
            node_count,
            params,
            latency,
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the node name prefix.
    #[must_use]
    pub fn with_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_prefix = prefix.into();
        self
    }

    /// Sets the resampling bound for the standard BA path.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Checks the config before any graph is built.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.node_count == 0 {
            return Err(GenerateError::InvalidConfig(
                "node count must be at least 1".to_string(),
            ));
        }
        if u32::try_from(self.node_count).is_err() {
            return Err(GenerateError::InvalidConfig(format!(
                "node count {} is too large",
                self.node_count
            )));
        }
        if self.node_prefix.is_empty() {
            return Err(GenerateError::InvalidConfig(
                "node prefix cannot be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(GenerateError::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }

        match self.params {
            ModelParams::BarabasiAlbert {
                parameter,
                adjustment,
            } => {
                if parameter == 0 || parameter >= self.node_count {
                    return Err(GenerateError::InvalidConfig(format!(
                        "BA parameter must satisfy 1 <= m < n, got m={parameter}, n={}",
                        self.node_count
                    )));
                }
                if adjustment > 0 && (2 * parameter).saturating_sub(adjustment) < parameter {
                    return Err(GenerateError::InvalidConfig(format!(
                        "maximum degree 2*{parameter}-{adjustment} is below the target degree {parameter}"
                    )));
                }
            }
            ModelParams::ErdosRenyi { probability } => {
                if !(probability > 0.0 && probability < 1.0) {
                    return Err(GenerateError::InvalidConfig(format!(
                        "ER probability must be in (0, 1), got {probability}"
                    )));
                }
            }
        }

        Ok(())
    }
}
