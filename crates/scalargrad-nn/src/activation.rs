//! Activation functions applied at the output of a neuron.

use scalargrad_core::{AutogradError, Graph, NodeId, Result};
use std::fmt;
use std::str::FromStr;

/// Nonlinearity applied to a neuron's weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Rectified linear unit.
    ReLU,
    /// Hyperbolic tangent.
    Tanh,
    /// Logistic sigmoid.
    Sigmoid,
    /// Identity: the weighted sum is returned unchanged.
    Linear,
}

impl Activation {
    /// Applies the activation to `x`, adding at most one node to the graph.
    pub fn apply(self, graph: &Graph, x: NodeId) -> NodeId {
        match self {
            Self::ReLU => graph.relu(x),
            Self::Tanh => graph.tanh(x),
            Self::Sigmoid => graph.sigmoid(x),
            Self::Linear => x,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReLU => "ReLU",
            Self::Tanh => "Tanh",
            Self::Sigmoid => "Sigmoid",
            Self::Linear => "Linear",
        };
        f.write_str(name)
    }
}

impl FromStr for Activation {
    type Err = AutogradError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Self::ReLU),
            "tanh" => Ok(Self::Tanh),
            "sigmoid" => Ok(Self::Sigmoid),
            "linear" | "identity" => Ok(Self::Linear),
            _ => Err(AutogradError::invalid_configuration(format!(
                "unknown activation '{s}'"
            ))),
        }
    }
}
