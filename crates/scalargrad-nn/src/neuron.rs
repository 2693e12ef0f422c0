//! A single neuron: weighted sum of inputs plus bias, then an activation.

use crate::activation::Activation;
use crate::module::Module;
use rand::Rng;
use scalargrad_core::{AutogradError, Graph, NodeId, Result};
use std::fmt;

/// A neuron computing `activation(w · x + b)`.
#[derive(Debug, Clone)]
pub struct Neuron {
    weights: Vec<NodeId>,
    bias: NodeId,
    activation: Activation,
}

impl Neuron {
    /// Creates a neuron with `nin` inputs.
    ///
    /// Weights and bias are leaves drawn uniformly from `[-1, 1]`.
    ///
    /// # Errors
    /// Returns [`AutogradError::InvalidConfiguration`] if `nin` is zero.
    pub fn new<R: Rng>(
        graph: &Graph,
        nin: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if nin == 0 {
            return Err(AutogradError::invalid_configuration(
                "a neuron needs at least one input",
            ));
        }

        let weights = (0..nin)
            .map(|_| graph.leaf(rng.gen_range(-1.0..=1.0)))
            .collect();
        let bias = graph.leaf(rng.gen_range(-1.0..=1.0));

        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    /// Number of inputs.
    pub fn nin(&self) -> usize {
        self.weights.len()
    }

    /// Weight nodes, one per input.
    pub fn weights(&self) -> &[NodeId] {
        &self.weights
    }

    /// Bias node.
    pub const fn bias(&self) -> NodeId {
        self.bias
    }

    /// Activation applied to the weighted sum.
    pub const fn activation(&self) -> Activation {
        self.activation
    }
}

impl Module for Neuron {
    type Output = NodeId;

    fn forward(&self, graph: &Graph, inputs: &[NodeId]) -> Result<NodeId> {
        if inputs.len() != self.weights.len() {
            return Err(AutogradError::dimension_mismatch(
                self.weights.len(),
                inputs.len(),
            ));
        }

        // Sum starts from the bias: ((b + w0*x0) + w1*x1) + ...
        let sum = self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.bias, |acc, (&w, &x)| {
                let term = graph.mul(w, x);
                graph.add(acc, term)
            });

        Ok(self.activation.apply(graph, sum))
    }

    /// Weights in input order, then the bias.
    fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.weights.clone();
        params.push(self.bias);
        params
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Neuron({})", self.activation, self.weights.len())
    }
}
