//! A fully connected layer of independent neurons.

use crate::activation::Activation;
use crate::module::Module;
use crate::neuron::Neuron;
use rand::Rng;
use scalargrad_core::{AutogradError, Graph, NodeId, Result};
use std::fmt;

/// `nout` neurons sharing the same inputs and activation.
#[derive(Debug, Clone)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Creates a layer mapping `nin` inputs to `nout` outputs.
    ///
    /// # Errors
    /// Returns [`AutogradError::InvalidConfiguration`] if `nin` or `nout` is
    /// zero.
    pub fn new<R: Rng>(
        graph: &Graph,
        nin: usize,
        nout: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if nout == 0 {
            return Err(AutogradError::invalid_configuration(
                "a layer needs at least one neuron",
            ));
        }

        let neurons = (0..nout)
            .map(|_| Neuron::new(graph, nin, activation, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { neurons })
    }

    /// Neurons in output order.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Number of inputs.
    pub fn nin(&self) -> usize {
        self.neurons.first().map_or(0, Neuron::nin)
    }

    /// Number of outputs.
    pub fn nout(&self) -> usize {
        self.neurons.len()
    }
}

impl Module for Layer {
    /// One output per neuron, in neuron order.
    type Output = Vec<NodeId>;

    fn forward(&self, graph: &Graph, inputs: &[NodeId]) -> Result<Vec<NodeId>> {
        self.neurons
            .iter()
            .map(|neuron| neuron.forward(graph, inputs))
            .collect()
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.neurons.iter().flat_map(Neuron::parameters).collect()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer of [")?;
        for (i, neuron) in self.neurons.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{neuron}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_layer_shape_and_parameters() {
        let graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new(&graph, 3, 2, Activation::Tanh, &mut rng).unwrap();

        assert_eq!(layer.nin(), 3);
        assert_eq!(layer.nout(), 2);
        assert_eq!(layer.num_parameters(), 8);

        // Neuron by neuron: weights then bias.
        let mut expected = layer.neurons()[0].parameters();
        expected.extend(layer.neurons()[1].parameters());
        assert_eq!(layer.parameters(), expected);
    }

    #[test]
    fn test_layer_forward() {
        let graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new(&graph, 2, 3, Activation::ReLU, &mut rng).unwrap();
        let inputs = [graph.leaf(1.0), graph.leaf(-1.0)];

        let outputs = layer.forward(&graph, &inputs).unwrap();

        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|&o| graph.value(o) >= 0.0));
    }

    #[test]
    fn test_layer_rejects_bad_configuration() {
        let graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(Layer::new(&graph, 2, 0, Activation::ReLU, &mut rng).is_err());
        assert!(Layer::new(&graph, 0, 2, Activation::ReLU, &mut rng).is_err());
    }

    #[test]
    fn test_layer_forward_dimension_mismatch() {
        let graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new(&graph, 2, 2, Activation::Sigmoid, &mut rng).unwrap();
        let x = graph.leaf(1.0);

        assert_eq!(
            layer.forward(&graph, &[x, x, x]).unwrap_err(),
            AutogradError::dimension_mismatch(2, 3)
        );
    }

    #[test]
    fn test_layer_display() {
        let graph = Graph::new();
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new(&graph, 3, 2, Activation::Sigmoid, &mut rng).unwrap();

        assert_eq!(
            layer.to_string(),
            "Layer of [SigmoidNeuron(3), SigmoidNeuron(3)]"
        );
    }
}
