//! Multi-layer perceptron.

use crate::activation::Activation;
use crate::layer::Layer;
use crate::module::Module;
use log::debug;
use rand::Rng;
use scalargrad_core::{AutogradError, Graph, NodeId, Result};
use std::fmt;

/// A stack of fully connected layers applied in sequence.
///
/// Every layer applies its own activation, including the last one. Use
/// [`Activation::Linear`] for a layer without nonlinearity.
///
/// # Example
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use scalargrad_core::Graph;
/// use scalargrad_nn::{Activation, Mlp, Module};
///
/// let graph = Graph::new();
/// let mut rng = StdRng::seed_from_u64(0);
/// let mlp = Mlp::new(
///     &graph,
///     2,
///     &[(4, Activation::ReLU), (1, Activation::Sigmoid)],
///     &mut rng,
/// )
/// .unwrap();
///
/// let inputs = [graph.leaf(0.5), graph.leaf(-1.0)];
/// let output = mlp.forward(&graph, &inputs).unwrap();
/// assert_eq!(output.len(), 1);
/// assert_eq!(mlp.num_parameters(), 4 * 3 + 5);
/// ```
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// Creates a perceptron with `nin` inputs and one layer per entry of
    /// `layers`, given as `(width, activation)`.
    ///
    /// # Errors
    /// Returns [`AutogradError::InvalidConfiguration`] if `nin` is zero,
    /// `layers` is empty, or a layer has zero width.
    pub fn new<R: Rng>(
        graph: &Graph,
        nin: usize,
        layers: &[(usize, Activation)],
        rng: &mut R,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(AutogradError::invalid_configuration(
                "a perceptron needs at least one layer",
            ));
        }
        if nin == 0 {
            return Err(AutogradError::invalid_configuration(
                "a perceptron needs at least one input",
            ));
        }
        if let Some(position) = layers.iter().position(|&(width, _)| width == 0) {
            return Err(AutogradError::invalid_configuration(format!(
                "layer {position} of the perceptron has zero width"
            )));
        }

        let mut built = Vec::with_capacity(layers.len());
        let mut width = nin;
        for &(nout, activation) in layers {
            built.push(Layer::new(graph, width, nout, activation, &mut *rng)?);
            width = nout;
        }

        let mlp = Self { layers: built };
        debug!(
            "built MLP with {nin} input(s), {} layer(s), {} parameter(s)",
            mlp.layers.len(),
            mlp.num_parameters()
        );
        Ok(mlp)
    }

    /// Layers in application order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of inputs.
    pub fn nin(&self) -> usize {
        self.layers.first().map_or(0, Layer::nin)
    }

    /// Number of outputs.
    pub fn nout(&self) -> usize {
        self.layers.last().map_or(0, Layer::nout)
    }
}

impl Module for Mlp {
    /// Outputs of the last layer.
    type Output = Vec<NodeId>;

    fn forward(&self, graph: &Graph, inputs: &[NodeId]) -> Result<Vec<NodeId>> {
        let mut activations = inputs.to_vec();
        for layer in &self.layers {
            activations = layer.forward(graph, &activations)?;
        }
        Ok(activations)
    }

    /// Layer by layer, neuron by neuron, weights then bias.
    fn parameters(&self) -> Vec<NodeId> {
        self.layers.iter().flat_map(Layer::parameters).collect()
    }
}

impl fmt::Display for Mlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MLP of [")?;
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{layer}")?;
        }
        write!(f, "]")
    }
}
