//! The base trait for neural network building blocks.

use scalargrad_core::{Graph, NodeId, Result};

/// A component owning trainable parameters in a [`Graph`].
///
/// Parameters are leaf nodes created when the module is constructed. They
/// stay valid for as long as the graph keeps them, so per-step nodes created
/// by [`Module::forward`] can be dropped with [`Graph::truncate`] without
/// touching the parameters.
pub trait Module {
    /// What one forward pass produces.
    type Output;

    /// Performs a forward pass, adding the computation to `graph`.
    ///
    /// # Errors
    /// Returns [`scalargrad_core::AutogradError::DimensionMismatch`] when the
    /// number of inputs differs from what the module was built for.
    fn forward(&self, graph: &Graph, inputs: &[NodeId]) -> Result<Self::Output>;

    /// Returns all trainable parameters in a stable order.
    fn parameters(&self) -> Vec<NodeId>;

    /// Sets the gradient of every parameter to zero.
    fn zero_grad(&self, graph: &Graph) {
        graph.zero_grad(self.parameters());
    }

    /// Number of trainable parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }
}
