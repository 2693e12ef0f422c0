//! Neural network building blocks for scalargrad.
//!
//! Neurons, layers and multi-layer perceptrons whose parameters are leaf
//! nodes of a [`scalargrad_core::Graph`]. Every component implements
//! [`Module`], which exposes its parameters in a stable order and can reset
//! their gradients between backward passes.
//!
//! Initialization draws from a caller-supplied random number generator, so a
//! seeded generator gives reproducible models.

pub mod activation;
pub mod layer;
pub mod mlp;
pub mod module;
pub mod neuron;

pub use activation::Activation;
pub use layer::Layer;
pub use mlp::Mlp;
pub use module::Module;
pub use neuron::Neuron;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{Activation, Layer, Mlp, Module, Neuron};
}
