//! Scalar reverse-mode automatic differentiation.
//!
//! This crate provides a minimal autodiff engine over `f64` scalars. An
//! expression is built node by node, its value is computed eagerly, and a
//! single backward pass fills in the gradient of the output with respect to
//! every node it depends on.
//!
//! # Features
//!
//! - **Computation graphs**: Dynamic construction, one node per operation
//! - **Reverse mode AD**: Gradients via backpropagation in topological order
//! - **Operator overloading**: `Scalar` handles work with `+ - * /` and `f64`
//! - **Gradient checking**: Finite-difference validation of backward rules
//!
//! # Architecture
//!
//! 1. **Graph**: Arena owning every node, addressed by `NodeId`
//! 2. **Operations**: Forward formulas and local gradient rules
//! 3. **Backward**: Topological sort and gradient accumulation
//!
//! # Example
//!
//! ```
//! use scalargrad_core::Graph;
//!
//! let graph = Graph::new();
//! let a = graph.leaf(2.0);
//! let b = graph.leaf(-3.0);
//! let c = graph.leaf(10.0);
//! let e = graph.mul(a, b);
//! let d = graph.add(e, c);
//!
//! graph.backward(d);
//!
//! assert_eq!(graph.value(d), 4.0);
//! assert_eq!(graph.grad(a), -3.0);
//! assert_eq!(graph.grad(b), 2.0);
//! ```

pub mod backward;
pub mod config;
pub mod error;
pub mod graph;
pub mod ops;
pub mod scalar;
pub mod validation;

// Re-export key types
pub use backward::{compute_gradients, compute_gradients_with, topological_order, BackwardReport};
pub use config::{BackwardConfig, GradCheckConfig, StaleGradientPolicy};
pub use error::{AutogradError, Result};
pub use graph::{Graph, Node, NodeId, Operand};
pub use ops::{Op, OpType, Propagate};
pub use scalar::Scalar;
pub use validation::{check_gradients, GradientCheckResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backward::{compute_gradients, BackwardReport};
    pub use crate::config::{BackwardConfig, StaleGradientPolicy};
    pub use crate::error::{AutogradError, Result};
    pub use crate::graph::{Graph, NodeId};
    pub use crate::scalar::Scalar;
}
