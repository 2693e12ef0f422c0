//! # scalargrad
//!
//! A minimal reverse-mode automatic differentiation engine over scalar
//! values, with optional neural network building blocks.
//!
//! ## Crates
//!
//! - `scalargrad-core`, re-exported at the root: graph, operations, backward
//!   pass, gradient checking
//! - `scalargrad-nn`, re-exported as [`nn`] with the `nn` feature: neurons,
//!   layers and perceptrons
//!
//! ## Quick Start
//!
//! ```
//! use scalargrad::prelude::*;
//!
//! let graph = Graph::new();
//! let a = graph.scalar(2.0);
//! let b = graph.scalar(-3.0);
//! let c = graph.scalar(10.0);
//! let f = graph.scalar(-2.0);
//!
//! let loss = (a * b + c) * f;
//! loss.backward();
//!
//! assert_eq!(loss.value(), -8.0);
//! assert_eq!(a.grad(), 6.0);
//! assert_eq!(b.grad(), -4.0);
//! ```

pub use scalargrad_core::*;

#[cfg(feature = "nn")]
pub use scalargrad_nn as nn;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use scalargrad_core::prelude::*;
    pub use scalargrad_core::{check_gradients, GradCheckConfig};

    #[cfg(feature = "nn")]
    pub use scalargrad_nn::prelude::*;
}
