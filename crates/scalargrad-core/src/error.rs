//! Error types for graph construction and gradient computation.
//!
//! Every failure in the engine is local and immediate: nothing here performs
//! I/O, so no variant carries retry semantics.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors that can occur while building or differentiating a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutogradError {
    /// The exponent of a power operation was a graph node.
    ///
    /// Only plain real exponents are supported; the engine does not
    /// differentiate with respect to an exponent.
    #[error("Invalid exponent: power expects a plain real exponent, got {exponent}")]
    InvalidExponent {
        /// Description of the rejected exponent
        exponent: String,
    },

    /// A value update targeted a node produced by an operation.
    ///
    /// Only leaf nodes (inputs and parameters) may have their value changed
    /// after construction.
    #[error("{id} is not a leaf node; only leaf values can be updated")]
    NotALeaf {
        /// The offending node
        id: NodeId,
    },

    /// Gradients reachable from the output were not zero before seeding.
    ///
    /// Returned only when the backward pass is configured to reject stale
    /// gradients. No gradient is modified when this error is returned.
    #[error("Stale gradients: {nodes} node(s) reachable from {output} hold non-zero gradients")]
    StaleGradient {
        /// The node the backward pass was started from
        output: NodeId,
        /// Number of reachable nodes with a non-zero gradient
        nodes: usize,
    },

    /// Number of inputs does not match what a component expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected number of inputs
        expected: usize,
        /// Actual number of inputs
        actual: usize,
    },

    /// Invalid configuration of a component.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// Gradient check could not be evaluated.
    #[error("Gradient check failed: {reason}")]
    GradientCheck {
        /// Description of the failure
        reason: String,
    },
}

impl AutogradError {
    /// Create an InvalidExponent error describing the rejected exponent.
    pub fn invalid_exponent<S: Into<String>>(exponent: S) -> Self {
        Self::InvalidExponent {
            exponent: exponent.into(),
        }
    }

    /// Create a NotALeaf error.
    pub const fn not_a_leaf(id: NodeId) -> Self {
        Self::NotALeaf { id }
    }

    /// Create a StaleGradient error.
    pub const fn stale_gradient(output: NodeId, nodes: usize) -> Self {
        Self::StaleGradient { output, nodes }
    }

    /// Create a DimensionMismatch error.
    pub const fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an InvalidConfiguration error with a custom reason.
    pub fn invalid_configuration<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a GradientCheck error with a custom reason.
    pub fn gradient_check<S: Into<String>>(reason: S) -> Self {
        Self::GradientCheck {
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AutogradError>;
