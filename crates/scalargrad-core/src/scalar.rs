//! Operator-friendly handles to graph nodes.
//!
//! A [`Scalar`] pairs a [`NodeId`] with the graph that owns it, so
//! expressions can be written with the usual arithmetic operators:
//!
//! ```
//! use scalargrad_core::Graph;
//!
//! let graph = Graph::new();
//! let a = graph.scalar(2.0);
//! let b = graph.scalar(-3.0);
//! let y = (a * b + 10.0).tanh();
//! y.backward();
//! assert!(a.grad() != 0.0);
//! ```

use crate::backward::BackwardReport;
use crate::error::Result;
use crate::graph::{Graph, NodeId, Operand};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A node together with the graph it lives in.
///
/// Handles are `Copy`; every operator call appends exactly one new node
/// (plus one leaf per plain-number operand) to the shared graph.
#[derive(Clone, Copy)]
pub struct Scalar<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> Scalar<'g> {
    pub(crate) const fn new(graph: &'g Graph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// Identifier of the underlying node.
    pub const fn id(self) -> NodeId {
        self.id
    }

    /// The graph owning the node.
    pub const fn graph(self) -> &'g Graph {
        self.graph
    }

    /// Forward value.
    pub fn value(self) -> f64 {
        self.graph.value(self.id)
    }

    /// Accumulated gradient.
    pub fn grad(self) -> f64 {
        self.graph.grad(self.id)
    }

    /// Operation tag (`""` for leaves).
    pub fn tag(self) -> String {
        self.graph.tag(self.id)
    }

    /// Optional node name.
    pub fn label(self) -> Option<String> {
        self.graph.label(self.id)
    }

    /// Names the node and returns the handle.
    pub fn with_label(self, name: impl Into<String>) -> Self {
        self.graph.set_label(self.id, name);
        self
    }

    /// Natural exponential, `e ** x`.
    pub fn exp(self) -> Self {
        self.wrap(self.graph.exp(self.id))
    }

    /// Hyperbolic tangent.
    pub fn tanh(self) -> Self {
        self.wrap(self.graph.tanh(self.id))
    }

    /// Rectified linear unit, `max(0, x)`.
    pub fn relu(self) -> Self {
        self.wrap(self.graph.relu(self.id))
    }

    /// Logistic sigmoid, `1 / (1 + e ** -x)`.
    pub fn sigmoid(self) -> Self {
        self.wrap(self.graph.sigmoid(self.id))
    }

    /// Raises the value to a constant power.
    pub fn powf(self, exponent: f64) -> Self {
        self.wrap(self.graph.powf(self.id, exponent))
    }

    /// Raises the value to `exponent`, which must be a plain number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AutogradError::InvalidExponent`] if `exponent` is a
    /// node or another handle.
    pub fn pow(self, exponent: impl Into<Operand>) -> Result<Self> {
        self.graph.pow(self.id, exponent).map(|id| self.wrap(id))
    }

    /// Computes gradients of this node with respect to everything it
    /// depends on. See [`crate::compute_gradients`].
    pub fn backward(self) -> BackwardReport {
        self.graph.backward(self.id)
    }

    /// Resets this node's gradient to zero.
    pub fn zero_grad(self) {
        self.graph.set_grad(self.id, 0.0);
    }

    fn wrap(self, id: NodeId) -> Self {
        Self::new(self.graph, id)
    }

    fn same_graph(self, other: Self) -> &'g Graph {
        assert!(
            std::ptr::eq(self.graph, other.graph),
            "cannot combine {} and {} from different graphs",
            self.id,
            other.id
        );
        self.graph
    }
}

impl From<Scalar<'_>> for NodeId {
    fn from(scalar: Scalar<'_>) -> Self {
        scalar.id
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.graph.node(self.id))
    }
}

impl fmt::Debug for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.graph.node(self.id);
        f.debug_struct("Scalar")
            .field("id", &self.id)
            .field("value", &node.value())
            .field("grad", &node.grad())
            .field("op", &node.tag())
            .field("label", &node.label())
            .finish()
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $graph_fn:ident) => {
        impl<'g> $trait for Scalar<'g> {
            type Output = Scalar<'g>;

            fn $method(self, rhs: Scalar<'g>) -> Self::Output {
                let graph = self.same_graph(rhs);
                Scalar::new(graph, graph.$graph_fn(self.id, rhs.id))
            }
        }

        impl<'g> $trait<f64> for Scalar<'g> {
            type Output = Scalar<'g>;

            fn $method(self, rhs: f64) -> Self::Output {
                Scalar::new(self.graph, self.graph.$graph_fn(self.id, rhs))
            }
        }

        impl<'g> $trait<Scalar<'g>> for f64 {
            type Output = Scalar<'g>;

            fn $method(self, rhs: Scalar<'g>) -> Self::Output {
                Scalar::new(rhs.graph, rhs.graph.$graph_fn(self, rhs.id))
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Sub, sub, sub);
impl_binary_op!(Mul, mul, mul);
impl_binary_op!(Div, div, div);

impl<'g> Neg for Scalar<'g> {
    type Output = Scalar<'g>;

    fn neg(self) -> Self::Output {
        self.wrap(self.graph.neg(self.id))
    }
}
