//! Operations for the computation graph.
//!
//! This module defines the fixed set of differentiable operations, their
//! forward formulas, and the local chain-rule contribution each one pushes
//! into its operands during the backward pass.
//!
//! Negation, subtraction and division are not primitive: they are built from
//! multiply, add and power, and inherit those rules.

use crate::error::{AutogradError, Result};
use crate::graph::{lookup, Graph, Node, NodeId, Operand};
use std::fmt;

/// Local gradient rule of a node.
pub trait Propagate {
    /// Adds the node's contribution to the gradient of each operand.
    ///
    /// # Arguments
    /// * `output` - The forward value of the node
    /// * `grad_output` - The gradient accumulated into the node
    /// * `nodes` - The arena holding the operands
    fn propagate(&self, output: f64, grad_output: f64, nodes: &mut [Node]);
}

/// Enumeration of operation types for easier matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Multiply,
    Pow,
    Exp,
    Tanh,
    ReLU,
    Sigmoid,
}

/// An operation together with the operands it was applied to.
///
/// Each variant stores exactly the operands its gradient rule needs. The
/// exponent of [`Op::Pow`] is a constant, never a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// `lhs + rhs`
    Add(NodeId, NodeId),
    /// `lhs * rhs`
    Multiply(NodeId, NodeId),
    /// `base ** exponent`
    Pow {
        /// The node raised to the power
        base: NodeId,
        /// The constant exponent
        exponent: f64,
    },
    /// `e ** x`
    Exp(NodeId),
    /// Hyperbolic tangent.
    Tanh(NodeId),
    /// Rectified linear unit.
    ReLU(NodeId),
    /// Logistic sigmoid.
    Sigmoid(NodeId),
}

impl Op {
    /// Returns the kind of this operation.
    pub const fn op_type(&self) -> OpType {
        match self {
            Self::Add(..) => OpType::Add,
            Self::Multiply(..) => OpType::Multiply,
            Self::Pow { .. } => OpType::Pow,
            Self::Exp(_) => OpType::Exp,
            Self::Tanh(_) => OpType::Tanh,
            Self::ReLU(_) => OpType::ReLU,
            Self::Sigmoid(_) => OpType::Sigmoid,
        }
    }

    /// Operands of the operation, in order. A node used twice appears twice.
    pub fn inputs(&self) -> impl Iterator<Item = NodeId> {
        let (first, second) = match *self {
            Self::Add(lhs, rhs) | Self::Multiply(lhs, rhs) => (lhs, Some(rhs)),
            Self::Pow { base, .. } => (base, None),
            Self::Exp(x) | Self::Tanh(x) | Self::ReLU(x) | Self::Sigmoid(x) => (x, None),
        };
        std::iter::once(first).chain(second)
    }

    /// Performs the forward computation.
    pub(crate) fn forward(&self, nodes: &[Node]) -> f64 {
        let value = |id: NodeId| lookup(nodes, id).value;
        match *self {
            Self::Add(lhs, rhs) => value(lhs) + value(rhs),
            Self::Multiply(lhs, rhs) => value(lhs) * value(rhs),
            Self::Pow { base, exponent } => value(base).powf(exponent),
            Self::Exp(x) => value(x).exp(),
            Self::Tanh(x) => value(x).tanh(),
            Self::ReLU(x) => {
                let x = value(x);
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
            Self::Sigmoid(x) => 1.0 / (1.0 + (-value(x)).exp()),
        }
    }
}

impl Propagate for Op {
    fn propagate(&self, output: f64, grad_output: f64, nodes: &mut [Node]) {
        match *self {
            Self::Add(lhs, rhs) => {
                nodes[lhs.index()].grad += grad_output;
                nodes[rhs.index()].grad += grad_output;
            }
            Self::Multiply(lhs, rhs) => {
                // Read both values first: lhs and rhs may be the same node.
                let (a, b) = (nodes[lhs.index()].value, nodes[rhs.index()].value);
                nodes[lhs.index()].grad += b * grad_output;
                nodes[rhs.index()].grad += a * grad_output;
            }
            Self::Pow { base, exponent } => {
                let x = nodes[base.index()].value;
                nodes[base.index()].grad += exponent * x.powf(exponent - 1.0) * grad_output;
            }
            Self::Exp(x) => {
                nodes[x.index()].grad += output * grad_output;
            }
            Self::Tanh(x) => {
                nodes[x.index()].grad += output.mul_add(-output, 1.0) * grad_output;
            }
            Self::ReLU(x) => {
                let slope = if output > 0.0 { 1.0 } else { 0.0 };
                nodes[x.index()].grad += slope * grad_output;
            }
            Self::Sigmoid(x) => {
                nodes[x.index()].grad += output * (1.0 - output) * grad_output;
            }
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(..) => f.write_str("+"),
            Self::Multiply(..) => f.write_str("*"),
            Self::Pow { exponent, .. } => write!(f, "**{exponent}"),
            Self::Exp(_) => f.write_str("exp"),
            Self::Tanh(_) => f.write_str("tanh"),
            Self::ReLU(_) => f.write_str("ReLU"),
            Self::Sigmoid(_) => f.write_str("sigmoid"),
        }
    }
}

impl Graph {
    /// Creates a new node from an operation, computing its value eagerly.
    pub(crate) fn apply_op(&self, op: Op) -> NodeId {
        let value = op.forward(&self.nodes());
        self.push(Node::from_op(value, op))
    }

    /// `lhs + rhs`
    pub fn add(&self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> NodeId {
        let lhs = self.operand(lhs);
        let rhs = self.operand(rhs);
        self.apply_op(Op::Add(lhs, rhs))
    }

    /// `lhs * rhs`
    pub fn mul(&self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> NodeId {
        let lhs = self.operand(lhs);
        let rhs = self.operand(rhs);
        self.apply_op(Op::Multiply(lhs, rhs))
    }

    /// `-x`, built as `x * -1`.
    pub fn neg(&self, x: impl Into<Operand>) -> NodeId {
        self.mul(x, -1.0)
    }

    /// `lhs - rhs`, built as `lhs + (-rhs)`.
    pub fn sub(&self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> NodeId {
        let lhs = self.operand(lhs);
        let negated = self.neg(rhs);
        self.add(lhs, negated)
    }

    /// `lhs / rhs`, built as `lhs * rhs ** -1`.
    pub fn div(&self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> NodeId {
        let lhs = self.operand(lhs);
        let reciprocal = self.powf(rhs, -1.0);
        self.mul(lhs, reciprocal)
    }

    /// `base ** exponent` for a constant exponent.
    pub fn powf(&self, base: impl Into<Operand>, exponent: f64) -> NodeId {
        let base = self.operand(base);
        self.apply_op(Op::Pow { base, exponent })
    }

    /// `base ** exponent`, rejecting exponents that are graph nodes.
    pub fn pow(&self, base: impl Into<Operand>, exponent: impl Into<Operand>) -> Result<NodeId> {
        match exponent.into() {
            Operand::Constant(exponent) => Ok(self.powf(base, exponent)),
            Operand::Node(id) => Err(AutogradError::invalid_exponent(format!(
                "graph node {id}"
            ))),
        }
    }

    /// `e ** x`
    pub fn exp(&self, x: impl Into<Operand>) -> NodeId {
        let x = self.operand(x);
        self.apply_op(Op::Exp(x))
    }

    /// Hyperbolic tangent.
    pub fn tanh(&self, x: impl Into<Operand>) -> NodeId {
        let x = self.operand(x);
        self.apply_op(Op::Tanh(x))
    }

    /// Rectified linear unit, `max(0, x)`.
    pub fn relu(&self, x: impl Into<Operand>) -> NodeId {
        let x = self.operand(x);
        self.apply_op(Op::ReLU(x))
    }

    /// Logistic sigmoid, `1 / (1 + e ** -x)`.
    pub fn sigmoid(&self, x: impl Into<Operand>) -> NodeId {
        let x = self.operand(x);
        self.apply_op(Op::Sigmoid(x))
    }
}
