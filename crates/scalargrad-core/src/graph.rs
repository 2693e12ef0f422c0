//! Computation graph for scalar automatic differentiation.
//!
//! All nodes live in a single arena owned by [`Graph`] and refer to each
//! other by [`NodeId`]. A node can only reference nodes created before it, so
//! the graph is acyclic by construction. Values are computed eagerly when a
//! node is created; gradients start at zero and are filled in by the backward
//! pass.

use crate::error::{AutogradError, Result};
use crate::ops::Op;
use crate::scalar::Scalar;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;

/// Unique identifier for nodes in the computation graph.
///
/// Identifiers are indices into the arena of the graph that created them and
/// are meaningless for any other graph. Each identifier also records the
/// truncation generation it was issued in, so an identifier whose node was
/// dropped by [`Graph::truncate`] never resolves to a newer node at the same
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self {
            index,
            generation: 0,
        }
    }

    /// Position of the node in its graph's arena.
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{}", self.index)
    }
}

/// Operand of a graph operation: an existing node or a plain number.
///
/// Plain numbers are coerced into fresh leaf nodes when the operation is
/// applied, so `graph.add(x, 3.0)` and `graph.add(3.0, x)` are equivalent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// A node already in the graph.
    Node(NodeId),
    /// A constant that becomes a new leaf.
    Constant(f64),
}

impl From<NodeId> for Operand {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Scalar<'_>> for Operand {
    fn from(scalar: Scalar<'_>) -> Self {
        Self::Node(scalar.id())
    }
}

/// A node in the computation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) value: f64,
    pub(crate) grad: f64,
    pub(crate) op: Option<Op>,
    pub(crate) label: Option<String>,
    generation: u32,
}

impl Node {
    /// Creates a leaf node holding `value`.
    pub const fn leaf(value: f64) -> Self {
        Self {
            value,
            grad: 0.0,
            op: None,
            label: None,
            generation: 0,
        }
    }

    pub(crate) const fn from_op(value: f64, op: Op) -> Self {
        Self {
            value,
            grad: 0.0,
            op: Some(op),
            label: None,
            generation: 0,
        }
    }

    /// Forward value of the node.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Gradient accumulated into the node.
    pub const fn grad(&self) -> f64 {
        self.grad
    }

    /// The operation that produced the node, `None` for leaves.
    pub const fn op(&self) -> Option<Op> {
        self.op
    }

    /// Diagnostic tag of the producing operation (`""` for leaves).
    pub fn tag(&self) -> String {
        self.op.map(|op| op.to_string()).unwrap_or_default()
    }

    /// Optional human-readable name.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Distinct direct operands of the node, in operand order.
    ///
    /// A node that uses the same operand twice, like `x * x`, lists it once.
    pub fn predecessors(&self) -> Vec<NodeId> {
        let mut inputs: Vec<NodeId> = self.op.map(|op| op.inputs().collect()).unwrap_or_default();
        inputs.dedup();
        inputs
    }

    /// Checks if this node is a leaf (has no operation).
    pub const fn is_leaf(&self) -> bool {
        self.op.is_none()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(data = {}, grad = {})", self.value, self.grad)
    }
}

/// The computation graph structure.
///
/// Operations take `&self`; the arena sits behind a `RefCell`, so a graph is
/// meant to be used from a single thread.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: RefCell<Vec<Node>>,
    generation: Cell<u32>,
}

impl Graph {
    /// Creates a new empty computation graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: RefCell::new(Vec::with_capacity(capacity)),
            generation: Cell::new(0),
        }
    }

    pub(crate) fn push(&self, mut node: Node) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId {
            index: nodes.len(),
            generation: self.generation.get(),
        };
        node.generation = id.generation;
        nodes.push(node);
        id
    }

    pub(crate) fn nodes(&self) -> Ref<'_, Vec<Node>> {
        self.nodes.borrow()
    }

    pub(crate) fn nodes_mut(&self) -> RefMut<'_, Vec<Node>> {
        self.nodes.borrow_mut()
    }

    /// Runs `f` on the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph or its node was dropped
    /// by [`Graph::truncate`].
    fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> R {
        let nodes = self.nodes.borrow();
        f(lookup(&nodes, id))
    }

    fn with_node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut nodes = self.nodes.borrow_mut();
        let index = resolve(&nodes, id);
        f(&mut nodes[index])
    }

    /// Creates a new leaf node (input or parameter).
    pub fn leaf(&self, value: f64) -> NodeId {
        self.push(Node::leaf(value))
    }

    /// Creates a new leaf node with a name.
    pub fn named_leaf(&self, value: f64, name: impl Into<String>) -> NodeId {
        let mut node = Node::leaf(value);
        node.label = Some(name.into());
        self.push(node)
    }

    /// Resolves an operand to a node, coercing constants into new leaves.
    pub fn operand(&self, operand: impl Into<Operand>) -> NodeId {
        match operand.into() {
            Operand::Node(id) => {
                self.with_node(id, |_| ());
                id
            }
            Operand::Constant(value) => self.leaf(value),
        }
    }

    /// Creates a leaf and returns an operator-friendly handle to it.
    pub fn scalar(&self, value: f64) -> Scalar<'_> {
        Scalar::new(self, self.leaf(value))
    }

    /// Wraps an existing node in an operator-friendly handle.
    pub fn handle(&self, id: NodeId) -> Scalar<'_> {
        self.with_node(id, |_| ());
        Scalar::new(self, id)
    }

    /// Gets a snapshot of a node.
    pub fn node(&self, id: NodeId) -> Node {
        self.with_node(id, Node::clone)
    }

    /// Gets the forward value of a node.
    pub fn value(&self, id: NodeId) -> f64 {
        self.with_node(id, Node::value)
    }

    /// Gets the gradient accumulated into a node.
    pub fn grad(&self, id: NodeId) -> f64 {
        self.with_node(id, Node::grad)
    }

    /// Overwrites the gradient of a node.
    pub fn set_grad(&self, id: NodeId, grad: f64) {
        self.with_node_mut(id, |node| node.grad = grad);
    }

    /// Gets the operation that produced a node.
    pub fn op(&self, id: NodeId) -> Option<Op> {
        self.with_node(id, Node::op)
    }

    /// Gets the diagnostic operation tag of a node.
    pub fn tag(&self, id: NodeId) -> String {
        self.with_node(id, Node::tag)
    }

    /// Gets the name of a node, if any.
    pub fn label(&self, id: NodeId) -> Option<String> {
        self.with_node(id, |node| node.label.clone())
    }

    /// Names a node. Labels are diagnostic only.
    pub fn set_label(&self, id: NodeId, name: impl Into<String>) {
        let name = name.into();
        self.with_node_mut(id, |node| node.label = Some(name));
    }

    /// Gets the direct operands of a node.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.with_node(id, Node::predecessors)
    }

    /// Checks if a node is a leaf.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.with_node(id, Node::is_leaf)
    }

    /// Replaces the value of a leaf node, e.g. for a gradient-descent step.
    ///
    /// Nodes already computed from the leaf keep their old value; rebuild the
    /// expression to see the update.
    pub fn set_leaf_value(&self, id: NodeId, value: f64) -> Result<()> {
        self.with_node_mut(id, |node| {
            if !node.is_leaf() {
                return Err(AutogradError::not_a_leaf(id));
            }
            node.value = value;
            Ok(())
        })
    }

    /// Sets the gradient of every given node to zero.
    pub fn zero_grad<I>(&self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut nodes = self.nodes.borrow_mut();
        for id in ids {
            let index = resolve(&nodes, id);
            nodes[index].grad = 0.0;
        }
    }

    /// Sets the gradient of every node in the graph to zero.
    pub fn zero_grad_all(&self) {
        for node in self.nodes.borrow_mut().iter_mut() {
            node.grad = 0.0;
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Checks if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Drops every node created after the first `len` nodes.
    ///
    /// Nodes only reference earlier nodes, so the remaining graph stays
    /// consistent. Identifiers of kept nodes stay valid; using the identifier
    /// of a dropped node panics, even after new nodes reuse its index.
    pub fn truncate(&self, len: usize) {
        let mut nodes = self.nodes.borrow_mut();
        if len < nodes.len() {
            nodes.truncate(len);
            self.generation.set(self.generation.get().wrapping_add(1));
        }
    }
}

/// Arena position of `id`, checked against the node currently stored there.
fn resolve(nodes: &[Node], id: NodeId) -> usize {
    match nodes.get(id.index) {
        Some(node) if node.generation == id.generation => id.index,
        Some(_) => panic!("{id} is stale: its node was dropped by Graph::truncate"),
        None => panic!(
            "{id} does not belong to this graph ({} nodes) or was dropped by Graph::truncate",
            nodes.len()
        ),
    }
}

pub(crate) fn lookup(nodes: &[Node], id: NodeId) -> &Node {
    &nodes[resolve(nodes, id)]
}
