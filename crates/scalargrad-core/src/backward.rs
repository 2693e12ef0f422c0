//! Backward pass implementation for automatic differentiation.
//!
//! This module implements the backpropagation algorithm: a depth-first
//! topological sort of the nodes reachable from the output, followed by one
//! call of each node's local gradient rule in reverse topological order.
//!
//! Gradients are accumulated, never reset. Callers that reuse nodes across
//! several backward passes must zero them in between, see
//! [`Graph::zero_grad`] and [`StaleGradientPolicy`].

use crate::config::{BackwardConfig, StaleGradientPolicy};
use crate::error::{AutogradError, Result};
use crate::graph::{lookup, Graph, NodeId};
use crate::ops::Propagate;
use log::{debug, trace, warn};

/// Summary of a backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackwardReport {
    /// Number of nodes reachable from the output
    pub visited: usize,
    /// Reachable nodes that held a non-zero gradient before seeding
    pub stale_nodes: usize,
}

/// Gets the nodes reachable from `output` in topological order.
///
/// Every node appears after all of its predecessors, and `output` comes last.
/// Predecessors are visited in operand order. Membership is by node identity,
/// so two distinct nodes with equal values are both listed.
///
/// The traversal keeps its own stack, so arbitrarily long chains of
/// operations do not exhaust the call stack.
pub fn topological_order(graph: &Graph, output: NodeId) -> Vec<NodeId> {
    let nodes = graph.nodes();
    lookup(&nodes, output);

    let mut visited = vec![false; nodes.len()];
    let mut order = Vec::new();
    // (node, predecessors already scheduled)
    let mut stack = vec![(output, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        stack.push((id, true));

        if let Some(op) = nodes[id.index()].op {
            let inputs: Vec<NodeId> = op.inputs().collect();
            for &input in inputs.iter().rev() {
                if !visited[input.index()] {
                    stack.push((input, false));
                }
            }
        }
    }

    order
}

/// Computes the gradient of `output` with respect to every node it depends on.
///
/// Seeds the gradient of `output` to 1.0 and accumulates into all reachable
/// nodes. Gradients left over from an earlier pass are added to, and a
/// warning is logged when that happens.
///
/// # Example
/// ```
/// use scalargrad_core::{compute_gradients, Graph};
///
/// let graph = Graph::new();
/// let x = graph.leaf(3.0);
/// let y = graph.mul(x, x);
/// compute_gradients(&graph, y);
/// assert_eq!(graph.grad(x), 6.0);
/// ```
pub fn compute_gradients(graph: &Graph, output: NodeId) -> BackwardReport {
    let order = topological_order(graph, output);
    let stale_nodes = count_stale(graph, &order);
    if stale_nodes > 0 {
        warn_stale(output, stale_nodes);
    }
    run_backward(graph, output, &order, 1.0, stale_nodes)
}

/// Computes gradients like [`compute_gradients`] with an explicit configuration.
///
/// Returns [`AutogradError::StaleGradient`] without modifying any gradient
/// when the policy is [`StaleGradientPolicy::Reject`] and a reachable node
/// already holds a non-zero gradient.
pub fn compute_gradients_with(
    graph: &Graph,
    output: NodeId,
    config: &BackwardConfig,
) -> Result<BackwardReport> {
    config.validate()?;

    let order = topological_order(graph, output);
    let stale_nodes = count_stale(graph, &order);
    if stale_nodes > 0 {
        match config.stale_gradients {
            StaleGradientPolicy::Ignore => {}
            StaleGradientPolicy::Warn => warn_stale(output, stale_nodes),
            StaleGradientPolicy::Reject => {
                return Err(AutogradError::stale_gradient(output, stale_nodes));
            }
        }
    }

    Ok(run_backward(graph, output, &order, config.seed, stale_nodes))
}

fn count_stale(graph: &Graph, order: &[NodeId]) -> usize {
    let nodes = graph.nodes();
    order
        .iter()
        .filter(|id| nodes[id.index()].grad != 0.0)
        .count()
}

fn warn_stale(output: NodeId, stale_nodes: usize) {
    warn!(
        "backward from {output}: {stale_nodes} reachable node(s) already hold gradients; \
         accumulating on top of them (zero gradients between passes to avoid this)"
    );
}

fn run_backward(
    graph: &Graph,
    output: NodeId,
    order: &[NodeId],
    seed: f64,
    stale_nodes: usize,
) -> BackwardReport {
    let mut nodes = graph.nodes_mut();
    nodes[output.index()].grad = seed;

    // Reverse topological order: a node's gradient is complete before it is
    // pushed further upstream.
    for &id in order.iter().rev() {
        let (value, grad, op) = {
            let node = &nodes[id.index()];
            (node.value, node.grad, node.op)
        };
        if let Some(op) = op {
            trace!("propagate {id} ({op}): value = {value}, grad = {grad}");
            op.propagate(value, grad, &mut nodes);
        }
    }

    debug!(
        "backward from {output}: {} node(s) visited, seed = {seed}",
        order.len()
    );

    BackwardReport {
        visited: order.len(),
        stale_nodes,
    }
}

impl Graph {
    /// Gets the nodes reachable from `output` in topological order.
    ///
    /// See [`topological_order`].
    pub fn topological_order(&self, output: NodeId) -> Vec<NodeId> {
        topological_order(self, output)
    }

    /// Runs the backward pass from `output`.
    ///
    /// See [`compute_gradients`].
    pub fn backward(&self, output: NodeId) -> BackwardReport {
        compute_gradients(self, output)
    }

    /// Runs the backward pass from `output` with an explicit configuration.
    ///
    /// See [`compute_gradients_with`].
    pub fn backward_with(&self, output: NodeId, config: &BackwardConfig) -> Result<BackwardReport> {
        compute_gradients_with(self, output, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_backward_single_node() {
        let graph = Graph::new();
        let x = graph.leaf(3.0);

        let report = compute_gradients(&graph, x);

        assert_eq!(report.visited, 1);
        assert_eq!(graph.grad(x), 1.0);
    }

    #[test]
    fn test_backward_add() {
        let graph = Graph::new();
        let x = graph.leaf(2.0);
        let y = graph.leaf(3.0);
        let z = graph.add(x, y);

        compute_gradients(&graph, z);

        assert_eq!(graph.grad(x), 1.0);
        assert_eq!(graph.grad(y), 1.0);
    }

    #[test]
    fn test_backward_chain() {
        let graph = Graph::new();

        // (x + y) * 2
        let x = graph.leaf(3.0);
        let y = graph.leaf(4.0);
        let two = graph.leaf(2.0);
        let sum = graph.add(x, y);
        let prod = graph.mul(sum, two);

        assert_eq!(graph.value(prod), 14.0);

        compute_gradients(&graph, prod);

        assert_eq!(graph.grad(x), 2.0);
        assert_eq!(graph.grad(y), 2.0);
        assert_eq!(graph.grad(two), 7.0);
    }

    #[test]
    fn test_gradient_accumulation() {
        let graph = Graph::new();
        let x = graph.leaf(5.0);
        let z = graph.add(x, x);

        compute_gradients(&graph, z);

        assert_eq!(graph.grad(x), 2.0);
    }

    #[test]
    fn test_gradient_accumulates_over_diamond() {
        let graph = Graph::new();

        // y = a * b + a, with a reached through two distinct paths
        let a = graph.leaf(3.0);
        let b = graph.leaf(2.0);
        let ab = graph.mul(a, b);
        let y = graph.add(ab, a);

        compute_gradients(&graph, y);

        assert_eq!(graph.grad(a), 3.0);
        assert_eq!(graph.grad(b), 3.0);
    }

    #[test]
    fn test_topological_order_follows_operand_order() {
        let graph = Graph::new();
        let a = graph.leaf(1.0);
        let b = graph.leaf(2.0);
        let c = graph.mul(a, b);
        let d = graph.leaf(3.0);
        let e = graph.add(d, c);

        assert_eq!(topological_order(&graph, e), vec![d, a, b, c, e]);
        assert_eq!(topological_order(&graph, c), vec![a, b, c]);
    }

    #[test]
    fn test_topological_order_skips_unreachable_nodes() {
        let graph = Graph::new();
        let a = graph.leaf(1.0);
        let unrelated = graph.leaf(9.0);
        let b = graph.tanh(a);

        let order = graph.topological_order(b);
        assert_eq!(order, vec![a, b]);
        assert!(!order.contains(&unrelated));
    }

    #[test]
    fn test_topological_order_distinguishes_equal_values() {
        let graph = Graph::new();
        let a = graph.leaf(2.0);
        let b = graph.leaf(2.0);
        let c = graph.add(a, b);

        assert_eq!(graph.topological_order(c).len(), 3);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let graph = Graph::with_capacity(400_001);
        let x = graph.leaf(1.0);
        let mut y = x;
        for _ in 0..200_000 {
            y = graph.add(y, 0.0);
        }

        let report = compute_gradients(&graph, y);

        assert_eq!(report.visited, 400_001);
        assert_eq!(graph.grad(x), 1.0);
    }

    #[test]
    fn test_repeated_backward_accumulates() {
        let graph = Graph::new();
        let x = graph.leaf(3.0);
        let y = graph.mul(x, 2.0);

        let first = compute_gradients(&graph, y);
        assert_eq!(first.stale_nodes, 0);
        assert_eq!(graph.grad(x), 2.0);

        let second = compute_gradients(&graph, y);
        assert_eq!(second.stale_nodes, 3);
        assert_eq!(graph.grad(x), 4.0);
        // The output is re-seeded, not accumulated.
        assert_eq!(graph.grad(y), 1.0);
    }

    #[test]
    fn test_reject_policy_leaves_gradients_untouched() {
        let graph = Graph::new();
        let x = graph.leaf(3.0);
        let y = graph.mul(x, 2.0);
        let config = BackwardConfig::new().with_stale_gradients(StaleGradientPolicy::Reject);

        graph.backward_with(y, &config).unwrap();
        assert_eq!(graph.grad(x), 2.0);

        let err = graph.backward_with(y, &config).unwrap_err();
        assert_eq!(err, AutogradError::stale_gradient(y, 3));
        assert_eq!(graph.grad(x), 2.0);

        graph.zero_grad_all();
        graph.backward_with(y, &config).unwrap();
        assert_eq!(graph.grad(x), 2.0);
    }

    #[test]
    fn test_custom_seed_scales_gradients() {
        let graph = Graph::new();
        let x = graph.leaf(2.0);
        let y = graph.exp(x);
        let config = BackwardConfig::new().with_seed(0.5);

        graph.backward_with(y, &config).unwrap();

        assert_relative_eq!(graph.grad(x), 0.5 * 2.0_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let graph = Graph::new();
        let x = graph.leaf(2.0);
        let config = BackwardConfig::new().with_seed(f64::INFINITY);

        assert!(matches!(
            graph.backward_with(x, &config),
            Err(AutogradError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "is stale")]
    fn test_backward_from_truncated_output_panics() {
        let graph = Graph::new();
        let w = graph.leaf(3.0);
        let mark = graph.len();

        let old_loss = graph.powf(w, 2.0);
        graph.truncate(mark);
        let _ = graph.sub(w, 1.0);

        graph.backward(old_loss);
    }
}
