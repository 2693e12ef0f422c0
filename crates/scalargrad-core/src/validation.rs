//! Finite-difference validation of backward rules.
//!
//! The expression under test is supplied as a builder closure and rebuilt on
//! a fresh graph for every perturbed evaluation, so the check exercises the
//! same forward code path as normal use.

use crate::config::GradCheckConfig;
use crate::error::{AutogradError, Result};
use crate::graph::{Graph, NodeId};
use log::debug;

/// Results from gradient checking.
#[derive(Debug, Clone)]
pub struct GradientCheckResult {
    /// Gradients computed by the backward pass, one per input
    pub analytical: Vec<f64>,
    /// Central-difference estimates, one per input
    pub numerical: Vec<f64>,
    /// Relative error `|a - n| / max(|a|, |n|, 1)` for each input
    pub relative_errors: Vec<f64>,
    /// Maximum relative error
    pub max_relative_error: f64,
    /// Average relative error
    pub avg_relative_error: f64,
    /// Whether every relative error is within tolerance
    pub passed: bool,
}

/// Compares analytical and numerical gradients of a scalar expression.
///
/// `build` receives a fresh graph and one leaf per entry of `inputs` (in the
/// same order) and returns the output node. It is called once for the
/// analytical pass and twice per input for the central difference
/// `(f(x + h) - f(x - h)) / 2h`.
///
/// # Errors
///
/// Propagates errors from `build` and from config validation, and returns
/// [`AutogradError::GradientCheck`] if any evaluation is not finite.
///
/// # Example
/// ```
/// use scalargrad_core::{check_gradients, GradCheckConfig};
///
/// let result = check_gradients(
///     |graph, x| {
///         let y = graph.mul(x[0], x[1]);
///         Ok(graph.tanh(y))
///     },
///     &[0.3, -1.2],
///     &GradCheckConfig::default(),
/// )
/// .unwrap();
/// assert!(result.passed);
/// ```
pub fn check_gradients<F>(
    build: F,
    inputs: &[f64],
    config: &GradCheckConfig,
) -> Result<GradientCheckResult>
where
    F: Fn(&Graph, &[NodeId]) -> Result<NodeId>,
{
    config.validate()?;

    let analytical = analytical_gradients(&build, inputs)?;

    let mut numerical = Vec::with_capacity(inputs.len());
    let mut point = inputs.to_vec();
    for i in 0..inputs.len() {
        point[i] = inputs[i] + config.step;
        let f_plus = evaluate(&build, &point)?;
        point[i] = inputs[i] - config.step;
        let f_minus = evaluate(&build, &point)?;
        point[i] = inputs[i];

        let estimate = (f_plus - f_minus) / (2.0 * config.step);
        if !estimate.is_finite() {
            return Err(AutogradError::gradient_check(format!(
                "numerical gradient for input {i} is not finite"
            )));
        }
        numerical.push(estimate);
    }

    let relative_errors: Vec<f64> = analytical
        .iter()
        .zip(&numerical)
        .map(|(&a, &n)| (a - n).abs() / a.abs().max(n.abs()).max(1.0))
        .collect();

    let max_relative_error = relative_errors.iter().copied().fold(0.0, f64::max);
    let avg_relative_error = if relative_errors.is_empty() {
        0.0
    } else {
        relative_errors.iter().sum::<f64>() / relative_errors.len() as f64
    };
    let passed = relative_errors.iter().all(|&e| e <= config.tolerance);

    debug!(
        "gradient check over {} input(s): max relative error {max_relative_error:.3e}, passed = {passed}",
        inputs.len()
    );

    Ok(GradientCheckResult {
        analytical,
        numerical,
        relative_errors,
        max_relative_error,
        avg_relative_error,
        passed,
    })
}

fn build_on_fresh_graph<F>(build: &F, point: &[f64]) -> Result<(Graph, Vec<NodeId>, NodeId)>
where
    F: Fn(&Graph, &[NodeId]) -> Result<NodeId>,
{
    let graph = Graph::new();
    let leaves: Vec<NodeId> = point.iter().map(|&x| graph.leaf(x)).collect();
    let output = build(&graph, &leaves)?;
    Ok((graph, leaves, output))
}

fn evaluate<F>(build: &F, point: &[f64]) -> Result<f64>
where
    F: Fn(&Graph, &[NodeId]) -> Result<NodeId>,
{
    let (graph, _, output) = build_on_fresh_graph(build, point)?;
    let value = graph.value(output);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AutogradError::gradient_check(format!(
            "expression evaluates to {value} at {point:?}"
        )))
    }
}

fn analytical_gradients<F>(build: &F, inputs: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&Graph, &[NodeId]) -> Result<NodeId>,
{
    let (graph, leaves, output) = build_on_fresh_graph(build, inputs)?;
    let value = graph.value(output);
    if !value.is_finite() {
        return Err(AutogradError::gradient_check(format!(
            "expression evaluates to {value} at {inputs:?}"
        )));
    }
    graph.backward(output);
    Ok(leaves.iter().map(|&leaf| graph.grad(leaf)).collect())
}
