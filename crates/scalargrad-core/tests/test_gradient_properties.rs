//! Property-based tests for gradient correctness.
//!
//! Analytical gradients are compared against central differences over random
//! inputs, and the accumulation law is checked for reused nodes.

use proptest::prelude::*;
use scalargrad_core::{check_gradients, GradCheckConfig, Graph};

fn config() -> GradCheckConfig {
    GradCheckConfig::default()
}

proptest! {
    #[test]
    fn prop_add_mul_gradients(x in -5.0f64..5.0, y in -5.0f64..5.0) {
        let result = check_gradients(
            |g, v| {
                let prod = g.mul(v[0], v[1]);
                Ok(g.add(prod, v[0]))
            },
            &[x, y],
            &config(),
        ).unwrap();
        prop_assert!(result.passed, "relative errors: {:?}", result.relative_errors);
    }

    #[test]
    fn prop_sub_div_gradients(x in -5.0f64..5.0, y in 0.5f64..5.0) {
        let result = check_gradients(
            |g, v| {
                let diff = g.sub(v[0], v[1]);
                Ok(g.div(diff, v[1]))
            },
            &[x, y],
            &config(),
        ).unwrap();
        prop_assert!(result.passed, "relative errors: {:?}", result.relative_errors);
    }

    #[test]
    fn prop_pow_gradients(x in 0.1f64..4.0, p in -3.0f64..3.0) {
        let result = check_gradients(
            |g, v| Ok(g.powf(v[0], p)),
            &[x],
            &config(),
        ).unwrap();
        prop_assert!(result.passed, "relative errors: {:?}", result.relative_errors);
    }

    #[test]
    fn prop_exp_tanh_sigmoid_gradients(x in -3.0f64..3.0) {
        let result = check_gradients(
            |g, v| {
                let e = g.exp(v[0]);
                let t = g.tanh(v[0]);
                let s = g.sigmoid(v[0]);
                let et = g.mul(e, t);
                Ok(g.add(et, s))
            },
            &[x],
            &config(),
        ).unwrap();
        prop_assert!(result.passed, "relative errors: {:?}", result.relative_errors);
    }

    #[test]
    fn prop_relu_gradients_away_from_kink(x in prop_oneof![-5.0f64..-0.01, 0.01f64..5.0]) {
        let result = check_gradients(
            |g, v| {
                let r = g.relu(v[0]);
                Ok(g.mul(r, 3.0))
            },
            &[x],
            &config(),
        ).unwrap();
        prop_assert!(result.passed, "relative errors: {:?}", result.relative_errors);
    }

    #[test]
    fn prop_reused_operand_accumulates(x in -10.0f64..10.0) {
        // d(x + x)/dx = 2 and d(x * x)/dx = 2x
        let graph = Graph::new();
        let a = graph.leaf(x);
        let sum = graph.add(a, a);
        graph.backward(sum);
        prop_assert_eq!(graph.grad(a), 2.0);

        let graph = Graph::new();
        let a = graph.leaf(x);
        let square = graph.mul(a, a);
        graph.backward(square);
        prop_assert_eq!(graph.grad(a), 2.0 * x);
    }

    #[test]
    fn prop_forward_values_match_f64(x in -4.0f64..4.0, y in 0.5f64..4.0) {
        let graph = Graph::new();
        let a = graph.scalar(x);
        let b = graph.scalar(y);

        prop_assert_eq!((a + b).value(), x + y);
        prop_assert_eq!((a * b).value(), x * y);
        prop_assert_eq!((a - b).value(), x + (-y));
        prop_assert_eq!(b.powf(1.5).value(), y.powf(1.5));
        prop_assert_eq!(a.exp().value(), x.exp());
        prop_assert_eq!(a.relu().value(), if x < 0.0 { 0.0 } else { x });
        prop_assert!(((a / b).value() - x / y).abs() <= 1e-12 * (x / y).abs().max(1.0));
    }
}
