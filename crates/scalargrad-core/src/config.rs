//! Configuration for the backward pass and gradient checking.

use crate::error::{AutogradError, Result};

/// What the backward pass does when reachable gradients are already non-zero.
///
/// The engine never zeroes gradients itself. Running a second backward pass
/// over nodes that still hold gradients from a previous pass adds to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleGradientPolicy {
    /// Accumulate silently.
    Ignore,
    /// Accumulate, but log a warning naming the number of affected nodes.
    #[default]
    Warn,
    /// Refuse to run and return [`AutogradError::StaleGradient`].
    Reject,
}

/// Configuration for [`crate::backward::compute_gradients_with`].
#[derive(Debug, Clone)]
pub struct BackwardConfig {
    /// Gradient assigned to the output node before propagation
    pub seed: f64,

    /// Handling of non-zero gradients found before seeding
    pub stale_gradients: StaleGradientPolicy,
}

impl Default for BackwardConfig {
    fn default() -> Self {
        Self {
            seed: 1.0,
            stale_gradients: StaleGradientPolicy::default(),
        }
    }
}

impl BackwardConfig {
    /// Creates a new backward configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed gradient of the output node.
    pub const fn with_seed(mut self, seed: f64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the stale gradient policy.
    pub const fn with_stale_gradients(mut self, policy: StaleGradientPolicy) -> Self {
        self.stale_gradients = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.seed.is_finite() {
            return Err(AutogradError::invalid_configuration(format!(
                "seed must be finite, got {}",
                self.seed
            )));
        }
        Ok(())
    }
}

/// Configuration for finite-difference gradient checking.
#[derive(Debug, Clone)]
pub struct GradCheckConfig {
    /// Step size `h` of the central difference `(f(x+h) - f(x-h)) / 2h`
    pub step: f64,

    /// Maximum accepted relative error per input
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            step: 1e-6,
            tolerance: 1e-4,
        }
    }
}

impl GradCheckConfig {
    /// Creates a new gradient check configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the finite-difference step size.
    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Sets the relative error tolerance.
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(AutogradError::invalid_configuration(format!(
                "step must be positive and finite, got {}",
                self.step
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AutogradError::invalid_configuration(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
