use tracing::debug;

use crate::core::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance on the residual norm for a point to count as on the manifold.
pub const DEFAULT_PROJECTION_TOLERANCE: f64 = 1e-4;

/// Default bound on Newton iterations in `Constraint::project`.
pub const DEFAULT_PROJECTION_MAX_ITERATIONS: u32 = 50;

/// Default ambient step length used when walking along the manifold.
pub const DEFAULT_DELTA: f64 = 0.05;

/// Default bound on (geodesic length) / (ambient distance).
pub const DEFAULT_LAMBDA: f64 = 2.0;

/// Fixed configuration of an implicit manifold constraint
///
/// The manifold has intrinsic dimension `k` inside an ambient space of
/// dimension `n`, so residuals have `m = n - k` entries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintParams {
    ambient_dim: usize,
    manifold_dim: usize,
    tolerance: f64,
    max_iterations: u32,
}

impl ConstraintParams {
    /// Create parameters for a `k`-dimensional manifold in R^n
    pub fn new(ambient_dim: usize, manifold_dim: usize) -> Result<Self> {
        if manifold_dim > ambient_dim {
            debug!(ambient_dim, manifold_dim, "rejected constraint dimensions");
            return Err(Error::InvalidParameter(format!(
                "manifold dimension must not exceed ambient dimension, got k={}, n={}",
                manifold_dim, ambient_dim
            )));
        }

        Ok(Self {
            ambient_dim,
            manifold_dim,
            tolerance: DEFAULT_PROJECTION_TOLERANCE,
            max_iterations: DEFAULT_PROJECTION_MAX_ITERATIONS,
        })
    }

    /// Set the projection tolerance (finite, non-negative)
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            debug!(tolerance, "rejected projection tolerance");
            return Err(Error::InvalidParameter(format!(
                "projection tolerance must be finite and non-negative, got {}",
                tolerance
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Set the maximum number of Newton iterations (positive)
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self> {
        if max_iterations == 0 {
            debug!("rejected zero projection iteration bound");
            return Err(Error::InvalidParameter(
                "projection max iterations must be positive".to_string(),
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    /// Ambient dimension n
    pub fn ambient_dim(&self) -> usize {
        self.ambient_dim
    }

    /// Intrinsic manifold dimension k
    pub fn manifold_dim(&self) -> usize {
        self.manifold_dim
    }

    /// Residual dimension m = n - k
    pub fn co_dim(&self) -> usize {
        self.ambient_dim - self.manifold_dim
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

/// Discretization settings for walking along a constrained manifold
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraversalConfig {
    /// Ambient step length taken toward the target before correction
    pub delta: f64,
    /// Maximum ratio of discrete geodesic length to ambient distance
    pub lambda: f64,
    /// When set, the walk blocks after `ceil(max_steps_factor * dist / delta)`
    /// accepted steps; unbounded by default
    pub max_steps_factor: Option<f64>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            lambda: DEFAULT_LAMBDA,
            max_steps_factor: None,
        }
    }
}

impl TraversalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step length
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Set the geodesic length ratio bound
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the step budget multiplier
    pub fn with_max_steps_factor(mut self, max_steps_factor: f64) -> Self {
        self.max_steps_factor = Some(max_steps_factor);
        self
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "delta must be finite and positive, got {}",
                self.delta
            )));
        }
        if !self.lambda.is_finite() || self.lambda <= 1.0 {
            return Err(Error::InvalidParameter(format!(
                "lambda must be finite and greater than 1, got {}",
                self.lambda
            )));
        }
        if let Some(factor) = self.max_steps_factor {
            if !factor.is_finite() || factor < 1.0 {
                return Err(Error::InvalidParameter(format!(
                    "max_steps_factor must be finite and at least 1, got {}",
                    factor
                )));
            }
        }
        Ok(())
    }

    /// Number of accepted steps a walk covering `dist` may take, if bounded
    pub fn step_budget(&self, dist: f64) -> Option<usize> {
        self.max_steps_factor
            .map(|factor| (factor * dist / self.delta).ceil() as usize)
    }
}
