use ndarray::{s, Array1, Array2};
use tracing::debug;

use crate::core::{Constraint, ConstraintParams, Error, Result};

/// Intersection of several manifolds sharing one ambient space
///
/// Residuals and Jacobians of the members are stacked in order, so the
/// co-dimension is the sum of the members' co-dimensions.
pub struct ConstraintIntersection {
    params: ConstraintParams,
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintIntersection {
    pub fn new(ambient_dim: usize, constraints: Vec<Box<dyn Constraint>>) -> Result<Self> {
        let mut co_dim = 0;
        for constraint in &constraints {
            if constraint.ambient_dim() != ambient_dim {
                return Err(Error::DimensionMismatch {
                    expected: ambient_dim,
                    got: constraint.ambient_dim(),
                });
            }
            co_dim += constraint.co_dim();
        }

        if co_dim > ambient_dim {
            return Err(Error::InvalidParameter(format!(
                "intersection is over-constrained: co-dimension {} in ambient dimension {}",
                co_dim, ambient_dim
            )));
        }

        debug!(
            ambient_dim,
            co_dim,
            members = constraints.len(),
            "built constraint intersection"
        );

        Ok(ConstraintIntersection {
            params: ConstraintParams::new(ambient_dim, ambient_dim - co_dim)?,
            constraints,
        })
    }

    /// Set the projection tolerance of the combined constraint
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        self.params = self.params.with_tolerance(tolerance)?;
        Ok(self)
    }

    /// Set the projection iteration bound of the combined constraint
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self> {
        self.params = self.params.with_max_iterations(max_iterations)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl Constraint for ConstraintIntersection {
    fn params(&self) -> &ConstraintParams {
        &self.params
    }

    fn function(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(self.co_dim());
        let mut row = 0;
        for constraint in &self.constraints {
            let m = constraint.co_dim();
            out.slice_mut(s![row..row + m]).assign(&constraint.function(x));
            row += m;
        }
        out
    }

    fn jacobian(&self, x: &Array1<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.co_dim(), self.ambient_dim()));
        let mut row = 0;
        for constraint in &self.constraints {
            let m = constraint.co_dim();
            out.slice_mut(s![row..row + m, ..])
                .assign(&constraint.jacobian(x));
            row += m;
        }
        out
    }
}
