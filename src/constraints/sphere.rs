use ndarray::{Array1, Array2};
use ndarray_linalg::Norm;

use crate::core::{Constraint, ConstraintParams, Error, Result};

/// Sphere of a given radius around a center, F(x) = ‖x - c‖ - r
///
/// A hypersurface: co-dimension 1, so k = n - 1.
pub struct SphereConstraint {
    params: ConstraintParams,
    center: Array1<f64>,
    radius: f64,
}

impl SphereConstraint {
    /// Sphere with the given center and radius in R^n, n = center.len()
    pub fn new(center: Array1<f64>, radius: f64) -> Result<Self> {
        if center.is_empty() {
            return Err(Error::InvalidParameter(
                "sphere needs an ambient dimension of at least 1".to_string(),
            ));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "sphere radius must be finite and positive, got {}",
                radius
            )));
        }

        let n = center.len();
        Ok(SphereConstraint {
            params: ConstraintParams::new(n, n - 1)?,
            center,
            radius,
        })
    }

    /// Unit sphere around the origin of R^n
    pub fn unit(n: usize) -> Result<Self> {
        Self::new(Array1::zeros(n), 1.0)
    }

    /// Set the projection tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        self.params = self.params.with_tolerance(tolerance)?;
        Ok(self)
    }

    /// Set the projection iteration bound
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self> {
        self.params = self.params.with_max_iterations(max_iterations)?;
        Ok(self)
    }

    pub fn center(&self) -> &Array1<f64> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Constraint for SphereConstraint {
    fn params(&self) -> &ConstraintParams {
        &self.params
    }

    fn function(&self, x: &Array1<f64>) -> Array1<f64> {
        let offset = x - &self.center;
        Array1::from_elem(1, offset.norm_l2() - self.radius)
    }

    /// Gradient of the distance to the center, (x - c)ᵀ / ‖x - c‖
    fn jacobian(&self, x: &Array1<f64>) -> Array2<f64> {
        let offset = x - &self.center;
        let norm = offset.norm_l2();

        // Not differentiable at the center; report a zero row
        if norm < 1e-12 {
            return Array2::zeros((1, x.len()));
        }

        (offset / norm).insert_axis(ndarray::Axis(0))
    }
}
