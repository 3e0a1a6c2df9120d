use ndarray::{Array1, Array2};

use crate::core::{Constraint, ConstraintParams, Error, Result};

/// Affine subspace {x : A x = b}
///
/// A ∈ R^{m×n} is assumed to have full row rank, giving k = n - m.
pub struct AffineConstraint {
    params: ConstraintParams,
    a: Array2<f64>,
    b: Array1<f64>,
}

impl AffineConstraint {
    pub fn new(a: Array2<f64>, b: Array1<f64>) -> Result<Self> {
        let (m, n) = a.dim();
        if b.len() != m {
            return Err(Error::DimensionMismatch {
                expected: m,
                got: b.len(),
            });
        }
        if m > n {
            return Err(Error::InvalidParameter(format!(
                "affine constraint needs at most as many rows as columns, got {}x{}",
                m, n
            )));
        }

        Ok(AffineConstraint {
            params: ConstraintParams::new(n, n - m)?,
            a,
            b,
        })
    }

    /// Hyperplane {x : normal · x = offset}
    pub fn hyperplane(normal: Array1<f64>, offset: f64) -> Result<Self> {
        let n = normal.len();
        let a = normal.into_shape((1, n)).map_err(|err| {
            Error::ComputationFailed(format!("could not reshape hyperplane normal: {}", err))
        })?;
        Self::new(a, Array1::from_elem(1, offset))
    }

    /// Set the projection tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        self.params = self.params.with_tolerance(tolerance)?;
        Ok(self)
    }
}

impl Constraint for AffineConstraint {
    fn params(&self) -> &ConstraintParams {
        &self.params
    }

    fn function(&self, x: &Array1<f64>) -> Array1<f64> {
        self.a.dot(x) - &self.b
    }

    fn jacobian(&self, _x: &Array1<f64>) -> Array2<f64> {
        self.a.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_affine_dimensions() {
        let plane = AffineConstraint::hyperplane(arr1(&[0.0, 0.0, 1.0]), 2.0).unwrap();
        assert_eq!(plane.ambient_dim(), 3);
        assert_eq!(plane.manifold_dim(), 2);

        assert!(AffineConstraint::new(arr2(&[[1.0, 0.0]]), arr1(&[1.0, 2.0])).is_err());
        assert!(AffineConstraint::new(
            arr2(&[[1.0], [2.0]]),
            arr1(&[1.0, 2.0])
        )
        .is_err());
    }

    #[test]
    fn test_affine_projection_is_one_newton_step() {
        let line = AffineConstraint::new(
            arr2(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            arr1(&[1.0, -1.0]),
        )
        .unwrap()
        .with_tolerance(1e-12)
        .unwrap();

        let mut x = arr1(&[4.0, 3.0, 7.0]);
        assert!(line.project(&mut x).unwrap());

        // Minimum-norm correction leaves the free coordinate alone
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 7.0, epsilon = 1e-12);
    }
}
