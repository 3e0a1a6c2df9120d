use ndarray::{Array1, Array2};
use ndarray_linalg::Norm;
use tracing::trace;

use crate::core::config::ConstraintParams;
use crate::core::error::{Error, Result};
use crate::core::linalg::least_squares;

/// An implicit manifold {x ∈ R^n : F(x) = 0} with F: R^n → R^m
///
/// Implementors supply `params` and the residual `function`; everything else
/// has a default. Override `jacobian` when an analytic derivative is known.
///
/// `function` and `jacobian` are the unchecked fast path: they assume `x` has
/// `ambient_dim()` entries. The remaining methods validate their input first.
///
/// Implementations are queried concurrently through shared references, so
/// `function` and `jacobian` must not rely on interior mutability.
pub trait Constraint: Send + Sync {
    /// Dimensions and projection settings, fixed for the constraint's lifetime
    fn params(&self) -> &ConstraintParams;

    /// Residual F(x) ∈ R^m, zero exactly on the manifold (unchecked)
    fn function(&self, x: &Array1<f64>) -> Array1<f64>;

    /// Jacobian J(x) ∈ R^{m×n} of `function` (unchecked)
    ///
    /// Default: numeric differentiation, see [`numeric_jacobian`].
    fn jacobian(&self, x: &Array1<f64>) -> Array2<f64> {
        numeric_jacobian(x, self.co_dim(), |y| self.function(y))
    }

    /// Ambient dimension n
    fn ambient_dim(&self) -> usize {
        self.params().ambient_dim()
    }

    /// Intrinsic manifold dimension k
    fn manifold_dim(&self) -> usize {
        self.params().manifold_dim()
    }

    /// Residual dimension m = n - k
    fn co_dim(&self) -> usize {
        self.params().co_dim()
    }

    /// Validate that a point has the ambient dimension
    fn validate_point(&self, x: &Array1<f64>) -> Result<()> {
        if x.len() != self.ambient_dim() {
            return Err(Error::DimensionMismatch {
                expected: self.ambient_dim(),
                got: x.len(),
            });
        }
        Ok(())
    }

    /// Residual with validation of the input and output dimensions
    fn residual(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.validate_point(x)?;
        let f = self.function(x);
        if f.len() != self.co_dim() {
            return Err(Error::DimensionMismatch {
                expected: self.co_dim(),
                got: f.len(),
            });
        }
        Ok(f)
    }

    /// Jacobian with validation of the input dimension and output shape
    fn evaluate_jacobian(&self, x: &Array1<f64>) -> Result<Array2<f64>> {
        self.validate_point(x)?;
        let j = self.jacobian(x);
        if j.dim() != (self.co_dim(), self.ambient_dim()) {
            return Err(Error::DimensionMismatch {
                expected: self.co_dim() * self.ambient_dim(),
                got: j.len(),
            });
        }
        Ok(j)
    }

    /// Project `x` onto the manifold in place with Newton's method
    ///
    /// Each iteration solves J·Δ = F for the minimum-norm Δ and sets x ← x - Δ.
    /// Returns `Ok(false)` when the tolerance is still violated after
    /// `max_iterations` steps; `x` then holds the last iterate.
    fn project(&self, x: &mut Array1<f64>) -> Result<bool> {
        self.validate_point(x)?;

        let tolerance = self.params().tolerance();
        let max_iterations = self.params().max_iterations();

        let mut f = self.function(x);
        let mut iterations = 0;
        while f.norm_l2() > tolerance {
            if iterations == max_iterations {
                trace!(iterations, residual = f.norm_l2(), "projection did not converge");
                return Ok(false);
            }
            iterations += 1;

            let j = self.jacobian(x);
            let step = match least_squares(&j, &f) {
                Ok(step) => step,
                Err(err) => {
                    trace!(%err, "projection step could not be solved");
                    return Ok(false);
                }
            };
            *x -= &step;
            f = self.function(x);
        }

        // A NaN residual also leaves the loop above
        Ok(f.norm_l2() <= tolerance)
    }

    /// Distance to the manifold, ‖F(x)‖
    fn distance(&self, x: &Array1<f64>) -> Result<f64> {
        Ok(self.residual(x)?.norm_l2())
    }

    /// Whether `x` is finite and within tolerance of the manifold
    fn is_satisfied(&self, x: &Array1<f64>) -> Result<bool> {
        let distance = self.distance(x)?;
        Ok(x.iter().all(|v| v.is_finite()) && distance <= self.params().tolerance())
    }
}

/// Numeric Jacobian of `function` at `x`, one column per coordinate
///
/// Column j uses h = sqrt(ε)·max(|x_j|, 1) and central differences at h, 2h
/// and 3h, combined as 1.5·m1 - 0.6·m2 + 0.1·m3 to cancel the leading
/// truncation terms.
pub fn numeric_jacobian<F>(x: &Array1<f64>, m: usize, function: F) -> Array2<f64>
where
    F: Fn(&Array1<f64>) -> Array1<f64>,
{
    let n = x.len();
    let mut out = Array2::zeros((m, n));
    let mut y1 = x.clone();
    let mut y2 = x.clone();

    for j in 0..n {
        let h = f64::EPSILON.sqrt() * x[j].abs().max(1.0);

        // Divide by the realized spacing, which need not be exactly 2h
        let mut central = || {
            y1[j] += h;
            y2[j] -= h;
            (function(&y1) - function(&y2)) / (y1[j] - y2[j])
        };
        let m1 = central();
        let m2 = central();
        let m3 = central();

        out.column_mut(j).assign(&(1.5 * m1 - 0.6 * m2 + 0.1 * m3));

        y1[j] = x[j];
        y2[j] = x[j];
    }

    out
}
