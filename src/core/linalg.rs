//! Dense linear algebra used by projection and traversal.
//!
//! Two primitives are needed for rectangular Jacobians J ∈ R^{m×n} (m ≤ n,
//! possibly rank deficient):
//! - the minimum-norm least-squares solution of J·Δ = f
//! - an orthonormal basis of ker(J), the tangent space of the manifold
//!
//! Both come from the SVD J = U Σ V^T: the first `rank` rows of V^T span
//! the row space, the remaining rows span the null space.

use ndarray::{s, Array1, Array2};
use ndarray_linalg::{LeastSquaresSvd, SVD};

use crate::core::error::{Error, Result};

/// Minimum-norm least-squares solution of `a · x = b`
pub fn least_squares(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    if a.nrows() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }

    // LAPACK rejects empty systems; with no equations every x solves, pick 0
    if a.nrows() == 0 || a.ncols() == 0 {
        return Ok(Array1::zeros(a.ncols()));
    }

    let result = a.least_squares(b)?;
    Ok(result.solution)
}

/// Orthonormal basis of the null space of `a`, one basis vector per column
pub fn null_space(a: &Array2<f64>) -> Result<Array2<f64>> {
    Ok(JacobianFactorization::new(a)?.null_space())
}

/// Rank-revealing factorization of a constraint Jacobian
pub struct JacobianFactorization {
    u: Array2<f64>,
    singular_values: Array1<f64>,
    vt: Array2<f64>,
    rank: usize,
}

impl JacobianFactorization {
    /// Factor an m×n Jacobian
    pub fn new(j: &Array2<f64>) -> Result<Self> {
        let (m, n) = j.dim();

        if m == 0 || n == 0 {
            return Ok(JacobianFactorization {
                u: Array2::eye(m),
                singular_values: Array1::zeros(0),
                vt: Array2::eye(n),
                rank: 0,
            });
        }

        let (u, singular_values, vt) = j.svd(true, true)?;
        let u = u.ok_or_else(|| Error::ComputationFailed("SVD failed to compute U".to_string()))?;
        let vt =
            vt.ok_or_else(|| Error::ComputationFailed("SVD failed to compute V^T".to_string()))?;

        // Same cutoff LAPACK uses for numerical rank
        let sigma_max = singular_values.iter().cloned().fold(0.0_f64, f64::max);
        let threshold = f64::EPSILON * (m.max(n) as f64) * sigma_max;
        let rank = singular_values.iter().filter(|&&sv| sv > threshold).count();

        Ok(JacobianFactorization {
            u,
            singular_values,
            vt,
            rank,
        })
    }

    /// Numerical rank of the factored matrix
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Minimum-norm least-squares solution of J·x = f, i.e. J⁺f
    pub fn solve(&self, f: &Array1<f64>) -> Result<Array1<f64>> {
        if f.len() != self.u.nrows() {
            return Err(Error::DimensionMismatch {
                expected: self.u.nrows(),
                got: f.len(),
            });
        }

        let r = self.rank;
        let coefficients = self.u.slice(s![.., ..r]).t().dot(f) / &self.singular_values.slice(s![..r]);
        Ok(self.vt.slice(s![..r, ..]).t().dot(&coefficients))
    }

    /// Orthonormal null-space basis N ∈ R^{n×(n-rank)}
    pub fn null_space(&self) -> Array2<f64> {
        self.vt.slice(s![self.rank.., ..]).t().to_owned()
    }

    /// Component of `v` lying in ker(J): N Nᵀ v
    ///
    /// Invariant under any reordering of the basis columns.
    pub fn project_tangent(&self, v: &Array1<f64>) -> Array1<f64> {
        let basis = self.vt.slice(s![self.rank.., ..]);
        basis.t().dot(&basis.dot(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, Axis};

    #[test]
    fn test_least_squares_underdetermined_minimum_norm() {
        // x + y = 2 has minimum-norm solution (1, 1)
        let a = arr2(&[[1.0, 1.0]]);
        let b = arr1(&[2.0]);

        let x = least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_least_squares_empty_system() {
        let a = Array2::<f64>::zeros((0, 3));
        let b = Array1::<f64>::zeros(0);

        let x = least_squares(&a, &b).unwrap();
        assert_eq!(x.len(), 3);
        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_least_squares_dimension_mismatch() {
        let a = arr2(&[[1.0, 0.0]]);
        let b = arr1(&[1.0, 2.0]);
        assert!(least_squares(&a, &b).is_err());
    }

    #[test]
    fn test_factorization_matches_least_squares() {
        let j = arr2(&[[1.0, 2.0, 0.5], [0.0, 1.0, -1.0]]);
        let f = arr1(&[0.3, -0.7]);

        let factor = JacobianFactorization::new(&j).unwrap();
        assert_eq!(factor.rank(), 2);

        let x_svd = factor.solve(&f).unwrap();
        let x_lstsq = least_squares(&j, &f).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x_svd[i], x_lstsq[i], epsilon = 1e-10);
        }

        let residual = j.dot(&x_svd) - &f;
        assert!(residual.iter().all(|r| r.abs() < 1e-10));
    }

    #[test]
    fn test_null_space_is_orthonormal_kernel() {
        let j = arr2(&[[1.0, 2.0, 0.5, 0.0], [0.0, 1.0, -1.0, 3.0]]);

        let n = null_space(&j).unwrap();
        assert_eq!(n.dim(), (4, 2));

        let jn = j.dot(&n);
        assert!(jn.iter().all(|v| v.abs() < 1e-10));

        let ntn = n.t().dot(&n);
        let identity: Array2<f64> = Array2::eye(2);
        for (a, b) in ntn.iter().zip(identity.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rank_deficient_jacobian() {
        let j = arr2(&[[1.0, 1.0, 0.0], [2.0, 2.0, 0.0]]);

        let factor = JacobianFactorization::new(&j).unwrap();
        assert_eq!(factor.rank(), 1);
        assert_eq!(factor.null_space().ncols(), 2);
    }

    #[test]
    fn test_tangent_projection_ignores_column_order() {
        let j = arr2(&[[0.0, 0.0, 1.0]]);
        let v = arr1(&[0.3, -0.2, 0.9]);

        let factor = JacobianFactorization::new(&j).unwrap();
        let projected = factor.project_tangent(&v);

        let mut reversed = factor.null_space();
        reversed.invert_axis(Axis(1));
        let projected_reversed = reversed.dot(&reversed.t().dot(&v));

        assert_relative_eq!(projected[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(projected[1], -0.2, epsilon = 1e-12);
        assert_relative_eq!(projected[2], 0.0, epsilon = 1e-12);
        for i in 0..3 {
            assert_relative_eq!(projected[i], projected_reversed[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_jacobian_has_full_null_space() {
        let j = Array2::<f64>::zeros((0, 3));
        let v = arr1(&[1.0, 2.0, 3.0]);

        let factor = JacobianFactorization::new(&j).unwrap();
        assert_eq!(factor.rank(), 0);
        assert_eq!(factor.project_tangent(&v), v);
        assert_eq!(factor.solve(&Array1::zeros(0)).unwrap(), Array1::<f64>::zeros(3));
    }
}
