use ndarray::{Array1, Array2};

use crate::core::{numeric_jacobian, Constraint, ConstraintParams};

type ResidualFn = dyn Fn(&Array1<f64>) -> Array1<f64> + Send + Sync;
type JacobianFn = dyn Fn(&Array1<f64>) -> Array2<f64> + Send + Sync;

/// Constraint backed by user-provided closures
///
/// Without an explicit Jacobian closure the numeric default is used.
pub struct FnConstraint {
    params: ConstraintParams,
    function: Box<ResidualFn>,
    jacobian: Option<Box<JacobianFn>>,
}

impl FnConstraint {
    pub fn new<F>(params: ConstraintParams, function: F) -> Self
    where
        F: Fn(&Array1<f64>) -> Array1<f64> + Send + Sync + 'static,
    {
        FnConstraint {
            params,
            function: Box::new(function),
            jacobian: None,
        }
    }

    /// Supply an analytic Jacobian
    pub fn with_jacobian<J>(mut self, jacobian: J) -> Self
    where
        J: Fn(&Array1<f64>) -> Array2<f64> + Send + Sync + 'static,
    {
        self.jacobian = Some(Box::new(jacobian));
        self
    }
}

impl Constraint for FnConstraint {
    fn params(&self) -> &ConstraintParams {
        &self.params
    }

    fn function(&self, x: &Array1<f64>) -> Array1<f64> {
        (self.function)(x)
    }

    fn jacobian(&self, x: &Array1<f64>) -> Array2<f64> {
        match &self.jacobian {
            Some(jacobian) => jacobian(x),
            None => numeric_jacobian(x, self.co_dim(), |y| (self.function)(y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn paraboloid_params() -> ConstraintParams {
        ConstraintParams::new(3, 2).unwrap()
    }

    #[test]
    fn test_closure_constraint_numeric_jacobian() {
        // z = x² + y²
        let paraboloid = FnConstraint::new(paraboloid_params(), |x| {
            arr1(&[x[0] * x[0] + x[1] * x[1] - x[2]])
        });

        let j = paraboloid.jacobian(&arr1(&[1.0, -2.0, 0.0]));
        assert_relative_eq!(j[[0, 0]], 2.0, epsilon = 1e-7);
        assert_relative_eq!(j[[0, 1]], -4.0, epsilon = 1e-7);
        assert_relative_eq!(j[[0, 2]], -1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_closure_constraint_analytic_jacobian() {
        let paraboloid = FnConstraint::new(paraboloid_params(), |x| {
            arr1(&[x[0] * x[0] + x[1] * x[1] - x[2]])
        })
        .with_jacobian(|x| arr2(&[[2.0 * x[0], 2.0 * x[1], -1.0]]));

        let j = paraboloid.jacobian(&arr1(&[0.5, 0.25, 0.0]));
        assert_eq!(j, arr2(&[[1.0, 0.5, -1.0]]));

        let mut x = arr1(&[1.0, 1.0, 0.0]);
        assert!(paraboloid.project(&mut x).unwrap());
        assert!(paraboloid.is_satisfied(&x).unwrap());
    }
}
