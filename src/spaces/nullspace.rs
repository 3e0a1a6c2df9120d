//! Constrained state space that walks along the manifold by nullspace correction.
//!
//! A walk from `from` toward `to` repeats:
//! 1. a straight ambient step of length `delta` toward `to`
//! 2. a first-order correction linearized at the last accepted point `p`:
//!
//!    ```text
//!    p' = p - J⁺ F(p) + N Nᵀ (trial - p)
//!    ```
//!
//!    where J = ∂F(p), J⁺F(p) restores the constraint along the normal space
//!    and N is an orthonormal basis of ker(J), keeping only the tangential
//!    part of the raw step
//! 3. acceptance: `p'` must be valid (unless only interpolating), within
//!    `2·delta` of `p`, and strictly closer to `to` than `p` was.

use std::sync::Arc;

use ndarray::Array1;
use tracing::{debug, trace};

use crate::core::{Constraint, Error, JacobianFactorization, Result, TraversalConfig};
use crate::spaces::information::{AllValid, SpaceInformation, StateValidityChecker};
use crate::spaces::real_vector::{RealVectorSpace, SpaceKind, StateSpace};

/// Outcome of a walk along the manifold
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// States visited, starting with a copy of `from`; ends with `to` iff `reached`
    pub path: Vec<Array1<f64>>,
    /// Whether the walk arrived within one step of `to`
    pub reached: bool,
}

/// Ambient space `A` restricted to the zero set of a constraint
pub struct NullspaceSpace<A: StateSpace = RealVectorSpace> {
    ambient: A,
    constraint: Arc<dyn Constraint>,
    config: TraversalConfig,
    checker: Arc<dyn StateValidityChecker>,
}

impl<A: StateSpace> NullspaceSpace<A> {
    /// Constrain `ambient` to the manifold of `constraint`
    pub fn new(ambient: A, constraint: Arc<dyn Constraint>, config: TraversalConfig) -> Result<Self> {
        if constraint.ambient_dim() != ambient.dimension() {
            debug!(
                space = ambient.dimension(),
                constraint = constraint.ambient_dim(),
                "constraint does not match ambient space"
            );
            return Err(Error::DimensionMismatch {
                expected: ambient.dimension(),
                got: constraint.ambient_dim(),
            });
        }
        config.validate()?;

        debug!(
            ambient_dim = constraint.ambient_dim(),
            manifold_dim = constraint.manifold_dim(),
            delta = config.delta,
            lambda = config.lambda,
            "created nullspace state space"
        );

        Ok(NullspaceSpace {
            ambient,
            constraint,
            config,
            checker: Arc::new(AllValid),
        })
    }

    /// Fail unless `si` is backed by a nullspace state space
    pub fn check_space(si: &SpaceInformation) -> Result<()> {
        let got = si.state_space().kind();
        if got != SpaceKind::Nullspace {
            debug!(?got, "space information is not backed by a nullspace state space");
            return Err(Error::IncompatibleSpace {
                expected: SpaceKind::Nullspace,
                got,
            });
        }
        Ok(())
    }

    /// Check `si` and adopt its validity checker for walks
    pub fn setup(&mut self, si: &SpaceInformation) -> Result<()> {
        Self::check_space(si)?;
        self.checker = Arc::clone(si.state_validity_checker());
        Ok(())
    }

    /// Use `checker` to accept or reject intermediate states
    pub fn with_state_validity_checker(mut self, checker: Arc<dyn StateValidityChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn constraint(&self) -> &Arc<dyn Constraint> {
        &self.constraint
    }

    pub fn ambient(&self) -> &A {
        &self.ambient
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Walk from `from` toward `to` along the manifold
    ///
    /// With `interpolate` set, intermediate states skip the validity checker.
    /// When `state_list` is given it is cleared and filled with the visited
    /// states. Returns whether `to` was reached; `Err` only for states of
    /// the wrong dimension.
    pub fn traverse_manifold(
        &self,
        from: &Array1<f64>,
        to: &Array1<f64>,
        interpolate: bool,
        mut state_list: Option<&mut Vec<Array1<f64>>>,
    ) -> Result<bool> {
        self.ambient.validate_point(from)?;
        self.ambient.validate_point(to)?;

        if let Some(list) = state_list.as_deref_mut() {
            list.clear();
        }

        if self.ambient.valid_segment_count(from, to) == 0 {
            if let Some(list) = state_list.as_deref_mut() {
                list.push(from.clone());
            }
            return Ok(true);
        }

        if !self.constraint.is_satisfied(from)? {
            return Ok(false);
        }

        if let Some(list) = state_list.as_deref_mut() {
            list.push(from.clone());
        }

        let delta = self.config.delta;
        let mut dist = self.ambient.distance(from, to);
        let budget = self.config.step_budget(dist);
        let mut previous = from.clone();
        let mut steps = 0;

        let reached = loop {
            if dist < delta + f64::EPSILON {
                break true;
            }
            if budget == Some(steps) {
                trace!(steps, "step budget exhausted");
                break false;
            }

            let trial = self.ambient.interpolate(&previous, to, delta / dist);

            let f = self.constraint.function(&previous);
            let j = self.constraint.jacobian(&previous);
            let factorization = match JacobianFactorization::new(&j) {
                Ok(factorization) => factorization,
                Err(err) => {
                    trace!(%err, "jacobian factorization failed");
                    break false;
                }
            };
            let normal = match factorization.solve(&f) {
                Ok(normal) => normal,
                Err(err) => {
                    trace!(%err, "normal correction failed");
                    break false;
                }
            };
            let tangent = factorization.project_tangent(&(&trial - &previous));
            let corrected = &previous - &normal + &tangent;

            let valid = interpolate || self.checker.is_valid(&corrected);
            let deviated = self.ambient.distance(&previous, &corrected) > 2.0 * delta;
            if !valid || deviated {
                break false;
            }

            if let Some(list) = state_list.as_deref_mut() {
                list.push(corrected.clone());
            }

            // Diverged unless strictly closer than before; NaN counts as diverged
            let new_dist = self.ambient.distance(&corrected, to);
            if !(new_dist < dist) {
                break false;
            }

            dist = new_dist;
            previous = corrected;
            steps += 1;
        };

        if reached {
            if let Some(list) = state_list.as_deref_mut() {
                list.push(to.clone());
            }
        }

        Ok(reached)
    }

    /// Walk from `from` toward `to`, collecting the visited states
    pub fn traverse(&self, from: &Array1<f64>, to: &Array1<f64>, interpolate: bool) -> Result<Traversal> {
        let mut path = Vec::new();
        let reached = self.traverse_manifold(from, to, interpolate, Some(&mut path))?;
        Ok(Traversal { path, reached })
    }

    /// Walk, then reject paths longer than `lambda` times the ambient distance
    pub fn discrete_geodesic(
        &self,
        from: &Array1<f64>,
        to: &Array1<f64>,
        interpolate: bool,
    ) -> Result<Traversal> {
        let mut traversal = self.traverse(from, to, interpolate)?;
        if traversal.reached {
            let length = self.path_length(&traversal.path);
            let direct = self.ambient.distance(from, to);
            traversal.reached = length <= self.config.lambda * direct;
        }
        Ok(traversal)
    }

    /// Whether the motion from `from` to `to` stays valid along the manifold
    pub fn check_motion(&self, from: &Array1<f64>, to: &Array1<f64>) -> Result<bool> {
        Ok(self.discrete_geodesic(from, to, false)?.reached)
    }

    /// Sum of ambient distances between consecutive states of `path`
    pub fn path_length(&self, path: &[Array1<f64>]) -> f64 {
        path.windows(2)
            .map(|pair| self.ambient.distance(&pair[0], &pair[1]))
            .sum()
    }

    /// The state of `path` nearest to fraction `t` of its length
    ///
    /// Returns `None` for an empty path.
    pub fn geodesic_interpolate<'a>(&self, path: &'a [Array1<f64>], t: f64) -> Option<&'a Array1<f64>> {
        let first = path.first()?;

        let mut cumulative = Vec::with_capacity(path.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in path.windows(2) {
            total += self.ambient.distance(&pair[0], &pair[1]);
            cumulative.push(total);
        }

        if total <= f64::EPSILON {
            return Some(first);
        }

        let target = t * total;
        let upper = cumulative
            .iter()
            .position(|&d| d >= target)
            .unwrap_or(path.len() - 1);
        if upper == 0 {
            return Some(first);
        }

        let lower = upper - 1;
        if target - cumulative[lower] < cumulative[upper] - target {
            Some(&path[lower])
        } else {
            Some(&path[upper])
        }
    }

    /// State at fraction `t` of the way along the manifold from `from` to `to`
    ///
    /// Falls back to `from` when the walk yields fewer than two states.
    pub fn interpolate_on_manifold(&self, from: &Array1<f64>, to: &Array1<f64>, t: f64) -> Result<Array1<f64>> {
        let traversal = self.discrete_geodesic(from, to, true)?;
        if traversal.path.len() < 2 {
            return Ok(from.clone());
        }
        Ok(self
            .geodesic_interpolate(&traversal.path, t)
            .unwrap_or(from)
            .clone())
    }
}

impl<A: StateSpace> StateSpace for NullspaceSpace<A> {
    fn kind(&self) -> SpaceKind {
        SpaceKind::Nullspace
    }

    fn dimension(&self) -> usize {
        self.ambient.dimension()
    }

    fn distance(&self, a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        self.ambient.distance(a, b)
    }

    fn interpolate(&self, from: &Array1<f64>, to: &Array1<f64>, t: f64) -> Array1<f64> {
        self.interpolate_on_manifold(from, to, t)
            .unwrap_or_else(|_| from.clone())
    }

    fn valid_segment_count(&self, a: &Array1<f64>, b: &Array1<f64>) -> usize {
        self.ambient.valid_segment_count(a, b)
    }
}
