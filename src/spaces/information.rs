use std::fmt;
use std::sync::Arc;

use ndarray::Array1;

use crate::spaces::real_vector::StateSpace;

/// Decides whether a state is feasible (collision-free, within limits, ...)
pub trait StateValidityChecker: Send + Sync {
    fn is_valid(&self, state: &Array1<f64>) -> bool;
}

impl<F> StateValidityChecker for F
where
    F: Fn(&Array1<f64>) -> bool + Send + Sync,
{
    fn is_valid(&self, state: &Array1<f64>) -> bool {
        self(state)
    }
}

/// Accepts every state
#[derive(Debug, Clone, Copy, Default)]
pub struct AllValid;

impl StateValidityChecker for AllValid {
    fn is_valid(&self, _state: &Array1<f64>) -> bool {
        true
    }
}

/// A state space bundled with the validity checker planners query
#[derive(Clone)]
pub struct SpaceInformation {
    space: Arc<dyn StateSpace>,
    checker: Arc<dyn StateValidityChecker>,
}

impl SpaceInformation {
    /// Space information that accepts every state
    pub fn new(space: Arc<dyn StateSpace>) -> Self {
        SpaceInformation {
            space,
            checker: Arc::new(AllValid),
        }
    }

    /// Set the validity checker
    pub fn with_state_validity_checker(mut self, checker: Arc<dyn StateValidityChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn state_space(&self) -> &Arc<dyn StateSpace> {
        &self.space
    }

    pub fn state_validity_checker(&self) -> &Arc<dyn StateValidityChecker> {
        &self.checker
    }

    pub fn is_valid(&self, state: &Array1<f64>) -> bool {
        self.checker.is_valid(state)
    }
}

impl fmt::Debug for SpaceInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceInformation")
            .field("kind", &self.space.kind())
            .field("dimension", &self.space.dimension())
            .finish()
    }
}
