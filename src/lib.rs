//! Implicit manifold constraints and constrained motion interpolation.
//!
//! - `Constraint`: a manifold given as the zero set of a residual F: R^n → R^m,
//!   with numeric Jacobians, Newton projection and satisfaction queries
//! - `NullspaceSpace`: walks between two manifold points by alternating
//!   ambient steps with normal/tangential correction

pub mod constraints;
pub mod core;
pub mod spaces;

// Flat re-exports for convenience
pub use crate::core::{Constraint, ConstraintParams, Error, Result, TraversalConfig};

// Re-export concrete constraints
pub use crate::constraints::{AffineConstraint, ConstraintIntersection, FnConstraint, SphereConstraint};

// Re-export state space types
pub use crate::spaces::{
    AllValid, NullspaceSpace, RealVectorSpace, SpaceInformation, SpaceKind, StateSpace,
    StateValidityChecker, Traversal,
};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::constraints::{
        AffineConstraint, ConstraintIntersection, FnConstraint, SphereConstraint,
    };
    pub use crate::core::{Constraint, ConstraintParams, Error, Result, TraversalConfig};
    pub use crate::spaces::{
        NullspaceSpace, RealVectorSpace, SpaceInformation, SpaceKind, StateSpace, Traversal,
    };
}
