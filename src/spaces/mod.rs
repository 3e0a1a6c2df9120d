pub mod information;
pub mod nullspace;
pub mod real_vector;

pub use information::{AllValid, SpaceInformation, StateValidityChecker};
pub use nullspace::{NullspaceSpace, Traversal};
pub use real_vector::{RealVectorSpace, SpaceKind, StateSpace};
