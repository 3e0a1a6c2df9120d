pub mod config;
pub mod error;
pub mod linalg;
pub mod traits;

pub use config::{ConstraintParams, TraversalConfig};
pub use error::{Error, Result};
pub use linalg::{least_squares, null_space, JacobianFactorization};
pub use traits::{numeric_jacobian, Constraint};
