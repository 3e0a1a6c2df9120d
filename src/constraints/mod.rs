pub mod affine;
pub mod closure;
pub mod intersection;
pub mod sphere;

pub use affine::AffineConstraint;
pub use closure::FnConstraint;
pub use intersection::ConstraintIntersection;
pub use sphere::SphereConstraint;
