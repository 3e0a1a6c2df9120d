use ndarray::Array1;
use ndarray_linalg::Norm;

use crate::core::{Error, Result};

/// Tag identifying the representation behind a state space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    /// Plain R^n
    RealVector,
    /// R^n restricted to a constraint manifold, walked by nullspace correction
    Nullspace,
}

/// Operations a state space offers on fixed-length real vectors
pub trait StateSpace: Send + Sync {
    /// Representation tag, used for compatibility checks
    fn kind(&self) -> SpaceKind;

    /// Length of every state vector
    fn dimension(&self) -> usize;

    /// Distance between two states
    fn distance(&self, a: &Array1<f64>, b: &Array1<f64>) -> f64;

    /// State at parameter `t` ∈ [0, 1] between `from` and `to`
    fn interpolate(&self, from: &Array1<f64>, to: &Array1<f64>, t: f64) -> Array1<f64>;

    /// Number of segments needed to check the motion from `a` to `b`
    fn valid_segment_count(&self, a: &Array1<f64>, b: &Array1<f64>) -> usize;

    /// Validate that a state has the space dimension
    fn validate_point(&self, x: &Array1<f64>) -> Result<()> {
        if x.len() != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                got: x.len(),
            });
        }
        Ok(())
    }
}

/// Default length of the longest segment checked without subdivision
pub const DEFAULT_LONGEST_VALID_SEGMENT: f64 = 0.01;

/// Euclidean R^n with straight-line interpolation
#[derive(Debug, Clone)]
pub struct RealVectorSpace {
    dimension: usize,
    longest_valid_segment: f64,
    segment_count_factor: usize,
}

impl RealVectorSpace {
    pub fn new(dimension: usize) -> Self {
        RealVectorSpace {
            dimension,
            longest_valid_segment: DEFAULT_LONGEST_VALID_SEGMENT,
            segment_count_factor: 1,
        }
    }

    /// Set the longest segment length checked without subdivision
    pub fn with_longest_valid_segment(mut self, length: f64) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "longest valid segment must be finite and positive, got {}",
                length
            )));
        }
        self.longest_valid_segment = length;
        Ok(self)
    }

    /// Multiply every segment count by `factor`
    pub fn with_segment_count_factor(mut self, factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(Error::InvalidParameter(
                "segment count factor must be positive".to_string(),
            ));
        }
        self.segment_count_factor = factor;
        Ok(self)
    }

    pub fn longest_valid_segment(&self) -> f64 {
        self.longest_valid_segment
    }
}

impl StateSpace for RealVectorSpace {
    fn kind(&self) -> SpaceKind {
        SpaceKind::RealVector
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn distance(&self, a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        (b - a).norm_l2()
    }

    fn interpolate(&self, from: &Array1<f64>, to: &Array1<f64>, t: f64) -> Array1<f64> {
        from + &((to - from) * t)
    }

    fn valid_segment_count(&self, a: &Array1<f64>, b: &Array1<f64>) -> usize {
        let dist = self.distance(a, b);
        // Non-finite states are never within a single segment of anything
        if !dist.is_finite() {
            return usize::MAX;
        }
        let segments = (dist / self.longest_valid_segment).ceil() as usize;
        self.segment_count_factor.saturating_mul(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn test_real_vector_distance_and_interpolation() {
        let space = RealVectorSpace::new(2);
        let a = arr1(&[0.0, 0.0]);
        let b = arr1(&[3.0, 4.0]);

        assert_relative_eq!(space.distance(&a, &b), 5.0, epsilon = 1e-12);

        let mid = space.interpolate(&a, &b, 0.5);
        assert_relative_eq!(mid[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(mid[1], 2.0, epsilon = 1e-12);
        assert_eq!(space.interpolate(&a, &b, 0.0), a);
    }

    #[test]
    fn test_valid_segment_count() {
        let space = RealVectorSpace::new(2).with_longest_valid_segment(0.5).unwrap();
        let a = arr1(&[0.0, 0.0]);

        assert_eq!(space.valid_segment_count(&a, &a), 0);
        assert_eq!(space.valid_segment_count(&a, &arr1(&[0.1, 0.0])), 1);
        assert_eq!(space.valid_segment_count(&a, &arr1(&[1.2, 0.0])), 3);

        assert_eq!(space.valid_segment_count(&a, &arr1(&[f64::NAN, 0.0])), usize::MAX);

        let doubled = space.with_segment_count_factor(2).unwrap();
        assert_eq!(doubled.valid_segment_count(&a, &arr1(&[1.2, 0.0])), 6);
    }

    #[test]
    fn test_real_vector_validation() {
        let space = RealVectorSpace::new(3);
        assert!(space.validate_point(&arr1(&[1.0, 2.0, 3.0])).is_ok());
        assert!(space.validate_point(&arr1(&[1.0, 2.0])).is_err());
        assert!(RealVectorSpace::new(3).with_longest_valid_segment(0.0).is_err());
        assert!(RealVectorSpace::new(3).with_segment_count_factor(0).is_err());
    }
}
