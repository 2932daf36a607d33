//! Spacing type for the physical distance between adjacent pixels.

use super::Vector;

/// Spacing between adjacent pixels/voxels along each index axis.
///
/// A type alias of [`Vector`] for semantic clarity.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Same spacing along every axis.
    pub fn uniform(value: f64) -> Self {
        Vector::new([value; D])
    }

    /// True when every component is strictly positive and finite.
    pub fn is_valid_spacing(&self) -> bool {
        (0..D).all(|i| self[i].is_finite() && self[i] > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_uniform() {
        let s = Spacing::<3>::uniform(0.5);
        assert_eq!(s, Spacing::<3>::new([0.5, 0.5, 0.5]));
        assert!(s.is_valid_spacing());
    }

    #[test]
    fn test_spacing_rejects_zero() {
        assert!(!Spacing::<2>::new([1.0, 0.0]).is_valid_spacing());
    }
}
