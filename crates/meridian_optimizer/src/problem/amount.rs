use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::Serialize;
use smallvec::SmallVec;

type Components = SmallVec<[i64; 2]>;

/// Multi-dimensional capacity/demand vector. Missing trailing components are
/// treated as zero, so amounts of different lengths still compare and add.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Amount(Components);

impl Amount {
    pub const EMPTY: Amount = Amount(Components::new_const());

    pub fn empty() -> Self {
        Self::EMPTY
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        let mut components = Components::with_capacity(dimensions);
        components.resize(dimensions, 0);
        Amount(components)
    }

    pub fn from_vec(components: Vec<i64>) -> Self {
        Amount(SmallVec::from_vec(components))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> i64 {
        self.0.get(index).copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    pub fn reset(&mut self) {
        self.0.fill(0);
    }

    pub fn update(&mut self, other: &Amount) {
        self.0.clone_from(&other.0);
    }

    /// Componentwise `self <= capacity`.
    pub fn fits_in(&self, capacity: &Amount) -> bool {
        (0..self.len().max(capacity.len())).all(|i| self.get(i) <= capacity.get(i))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        (0..self.len().max(other.len())).all(|i| self.get(i) == other.get(i))
    }
}

impl Eq for Amount {}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        if self.0.len() < rhs.0.len() {
            self.0.resize(rhs.0.len(), 0);
        }
        for (a, &b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&Amount> for Amount {
    fn sub_assign(&mut self, rhs: &Amount) {
        if self.0.len() < rhs.0.len() {
            self.0.resize(rhs.0.len(), 0);
        }
        for (a, &b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= b;
        }
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub<&Amount> for &Amount {
    type Output = Amount;

    fn sub(self, rhs: &Amount) -> Amount {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_pads_dimensions() {
        let mut a = Amount::from_vec(vec![10, 20]);
        let b = Amount::from_vec(vec![5, 15, 25]);

        a += &b;

        assert_eq!(a, Amount::from_vec(vec![15, 35, 25]));
    }

    #[test]
    fn test_sub_assign() {
        let mut a = Amount::from_vec(vec![10, 20, 30]);
        let b = Amount::from_vec(vec![5, 15]);

        a -= &b;

        assert_eq!(a, Amount::from_vec(vec![5, 5, 30]));
    }

    #[test]
    fn test_fits_in() {
        let capacity = Amount::from_vec(vec![10, 5]);

        assert!(Amount::from_vec(vec![10, 5]).fits_in(&capacity));
        assert!(Amount::from_vec(vec![3]).fits_in(&capacity));
        assert!(Amount::empty().fits_in(&capacity));
        assert!(!Amount::from_vec(vec![11, 0]).fits_in(&capacity));
        assert!(!Amount::from_vec(vec![0, 0, 1]).fits_in(&capacity));
    }

    #[test]
    fn test_eq_ignores_trailing_zeros() {
        assert_eq!(Amount::from_vec(vec![1, 0]), Amount::from_vec(vec![1]));
        assert_eq!(Amount::empty(), Amount::from_vec(vec![0, 0]));
        assert_ne!(Amount::from_vec(vec![1]), Amount::from_vec(vec![1, 2]));
    }

    #[test]
    fn test_binary_ops() {
        let a = Amount::from_vec(vec![100]);
        let b = Amount::from_vec(vec![30]);

        assert_eq!(&a - &b, Amount::from_vec(vec![70]));
        assert_eq!(&a + &b, Amount::from_vec(vec![130]));
    }
}
