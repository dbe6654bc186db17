use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FromIterator;
use std::ops::{Index, IndexMut};
use std::slice::{Iter, IterMut};

/// Fixed-length dense vector of `f64`.
///
/// The buffer is owned exclusively. Cloning duplicates it, moving transfers
/// it, and `std::mem::take` leaves an empty vector behind. Elementwise
/// operators between two vectors require equal lengths and panic otherwise.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Zero-filled vector of length `size`.
    pub fn new(size: usize) -> Self {
        Self::zero(size)
    }

    pub fn with(size: usize, val: f64) -> Self {
        Self {
            data: vec![val; size],
        }
    }

    pub fn zero(size: usize) -> Self {
        Self::with(size, 0.0)
    }

    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Resize to `size`, keeping the current allocation when it is large
    /// enough. Contents are unspecified afterwards; callers overwrite them.
    pub fn assign(&mut self, size: usize) {
        self.data.resize(size, 0.0);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn iter(&self) -> Iter<'_, f64> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, f64> {
        self.data.iter_mut()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn norm(&self) -> f64 {
        self.norm_square().sqrt()
    }

    pub fn norm_square(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum()
    }

    /// `self / self.norm()`. A zero vector yields NaN components.
    pub fn normalize(&self) -> Vector {
        self / self.norm()
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        assert_eq!(
            self.len(),
            other.len(),
            "dot: vector lengths differ ({} vs {})",
            self.len(),
            other.len()
        );
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }

    pub fn hadamard(&self, other: &Vector) -> Vector {
        self.zip_map(other, "hadamard", |a, b| a * b)
    }

    pub fn map<F>(&self, mut f: F) -> Vector
    where
        F: FnMut(f64) -> f64,
    {
        Vector {
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn apply<F>(&mut self, mut f: F)
    where
        F: FnMut(f64) -> f64,
    {
        for x in self.data.iter_mut() {
            *x = f(*x);
        }
    }

    pub(crate) fn zip_map<F>(&self, other: &Vector, op: &str, f: F) -> Vector
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_len(other, op);
        Vector {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    pub(crate) fn zip_apply<F>(&mut self, other: &Vector, op: &str, f: F)
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_len(other, op);
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = f(*a, b);
        }
    }

    fn check_same_len(&self, other: &Vector, op: &str) {
        assert_eq!(
            self.len(),
            other.len(),
            "{}: vector lengths differ ({} vs {})",
            op,
            self.len(),
            other.len()
        );
    }
}

impl_buffer_ops!(Vector);

impl Clone for Vector {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }

    // Reuses the destination allocation when it is large enough.
    fn clone_from(&mut self, source: &Self) {
        self.data.clone_from(&source.data);
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        assert!(i < self.len(), "index {} out of range for vector of length {}", i, self.len());
        &self.data[i]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        assert!(i < self.len(), "index {} out of range for vector of length {}", i, self.len());
        &mut self.data[i]
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector::from_vec(data)
    }
}

impl From<&[f64]> for Vector {
    fn from(data: &[f64]) -> Self {
        Vector::from_vec(data.to_vec())
    }
}

impl From<Vector> for Vec<f64> {
    fn from(v: Vector) -> Self {
        v.data
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Vector::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a f64;
    type IntoIter = Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "}}")
    }
}
