use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut, Mul};

use super::vector::Vector;

/// Dense `rows × cols` matrix of `f64` stored row-major in one owned buffer.
///
/// Element access `m[(row, col)]` panics unless `row < rows` and
/// `col < cols`. Elementwise operators between two matrices require equal
/// shapes; products require `a.cols() == b.rows()`.
#[derive(Debug, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::zero(rows, cols)
    }

    pub fn with(rows: usize, cols: usize, val: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![val; rows * cols],
        }
    }

    pub fn zero(rows: usize, cols: usize) -> Self {
        Self::with(rows, cols, 0.0)
    }

    pub fn id(n: usize) -> Self {
        let mut res = Self::zero(n, n);
        for i in 0..n {
            res[(i, i)] = 1.0;
        }
        res
    }

    /// Builds a matrix from a row-major buffer of exactly `rows * cols` values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "buffer of length {} cannot hold a {}x{} matrix",
            data.len(),
            rows,
            cols
        );
        Self { rows, cols, data }
    }

    pub fn from_rows(rows: &[&[f64]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "matrix rows must all have {} columns", cols);
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn fill(&mut self, val: f64) {
        self.data.iter_mut().for_each(|x| *x = val);
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// New matrix, not a view.
    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols, self.rows, |i, j| self[(j, i)])
    }

    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, "hadamard", |a, b| a * b)
    }

    /// `a ⊗ b`, the `a.len() × b.len()` matrix with entries `a[i] * b[j]`.
    pub fn outer(a: &Vector, b: &Vector) -> Matrix {
        Matrix::from_fn(a.len(), b.len(), |i, j| a[i] * b[j])
    }

    pub fn mul(a: &Matrix, b: &Matrix) -> Matrix {
        assert_eq!(
            a.cols, b.rows,
            "mul: inner dimensions differ ({}x{} * {}x{})",
            a.rows, a.cols, b.rows, b.cols
        );
        let mut res = Matrix::zero(a.rows, b.cols);
        for i in 0..a.rows {
            for j in 0..b.cols {
                let mut val = 0.0;
                for k in 0..a.cols {
                    val += a[(i, k)] * b[(k, j)];
                }
                res[(i, j)] = val;
            }
        }
        res
    }

    pub fn mul_vec(a: &Matrix, b: &Vector) -> Vector {
        let mut out = Vector::default();
        Matrix::mul_into(a, b, &mut out);
        out
    }

    /// Row vector times matrix, `a^T · b`. Equivalent to `b.transpose() * a`
    /// without materializing the transpose.
    pub fn vec_mul(a: &Vector, b: &Matrix) -> Vector {
        assert_eq!(
            a.len(),
            b.rows,
            "vec_mul: inner dimensions differ ({} * {}x{})",
            a.len(),
            b.rows,
            b.cols
        );
        (0..b.cols)
            .map(|j| (0..b.rows).map(|k| a[k] * b[(k, j)]).sum::<f64>())
            .collect()
    }

    /// `out = a · b`, reusing `out`'s allocation when possible.
    pub fn mul_into(a: &Matrix, b: &Vector, out: &mut Vector) {
        assert_eq!(
            a.cols,
            b.len(),
            "mul: inner dimensions differ ({}x{} * {})",
            a.rows,
            a.cols,
            b.len()
        );
        out.assign(a.rows);
        for i in 0..a.rows {
            let row = a.row(i);
            out[i] = row.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        }
    }

    pub fn map<F>(&self, mut f: F) -> Matrix
    where
        F: FnMut(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
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

    pub(crate) fn zip_map<F>(&self, other: &Matrix, op: &str, f: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(other, op);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    pub(crate) fn zip_apply<F>(&mut self, other: &Matrix, op: &str, f: F)
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(other, op);
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = f(*a, b);
        }
    }

    fn check_same_shape(&self, other: &Matrix, op: &str) {
        assert!(
            self.shape() == other.shape(),
            "{}: matrix shapes differ ({}x{} vs {}x{})",
            op,
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
    }
}

impl_buffer_ops!(Matrix);

impl Clone for Matrix {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.rows = source.rows;
        self.cols = source.cols;
        self.data.clone_from(&source.data);
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix::mul(self, rhs)
    }
}

impl Mul<&Vector> for &Matrix {
    type Output = Vector;

    fn mul(self, rhs: &Vector) -> Vector {
        Matrix::mul_vec(self, rhs)
    }
}

impl Mul<&Matrix> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: &Matrix) -> Vector {
        Matrix::vec_mul(self, rhs)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "|")?;
            for x in self.row(i) {
                write!(f, " {} |", x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// Wire layout: rows, cols, then the row-major elements with no inner length
// prefix. Under bincode this is `[u64][u64][f64; rows * cols]`.
impl Serialize for Matrix {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tup = serializer.serialize_tuple(2 + self.data.len())?;
        tup.serialize_element(&(self.rows as u64))?;
        tup.serialize_element(&(self.cols as u64))?;
        for x in &self.data {
            tup.serialize_element(x)?;
        }
        tup.end()
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MatrixVisitor;

        impl<'de> Visitor<'de> for MatrixVisitor {
            type Value = Matrix;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("matrix rows, cols and row-major elements")
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Matrix, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let rows: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let cols: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let rows = usize::try_from(rows).map_err(de::Error::custom)?;
                let cols = usize::try_from(cols).map_err(de::Error::custom)?;
                let len = rows
                    .checked_mul(cols)
                    .ok_or_else(|| de::Error::custom("matrix shape overflows usize"))?;

                let mut data = Vec::with_capacity(len.min(1 << 16));
                for i in 0..len {
                    let x: f64 = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i + 2, &self))?;
                    data.push(x);
                }
                Ok(Matrix { rows, cols, data })
            }
        }

        deserializer.deserialize_tuple(usize::MAX, MatrixVisitor)
    }
}
