// Conversions to and from ndarray and nalgebra containers. Both directions
// copy; matrices keep their row-major element order.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::core::matrix::Matrix;
use crate::core::vector::Vector;

impl From<&Vector> for Array1<f64> {
    fn from(v: &Vector) -> Self {
        Array1::from_vec(v.as_slice().to_vec())
    }
}

impl From<&Array1<f64>> for Vector {
    fn from(a: &Array1<f64>) -> Self {
        a.iter().copied().collect()
    }
}

impl From<&Matrix> for Array2<f64> {
    fn from(m: &Matrix) -> Self {
        Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)])
    }
}

impl From<&Array2<f64>> for Matrix {
    fn from(a: &Array2<f64>) -> Self {
        let (rows, cols) = a.dim();
        Matrix::from_fn(rows, cols, |i, j| a[[i, j]])
    }
}

impl From<&Vector> for DVector<f64> {
    fn from(v: &Vector) -> Self {
        DVector::from_vec(v.as_slice().to_vec())
    }
}

impl From<&DVector<f64>> for Vector {
    fn from(v: &DVector<f64>) -> Self {
        v.iter().copied().collect()
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(m: &Matrix) -> Self {
        DMatrix::from_row_slice(m.rows(), m.cols(), m.as_slice())
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(m: &DMatrix<f64>) -> Self {
        Matrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }
}
