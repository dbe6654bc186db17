//! Dense linear solves built on a row-pivoted LU factorization.
//!
//! `P·A = L·U` is computed by Gaussian elimination with scaled partial
//! pivoting: each row is weighted by the reciprocal of its largest original
//! magnitude before pivot comparison, so the choice of pivot is relative to
//! the row it comes from. Failure is reported as [`MlError::SingularMatrix`]
//! only when a row or a pivot is exactly zero. A matrix that is singular
//! only up to rounding still factors, with a near-zero pivot in `U`.

use crate::core::matrix::Matrix;
use crate::core::vector::Vector;
use crate::error::{MlError, Result};

/// Result of [`Matrix::plu_decomposition`].
#[derive(Debug, Clone, PartialEq)]
pub struct PluDecomposition {
    p: Matrix,
    l: Matrix,
    u: Matrix,
    permutation: Vec<usize>,
    even_permutations: bool,
}

impl PluDecomposition {
    /// Row permutation matrix with `P[(i, permutation[i])] == 1`.
    pub fn p(&self) -> &Matrix {
        &self.p
    }

    /// Unit lower-triangular factor.
    pub fn l(&self) -> &Matrix {
        &self.l
    }

    /// Upper-triangular factor.
    pub fn u(&self) -> &Matrix {
        &self.u
    }

    /// `permutation[i]` is the original row now at position `i`.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Parity of the row swaps performed, for determinant-sign callers.
    pub fn even_permutations(&self) -> bool {
        self.even_permutations
    }

    pub fn size(&self) -> usize {
        self.permutation.len()
    }

    /// Solves `A x = b` as `L U x = P b`.
    pub fn solve(&self, b: &Vector) -> Vector {
        assert_eq!(
            b.len(),
            self.size(),
            "plu_solve: right-hand side has length {}, expected {}",
            b.len(),
            self.size()
        );
        let pb: Vector = self.permutation.iter().map(|&src| b[src]).collect();
        let y = self.l.solve_lower(&pb);
        self.u.solve_upper(&y)
    }

    /// Solves one system per column of `b`.
    pub fn solve_matrix(&self, b: &Matrix) -> Matrix {
        let n = self.size();
        assert_eq!(
            b.rows(),
            n,
            "plu_solve: right-hand side has {} rows, expected {}",
            b.rows(),
            n
        );
        let mut res = Matrix::zero(n, b.cols());
        for k in 0..b.cols() {
            let column: Vector = (0..n).map(|i| b[(i, k)]).collect();
            let x = self.solve(&column);
            for i in 0..n {
                res[(i, k)] = x[i];
            }
        }
        res
    }

    pub fn inverse(&self) -> Matrix {
        self.solve_matrix(&Matrix::id(self.size()))
    }
}

impl Matrix {
    /// Forward substitution for a lower-triangular `self`.
    pub fn solve_lower(&self, b: &Vector) -> Vector {
        self.check_triangular_system(b);
        let n = self.rows();
        let mut x = Vector::zero(n);
        for k in 0..n {
            let mut val = b[k];
            for i in 0..k {
                val -= self[(k, i)] * x[i];
            }
            x[k] = val / self[(k, k)];
        }
        x
    }

    /// Backward substitution for an upper-triangular `self`.
    pub fn solve_upper(&self, b: &Vector) -> Vector {
        self.check_triangular_system(b);
        let n = self.rows();
        let mut x = Vector::zero(n);
        for k in (0..n).rev() {
            let mut val = b[k];
            for i in k + 1..n {
                val -= self[(k, i)] * x[i];
            }
            x[k] = val / self[(k, k)];
        }
        x
    }

    pub fn plu_decomposition(&self) -> Result<PluDecomposition> {
        assert!(
            self.is_square(),
            "plu_decomposition: matrix must be square, got {}x{}",
            self.rows(),
            self.cols()
        );
        let n = self.rows();
        let mut res = self.clone();
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut swaps = 0usize;

        // A row of zeros can never provide a pivot.
        let mut inv_largest = Vec::with_capacity(n);
        for i in 0..n {
            let max = res.row(i).iter().fold(0.0_f64, |m, x| m.max(x.abs()));
            if max == 0.0 {
                return Err(MlError::SingularMatrix);
            }
            inv_largest.push(1.0 / max);
        }

        for k in 0..n {
            let mut max_val = 0.0;
            let mut max_i = k;
            for (i, scale) in inv_largest.iter().enumerate().skip(k) {
                let val = scale * res[(i, k)].abs();
                if val > max_val {
                    max_val = val;
                    max_i = i;
                }
            }
            if max_val == 0.0 {
                return Err(MlError::SingularMatrix);
            }

            if max_i != k {
                res.swap_rows(max_i, k);
                inv_largest.swap(max_i, k);
                permutation.swap(max_i, k);
                swaps += 1;
            }

            let pivot = res[(k, k)];
            for i in k + 1..n {
                let factor = res[(i, k)] / pivot;
                res[(i, k)] = factor;
                for j in k + 1..n {
                    let delta = factor * res[(k, j)];
                    res[(i, j)] -= delta;
                }
            }
        }

        let mut p = Matrix::zero(n, n);
        for (i, &src) in permutation.iter().enumerate() {
            p[(i, src)] = 1.0;
        }
        let l = Matrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Greater => res[(i, j)],
            std::cmp::Ordering::Equal => 1.0,
            std::cmp::Ordering::Less => 0.0,
        });
        let u = Matrix::from_fn(n, n, |i, j| if j >= i { res[(i, j)] } else { 0.0 });

        Ok(PluDecomposition {
            p,
            l,
            u,
            permutation,
            even_permutations: swaps % 2 == 0,
        })
    }

    pub fn plu_solve(&self, b: &Vector) -> Result<Vector> {
        Ok(self.plu_decomposition()?.solve(b))
    }

    pub fn plu_solve_matrix(&self, b: &Matrix) -> Result<Matrix> {
        Ok(self.plu_decomposition()?.solve_matrix(b))
    }

    pub fn plu_inverse(&self) -> Result<Matrix> {
        Ok(self.plu_decomposition()?.inverse())
    }

    pub fn inverse(&self) -> Result<Matrix> {
        self.plu_inverse()
    }

    fn check_triangular_system(&self, b: &Vector) {
        assert!(
            self.is_square(),
            "triangular solve: matrix must be square, got {}x{}",
            self.rows(),
            self.cols()
        );
        assert_eq!(
            self.rows(),
            b.len(),
            "triangular solve: right-hand side has length {}, expected {}",
            b.len(),
            self.rows()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix, vector};
    use approx::assert_abs_diff_eq;
    use nalgebra::{DMatrix, DVector};

    fn assert_matrix_close(a: &Matrix, b: &Matrix, eps: f64) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = eps);
        }
    }

    fn assert_vector_close(a: &Vector, b: &Vector, eps: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = eps);
        }
    }

    // Needs a 3-cycle of row swaps, so P and P^T differ.
    fn cyclic() -> Matrix {
        matrix![[0.0, 1.0, 2.0], [0.5, 0.0, 3.0], [4.0, 2.0, 1.0]]
    }

    #[test]
    fn test_solve_lower_exact() {
        let l = matrix![[1.0, 0.0], [3.0, 1.0]];
        assert_eq!(l.solve_lower(&vector![2.0, 11.0]), vector![2.0, 5.0]);
    }

    #[test]
    fn test_solve_upper_exact() {
        let u = matrix![[2.0, 1.0], [0.0, 4.0]];
        assert_eq!(u.solve_upper(&vector![5.0, 8.0]), vector![1.5, 2.0]);
    }

    #[test]
    fn test_singular_matrix_fails() {
        let m = matrix![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(m.plu_decomposition(), Err(MlError::SingularMatrix)));
        assert!(matches!(m.plu_solve(&vector![1.0, 1.0]), Err(MlError::SingularMatrix)));
        assert!(matches!(m.inverse(), Err(MlError::SingularMatrix)));
    }

    #[test]
    fn test_zero_row_fails() {
        let m = matrix![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0], [4.0, 5.0, 7.0]];
        assert!(matches!(m.plu_decomposition(), Err(MlError::SingularMatrix)));
    }

    #[test]
    fn test_rank_deficient_fails() {
        let m = matrix![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]];
        assert!(matches!(m.plu_decomposition(), Err(MlError::SingularMatrix)));
    }

    #[test]
    fn test_rounding_hides_rank_deficiency() {
        // Row 2 is 2·row1 − row0, but elimination leaves a rounding residue
        // instead of an exact zero pivot.
        let m = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let plu = m.plu_decomposition().unwrap();
        let last = plu.u()[(2, 2)];
        assert!(last.abs() < 1e-12, "pivot {} is not negligible", last);
    }

    #[test]
    fn test_factors_reconstruct_permuted_matrix() {
        let a = cyclic();
        let plu = a.plu_decomposition().unwrap();
        assert_matrix_close(&(plu.p() * &a), &(plu.l() * plu.u()), 1e-12);

        for i in 0..3 {
            assert_eq!(plu.l()[(i, i)], 1.0);
            for j in i + 1..3 {
                assert_eq!(plu.l()[(i, j)], 0.0);
                assert_eq!(plu.u()[(j, i)], 0.0);
            }
        }
    }

    #[test]
    fn test_scaled_pivoting_prefers_relative_magnitude() {
        // Row 0 has the larger absolute entry in column 0 but it is tiny
        // relative to the rest of its row.
        let a = matrix![[10.0, 100000.0], [1.0, 1.0]];
        let plu = a.plu_decomposition().unwrap();
        assert_eq!(plu.permutation(), &[1, 0]);
        assert!(!plu.even_permutations());
    }

    #[test]
    fn test_identity_has_even_permutation() {
        let plu = Matrix::id(4).plu_decomposition().unwrap();
        assert_eq!(plu.permutation(), &[0, 1, 2, 3]);
        assert!(plu.even_permutations());
        assert_eq!(plu.l(), &Matrix::id(4));
        assert_eq!(plu.u(), &Matrix::id(4));
    }

    #[test]
    fn test_plu_solve_recovers_x() {
        let a = cyclic();
        let x = vector![1.5, -2.0, 0.25];
        let b = &a * &x;
        assert_vector_close(&a.plu_solve(&b).unwrap(), &x, 1e-12);
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let a = matrix![
            [4.0, -2.0, 1.0, 3.0],
            [3.0, 6.0, -4.0, 2.0],
            [2.0, 1.0, 8.0, -5.0],
            [1.0, 3.0, 2.0, 7.0]
        ];
        let inv = a.plu_inverse().unwrap();
        assert_matrix_close(&(&a * &inv), &Matrix::id(4), 1e-12);
        assert_matrix_close(&(&inv * &a), &Matrix::id(4), 1e-12);
    }

    #[test]
    fn test_rectangular_right_hand_side() {
        let a = cyclic();
        let x = matrix![[1.0, 0.0], [2.0, -1.0], [3.0, 0.5]];
        let b = &a * &x;
        assert_matrix_close(&a.plu_solve_matrix(&b).unwrap(), &x, 1e-12);
    }

    #[test]
    fn test_matches_nalgebra_lu() {
        let a = matrix![
            [2.0, 1.0, 1.0, 0.5],
            [4.0, -6.0, 0.0, 1.0],
            [-2.0, 7.0, 2.0, 3.0],
            [1.0, 1.0, -1.0, 9.0]
        ];
        let b = vector![5.0, -2.0, 9.0, 1.0];

        let na = DMatrix::from_row_slice(4, 4, a.as_slice());
        let nb = DVector::from_column_slice(b.as_slice());
        let expected = na.lu().solve(&nb).unwrap();

        let x = a.plu_solve(&b).unwrap();
        for (ours, theirs) in x.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*ours, *theirs, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_empty_matrix_decomposes() {
        let plu = Matrix::new(0, 0).plu_decomposition().unwrap();
        assert_eq!(plu.size(), 0);
        assert!(plu.inverse().is_empty());
    }
}
