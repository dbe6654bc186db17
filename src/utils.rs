/// Builds a [`Vector`](crate::core::Vector) from a literal list of elements.
///
/// ```
/// use fnn::vector;
/// let v = vector![1.0, 2.0, 3.0];
/// assert_eq!(v.len(), 3);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::core::Vector::default()
    };
    ($($x:expr),+ $(,)?) => {
        $crate::core::Vector::from_vec(vec![$($x),+])
    };
}

/// Builds a [`Matrix`](crate::core::Matrix) from literal rows. All rows must
/// have the same length.
///
/// ```
/// use fnn::matrix;
/// let m = matrix![[1.0, 2.0], [3.0, 4.0]];
/// assert_eq!(m.shape(), (2, 2));
/// ```
#[macro_export]
macro_rules! matrix {
    ($([$($x:expr),* $(,)?]),+ $(,)?) => {{
        let rows: &[&[f64]] = &[$(&[$($x),*]),+];
        $crate::core::Matrix::from_rows(rows)
    }};
}
