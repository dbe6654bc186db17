use crate::core::matrix::Matrix;
use crate::core::vector::Vector;

/// Logistic activation, applied elementwise to containers.
pub trait Sigmoid {
    /// `σ(z) = 1 / (1 + e^-z)`
    fn sigmoid(&self) -> Self;

    /// `σ'(z) = e^-z / (1 + e^-z)^2`
    fn sigmoid_prime(&self) -> Self;
}

impl Sigmoid for f64 {
    fn sigmoid(&self) -> f64 {
        1.0 / (1.0 + (-self).exp())
    }

    fn sigmoid_prime(&self) -> f64 {
        let e = (-self).exp();
        e / ((1.0 + e) * (1.0 + e))
    }
}

impl Sigmoid for Vector {
    fn sigmoid(&self) -> Vector {
        self.map(|z| z.sigmoid())
    }

    fn sigmoid_prime(&self) -> Vector {
        self.map(|z| z.sigmoid_prime())
    }
}

impl Sigmoid for Matrix {
    fn sigmoid(&self) -> Matrix {
        self.map(|z| z.sigmoid())
    }

    fn sigmoid_prime(&self) -> Matrix {
        self.map(|z| z.sigmoid_prime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sigmoid_values() {
        assert_eq!(0.0_f64.sigmoid(), 0.5);
        assert_eq!(0.0_f64.sigmoid_prime(), 0.25);
        assert_abs_diff_eq!(2.0_f64.sigmoid() + (-2.0_f64).sigmoid(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_sigmoid_prime_matches_s_times_one_minus_s() {
        for &z in &[-6.0, -1.5, -0.1, 0.3, 2.0, 7.5] {
            let s: f64 = Sigmoid::sigmoid(&z);
            assert_abs_diff_eq!(Sigmoid::sigmoid_prime(&z), s * (1.0 - s), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sigmoid_prime_matches_finite_difference() {
        let h = 1e-6;
        for &z in &[-3.0_f64, -0.5, 0.0, 1.25, 4.0] {
            let numeric = ((z + h).sigmoid() - (z - h).sigmoid()) / (2.0 * h);
            assert_abs_diff_eq!(z.sigmoid_prime(), numeric, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_elementwise_on_containers() {
        let v = vector![-1.0, 0.0, 1.0];
        let s = v.sigmoid();
        assert_eq!(s[1], 0.5);
        assert!(s.iter().all(|&x| x > 0.0 && x < 1.0));

        let m = Matrix::with(2, 2, 0.0).sigmoid_prime();
        assert_eq!(m, Matrix::with(2, 2, 0.25));
    }
}
