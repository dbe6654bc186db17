use serde::{Deserialize, Serialize};

use crate::core::activations::Sigmoid;
use crate::core::matrix::Matrix;
use crate::core::optimizers::{apply_sgd, Optimization};
use crate::core::random::RandomSource;
use crate::core::vector::Vector;
use crate::error::{MlError, Result};

/// Fully-connected sigmoid layer: `a_out = σ(w · a_in + b)`.
///
/// `w` has shape `(outputs, inputs)` and `b` has length `outputs`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dense {
    pub w: Matrix,
    pub b: Vector,
}

impl Dense {
    /// Weights then biases are drawn uniformly from `[-1, 1)`.
    pub fn new<R: RandomSource>(inputs: usize, outputs: usize, rand: &mut R) -> Result<Self> {
        if inputs == 0 || outputs == 0 {
            return Err(MlError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        let mut w = Matrix::zero(outputs, inputs);
        let mut b = Vector::zero(outputs);
        rand.fill_double_range(w.as_mut_slice(), -1.0, 1.0);
        rand.fill_double_range(b.as_mut_slice(), -1.0, 1.0);
        Ok(Self { w, b })
    }

    pub fn from_parts(w: Matrix, b: Vector) -> Result<Self> {
        if w.rows() != b.len() {
            return Err(MlError::InvalidLayerConfiguration(format!(
                "weights have {} rows but bias has length {}",
                w.rows(),
                b.len()
            )));
        }
        Ok(Self { w, b })
    }

    pub fn inputs(&self) -> usize {
        self.w.cols()
    }

    pub fn outputs(&self) -> usize {
        self.w.rows()
    }

    pub fn param_count(&self) -> usize {
        self.w.len() + self.b.len()
    }

    /// Returns the pre-activation `z` and the activation `σ(z)`.
    pub fn forward(&self, a: &Vector) -> (Vector, Vector) {
        let z = &self.w * a + &self.b;
        let a = z.sigmoid();
        (z, a)
    }

    pub fn activate(&self, a: &Vector) -> Vector {
        (&self.w * a + &self.b).sigmoid()
    }

    /// Pulls this layer's error `delta` back through its weights:
    /// `(wᵀ · delta) ⊙ σ'(z_prev)`.
    pub fn backward(&self, delta: &Vector, z_prev: &Vector) -> Vector {
        Matrix::vec_mul(delta, &self.w).hadamard(&z_prev.sigmoid_prime())
    }
}

impl Optimization for Dense {
    fn optimize(&mut self, nabla_w: &Matrix, nabla_b: &Vector, step: f64) {
        apply_sgd(&mut self.w, &mut self.b, nabla_w, nabla_b, step);
    }
}
