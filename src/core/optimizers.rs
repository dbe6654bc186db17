use crate::core::matrix::Matrix;
use crate::core::vector::Vector;

pub trait Optimization {
    /// Apply one gradient step of size `step` (already divided by the batch size).
    fn optimize(&mut self, nabla_w: &Matrix, nabla_b: &Vector, step: f64);
}

/// Plain SGD: `W -= step * nabla_w`, `b -= step * nabla_b`, in place.
pub fn apply_sgd(
    weights: &mut Matrix,
    bias: &mut Vector,
    nabla_w: &Matrix,
    nabla_b: &Vector,
    step: f64,
) {
    *bias -= &(step * nabla_b);
    *weights -= &(step * nabla_w);
}
