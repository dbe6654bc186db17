use crate::core::vector::Vector;

/// `½ ‖a − y‖²` for a single example.
pub fn quadratic_cost(output: &Vector, target: &Vector) -> f64 {
    0.5 * (output - target).norm_square()
}

/// Gradient of [`quadratic_cost`] with respect to the output activation.
pub fn quadratic_cost_derivative(output: &Vector, target: &Vector) -> Vector {
    output - target
}
