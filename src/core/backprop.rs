use crate::core::activations::Sigmoid;
use crate::core::layers::Dense;
use crate::core::losses::quadratic_cost_derivative;
use crate::core::matrix::Matrix;
use crate::core::vector::Vector;

/// Per-layer cost gradients, shaped exactly like the layers they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub nabla_w: Vec<Matrix>,
    pub nabla_b: Vec<Vector>,
}

impl Gradients {
    pub fn zeros(layers: &[Dense]) -> Self {
        Self {
            nabla_w: layers.iter().map(|l| Matrix::zero(l.outputs(), l.inputs())).collect(),
            nabla_b: layers.iter().map(|l| Vector::zero(l.outputs())).collect(),
        }
    }

    /// Adds `other` into `self`, layer by layer.
    pub fn accumulate(&mut self, other: &Gradients) {
        assert_eq!(
            self.nabla_w.len(),
            other.nabla_w.len(),
            "accumulate: layer counts differ"
        );
        for (acc, g) in self.nabla_w.iter_mut().zip(&other.nabla_w) {
            *acc += g;
        }
        for (acc, g) in self.nabla_b.iter_mut().zip(&other.nabla_b) {
            *acc += g;
        }
    }
}

/// Gradient of the quadratic cost of one example `(x, y)`.
pub fn backpropagation(layers: &[Dense], x: &Vector, y: &Vector) -> Gradients {
    let n = layers.len();
    assert!(n > 0, "backpropagation: no layers");

    // activations[0] is the input, zs[l] feeds activations[l + 1]
    let mut zs = Vec::with_capacity(n);
    let mut activations = Vec::with_capacity(n + 1);
    activations.push(x.clone());
    for layer in layers {
        let (z, a) = layer.forward(&activations[activations.len() - 1]);
        zs.push(z);
        activations.push(a);
    }

    let mut nabla_w = Vec::with_capacity(n);
    let mut nabla_b = Vec::with_capacity(n);

    let mut delta = quadratic_cost_derivative(&activations[n], y).hadamard(&zs[n - 1].sigmoid_prime());
    for l in (0..n).rev() {
        if l + 1 < n {
            delta = layers[l + 1].backward(&delta, &zs[l]);
        }
        nabla_w.push(Matrix::outer(&delta, &activations[l]));
        nabla_b.push(delta.clone());
    }
    nabla_w.reverse();
    nabla_b.reverse();

    Gradients { nabla_w, nabla_b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::losses::quadratic_cost;
    use crate::core::random::Random;
    use crate::{matrix, vector};
    use approx::assert_abs_diff_eq;

    fn cost(layers: &[Dense], x: &Vector, y: &Vector) -> f64 {
        let a = layers.iter().fold(x.clone(), |a, l| l.activate(&a));
        quadratic_cost(&a, y)
    }

    #[test]
    fn test_single_layer_gradient() {
        let layers = vec![Dense::from_parts(matrix![[0.0, 0.0]], vector![0.0]).unwrap()];
        let g = backpropagation(&layers, &vector![1.0, 2.0], &vector![1.0]);
        // a = 0.5, σ'(0) = 0.25, delta = -0.125
        assert_eq!(g.nabla_b, vec![vector![-0.125]]);
        assert_eq!(g.nabla_w, vec![matrix![[-0.125, -0.25]]]);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let mut rand = Random::new(5);
        let layers = vec![
            Dense::new(3, 4, &mut rand).unwrap(),
            Dense::new(4, 2, &mut rand).unwrap(),
        ];
        let x = vector![0.3, -0.7, 0.9];
        let y = vector![1.0, 0.0];
        let g = backpropagation(&layers, &x, &y);
        let h = 1e-6;

        for l in 0..layers.len() {
            for i in 0..layers[l].w.len() {
                let mut plus = layers.clone();
                plus[l].w.as_mut_slice()[i] += h;
                let mut minus = layers.clone();
                minus[l].w.as_mut_slice()[i] -= h;
                let numeric = (cost(&plus, &x, &y) - cost(&minus, &x, &y)) / (2.0 * h);
                assert_abs_diff_eq!(g.nabla_w[l].as_slice()[i], numeric, epsilon = 1e-7);
            }
            for i in 0..layers[l].b.len() {
                let mut plus = layers.clone();
                plus[l].b[i] += h;
                let mut minus = layers.clone();
                minus[l].b[i] -= h;
                let numeric = (cost(&plus, &x, &y) - cost(&minus, &x, &y)) / (2.0 * h);
                assert_abs_diff_eq!(g.nabla_b[l][i], numeric, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_accumulate_sums_layerwise() {
        let layers = vec![Dense::from_parts(matrix![[0.0, 0.0]], vector![0.0]).unwrap()];
        let mut acc = Gradients::zeros(&layers);
        let g = backpropagation(&layers, &vector![1.0, 2.0], &vector![1.0]);
        acc.accumulate(&g);
        acc.accumulate(&g);
        assert_eq!(acc.nabla_b, vec![vector![-0.25]]);
        assert_eq!(acc.nabla_w, vec![matrix![[-0.25, -0.5]]]);
    }
}
