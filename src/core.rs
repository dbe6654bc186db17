// src/core.rs
#[macro_use]
mod ops;

pub mod activations;
pub mod backprop;
pub mod interop;
pub mod layers;
pub mod losses;
pub mod matrix;
pub mod normalization;
pub mod optimizers;
pub mod output;
pub mod random;
pub mod serial;
pub mod solver;
pub mod vector;

// Re-export commonly used items
pub use activations::Sigmoid;
pub use backprop::{backpropagation, Gradients};
pub use layers::Dense;
pub use losses::{quadratic_cost, quadratic_cost_derivative};
pub use matrix::Matrix;
pub use normalization::Normalization;
pub use optimizers::{apply_sgd, Optimization};
pub use output::{write_history_csv, EpochReport, Evaluation, TrainingHistory};
pub use random::{Random, RandomSource};
pub use solver::PluDecomposition;
pub use vector::Vector;
