extern crate plotters;

pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod models;
pub mod prelude;
pub mod utils;

// Re-export types
pub use crate::config::TrainConfig;
pub use crate::core::{Dense, Matrix, PluDecomposition, Random, RandomSource, Vector};
pub use crate::dataset::Dataset;
pub use crate::error::{MlError, Result};
pub use crate::models::{NetworkState, NeuralNetwork};

pub mod plot {
    pub mod plot_history;
}
