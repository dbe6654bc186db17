pub use serde::{Deserialize, Serialize};

pub use crate::config::TrainConfig;
pub use crate::dataset::{
    digit_to_vector, load_mnist, parse_mnist, same_digit, vector_to_digit, Dataset,
};
pub use crate::error::*;
pub use crate::models::{NetworkState, NeuralNetwork};
pub use crate::plot::plot_history::plot_history;
pub use crate::{matrix, vector};

// Internal re-exports
pub use crate::core::{
    apply_sgd,
    backpropagation,
    quadratic_cost,
    write_history_csv,
    Dense,
    EpochReport,
    Evaluation,
    Gradients,
    Matrix,
    Normalization,
    Optimization,
    PluDecomposition,
    Random,
    RandomSource,
    Sigmoid,
    TrainingHistory,
    Vector,
};
