//! Training configuration.
//!
//! ```json
//! {
//!   "epochs": 30,
//!   "batch_size": 10,
//!   "learning_rate": 3.0,
//!   "parallel": true
//! }
//! ```
//!
//! Missing fields take their [`Default`] values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MlError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Step size `eta`; each mini-batch update uses `eta / m`.
    pub learning_rate: f64,
    /// Run per-example backpropagation on the rayon pool.
    pub parallel: bool,
    /// Evaluate once before the first epoch.
    pub evaluate_before: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 10,
            learning_rate: 3.0,
            parallel: false,
            evaluate_before: true,
        }
    }
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        Self {
            epochs,
            batch_size,
            learning_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MlError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(MlError::InvalidConfig(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: TrainConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
