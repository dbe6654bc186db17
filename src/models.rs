use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::config::TrainConfig;
use crate::core::backprop::{backpropagation, Gradients};
use crate::core::layers::Dense;
use crate::core::losses::quadratic_cost;
use crate::core::optimizers::Optimization;
use crate::core::output::{EpochReport, Evaluation, TrainingHistory};
use crate::core::random::{Random, RandomSource};
use crate::core::serial;
use crate::core::vector::Vector;
use crate::dataset::Dataset;
use crate::error::{MlError, Result};

/// Layer sizes and parameters, the persisted part of a network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkState {
    pub sizes: Vec<usize>,
    pub layers: Vec<Dense>,
}

impl NetworkState {
    fn validate(&self) -> Result<()> {
        if self.sizes.len() < 2 || self.sizes.contains(&0) {
            return Err(MlError::ModelLoadError(format!(
                "invalid layer sizes {:?}",
                self.sizes
            )));
        }
        if self.layers.len() + 1 != self.sizes.len() {
            return Err(MlError::ModelLoadError(format!(
                "{} layer sizes but {} parameter layers",
                self.sizes.len(),
                self.layers.len()
            )));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            let expected = (self.sizes[i + 1], self.sizes[i]);
            if layer.w.shape() != expected || layer.b.len() != expected.0 {
                return Err(MlError::ModelLoadError(format!(
                    "layer {} has weights {:?} and bias {}, expected {:?}",
                    i,
                    layer.w.shape(),
                    layer.b.len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// Fully-connected sigmoid network trained by mini-batch SGD.
///
/// The shape is fixed at construction. Parameters change only through
/// [`NeuralNetwork::sgd`] / [`NeuralNetwork::train`], once per mini-batch.
#[derive(Debug, Clone)]
pub struct NeuralNetwork<R: RandomSource = Random> {
    sizes: Vec<usize>,
    layers: Vec<Dense>,
    rand: R,
}

impl NeuralNetwork<Random> {
    pub fn with_seed(sizes: &[usize], seed: u64) -> Result<Self> {
        Self::new(sizes, Random::new(seed))
    }
}

impl<R: RandomSource> NeuralNetwork<R> {
    /// `sizes` lists the input width, the hidden widths and the output width.
    /// Weights and biases are drawn from `rand` in `[-1, 1)`, layer by layer.
    pub fn new(sizes: &[usize], mut rand: R) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(MlError::InvalidLayerConfiguration(format!(
                "a network needs at least an input and an output size, got {:?}",
                sizes
            )));
        }
        let layers = sizes
            .windows(2)
            .map(|pair| Dense::new(pair[0], pair[1], &mut rand))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            sizes: sizes.to_vec(),
            layers,
            rand,
        })
    }

    pub fn from_state(state: NetworkState, rand: R) -> Result<Self> {
        state.validate()?;
        Ok(Self {
            sizes: state.sizes,
            layers: state.layers,
            rand,
        })
    }

    pub fn state(&self) -> NetworkState {
        NetworkState {
            sizes: self.sizes.clone(),
            layers: self.layers.clone(),
        }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn input_size(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Dense::param_count).sum()
    }

    pub fn summary(&self) -> String {
        let mut res = "\nModel NeuralNetwork\n".to_string();
        res.push_str("-------------------------------------------------------------\n");
        res.push_str("Layer (Type)\t\t Output shape\t\t No.of params\n");
        res.push_str(&format!("Input\t\t\t  (None, {})\t\t  0\n", self.input_size()));
        for layer in self.layers.iter() {
            res.push_str(&format!(
                "Dense\t\t\t  (None, {})\t\t  {}\n",
                layer.outputs(),
                layer.param_count()
            ));
        }
        res.push_str("-------------------------------------------------------------\n");
        res.push_str(&format!("Total params: {}\n", self.param_count()));
        res
    }

    /// Output activation for `x`; every component lies in `(0, 1)`.
    ///
    /// Panics if `x.len()` differs from the input size.
    pub fn forward(&self, x: &Vector) -> Vector {
        assert_eq!(
            x.len(),
            self.input_size(),
            "forward: input has length {}, network expects {}",
            x.len(),
            self.input_size()
        );
        let mut a = x.clone();
        for layer in self.layers.iter() {
            a = layer.activate(&a);
        }
        a
    }

    /// Cost gradients for a single example.
    pub fn backpropagate(&self, x: &Vector, y: &Vector) -> Gradients {
        assert_eq!(
            x.len(),
            self.input_size(),
            "backpropagate: input has length {}, network expects {}",
            x.len(),
            self.input_size()
        );
        backpropagation(&self.layers, x, y)
    }

    /// One epoch: shuffle `data`, then one gradient step per mini-batch of
    /// `batch_size` examples (the last batch may be smaller).
    pub fn sgd(&mut self, data: &mut Dataset, batch_size: usize, eta: f64, parallel: bool) {
        assert!(batch_size > 0, "sgd: batch_size must be positive");
        data.shuffle(&mut self.rand);

        let batches = data.inputs().chunks(batch_size).zip(data.labels().chunks(batch_size));
        for (i, (xs, ys)) in batches.enumerate() {
            self.sgd_batch(xs, ys, eta, parallel);
            debug!("Mini-batch {} ({} examples) applied", i, xs.len());
        }
    }

    fn sgd_batch(&mut self, xs: &[Vector], ys: &[Vector], eta: f64, parallel: bool) {
        let mut nabla = Gradients::zeros(&self.layers);
        if parallel {
            let layers = &self.layers;
            let grads: Vec<Gradients> = xs
                .par_iter()
                .zip(ys.par_iter())
                .map(|(x, y)| backpropagation(layers, x, y))
                .collect();
            // summed in example order, same as the sequential path
            for g in &grads {
                nabla.accumulate(g);
            }
        } else {
            for (x, y) in xs.iter().zip(ys) {
                nabla.accumulate(&backpropagation(&self.layers, x, y));
            }
        }

        let step = eta / xs.len() as f64;
        for ((layer, nw), nb) in self
            .layers
            .iter_mut()
            .zip(&nabla.nabla_w)
            .zip(&nabla.nabla_b)
        {
            layer.optimize(nw, nb, step);
        }
    }

    /// Runs `config.epochs` epochs of [`NeuralNetwork::sgd`] over `train`,
    /// evaluating on `test` after each one.
    pub fn train<F>(
        &mut self,
        config: &TrainConfig,
        train: &mut Dataset,
        test: &Dataset,
        success: F,
    ) -> Result<TrainingHistory>
    where
        F: Fn(&Vector, &Vector) -> bool,
    {
        config.validate()?;
        self.check_dataset(train, "training")?;
        self.check_dataset(test, "test")?;

        let mut history = TrainingHistory::default();
        if config.evaluate_before {
            let eval = self.evaluate(test, &success);
            info!("No training: {}", eval);
            history.baseline = Some(eval);
        }

        for epoch in 1..=config.epochs {
            let start = Instant::now();
            self.sgd(train, config.batch_size, config.learning_rate, config.parallel);
            let duration = start.elapsed();

            let evaluation = self.evaluate(test, &success);
            info!("Epoch {} ({} ms): {}", epoch, duration.as_millis(), evaluation);
            history.epochs.push(EpochReport {
                epoch,
                evaluation,
                duration,
            });
        }
        Ok(history)
    }

    /// Errors with `InvalidDataset` unless `data`'s input and label widths
    /// match this network's input and output sizes. `name` labels the message.
    pub fn check_dataset(&self, data: &Dataset, name: &str) -> Result<()> {
        if let Some(width) = data.input_width() {
            if width != self.input_size() {
                return Err(MlError::InvalidDataset(format!(
                    "{} inputs have length {}, network expects {}",
                    name,
                    width,
                    self.input_size()
                )));
            }
        }
        if let Some(width) = data.label_width() {
            if width != self.output_size() {
                return Err(MlError::InvalidDataset(format!(
                    "{} labels have length {}, network outputs {}",
                    name,
                    width,
                    self.output_size()
                )));
            }
        }
        Ok(())
    }

    /// Counts the examples `success(output, label)` accepts and averages the
    /// quadratic cost.
    pub fn evaluate<F>(&self, data: &Dataset, success: F) -> Evaluation
    where
        F: Fn(&Vector, &Vector) -> bool,
    {
        let mut successes = 0;
        let mut cost = 0.0;
        for (x, y) in data.iter() {
            let a = self.forward(x);
            cost += quadratic_cost(&a, y);
            if success(&a, y) {
                successes += 1;
            }
        }
        let total = data.len();
        Evaluation {
            successes,
            total,
            cost: if total == 0 { 0.0 } else { cost / total as f64 },
        }
    }

    /// Mean quadratic cost over `data`, 0 when empty.
    pub fn cost(&self, data: &Dataset) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let total: f64 = data.iter().map(|(x, y)| quadratic_cost(&self.forward(x), y)).sum();
        total / data.len() as f64
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serial::write(&mut writer, &self.state())?;
        writer.flush()?;
        Ok(())
    }

    /// Restores a network written by [`NeuralNetwork::save`]. `rand` drives
    /// any further training.
    pub fn load<P: AsRef<Path>>(path: P, rand: R) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let state: NetworkState = serial::read(reader)
            .map_err(|e| MlError::ModelLoadError(e.to_string()))?;
        Self::from_state(state, rand)
    }
}

impl<R: RandomSource> fmt::Display for NeuralNetwork<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "layers: {}", self.sizes.len())?;
        writeln!(f, "weights: ")?;
        for layer in &self.layers {
            writeln!(f, "{}", layer.w)?;
        }
        writeln!(f, "biases: ")?;
        for layer in &self.layers {
            writeln!(f, "{}", layer.b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector;

    fn toy_dataset(n: usize, seed: u64) -> Dataset {
        let mut rand = Random::new(seed);
        Dataset::from_pairs((0..n).map(|_| {
            let x: Vector = (0..3).map(|_| rand.next_double_range(-1.0, 1.0)).collect();
            let y = if x[0] + x[1] > 0.0 {
                vector![1.0, 0.0]
            } else {
                vector![0.0, 1.0]
            };
            (x, y)
        }))
        .unwrap()
    }

    fn argmax_match(a: &Vector, y: &Vector) -> bool {
        (a[0] > a[1]) == (y[0] > y[1])
    }

    #[test]
    fn test_new_shapes() {
        let net = NeuralNetwork::with_seed(&[3, 4, 2], 1).unwrap();
        assert_eq!(net.sizes(), &[3, 4, 2]);
        assert_eq!(net.layers().len(), 2);
        assert_eq!(net.layers()[0].w.shape(), (4, 3));
        assert_eq!(net.layers()[1].b.len(), 2);
        assert_eq!(net.param_count(), 26);
        assert!(net.summary().contains("Total params: 26"));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(matches!(
            NeuralNetwork::with_seed(&[], 1),
            Err(MlError::InvalidLayerConfiguration(_))
        ));
        assert!(NeuralNetwork::with_seed(&[5], 1).is_err());
        assert!(NeuralNetwork::with_seed(&[2, 0, 1], 1).is_err());
    }

    #[test]
    fn test_forward_is_bounded() {
        let net = NeuralNetwork::with_seed(&[3, 5, 4], 9).unwrap();
        let a = net.forward(&vector![10.0, -3.0, 0.5]);
        assert_eq!(a.len(), 4);
        assert!(a.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    #[should_panic(expected = "forward: input has length 2")]
    fn test_forward_rejects_wrong_input() {
        let net = NeuralNetwork::with_seed(&[3, 2], 9).unwrap();
        net.forward(&vector![1.0, 2.0]);
    }

    #[test]
    fn test_same_seed_same_training() {
        let mut a = NeuralNetwork::with_seed(&[3, 4, 2], 21).unwrap();
        let mut b = NeuralNetwork::with_seed(&[3, 4, 2], 21).unwrap();
        let mut da = toy_dataset(25, 2);
        let mut db = da.clone();
        a.sgd(&mut da, 4, 1.0, false);
        b.sgd(&mut db, 4, 1.0, false);
        assert_eq!(a.state(), b.state());
        assert_eq!(da, db);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut seq = NeuralNetwork::with_seed(&[3, 6, 2], 8).unwrap();
        let mut par = NeuralNetwork::with_seed(&[3, 6, 2], 8).unwrap();
        let mut ds = toy_dataset(40, 4);
        let mut dp = ds.clone();
        for _ in 0..3 {
            seq.sgd(&mut ds, 7, 2.0, false);
            par.sgd(&mut dp, 7, 2.0, true);
        }
        assert_eq!(seq.state(), par.state());
    }

    #[test]
    fn test_train_reports_each_epoch() {
        let mut net = NeuralNetwork::with_seed(&[3, 4, 2], 5).unwrap();
        let mut train = toy_dataset(50, 6);
        let test = toy_dataset(20, 7);
        let config = TrainConfig::new(3, 5, 3.0);
        let history = net.train(&config, &mut train, &test, argmax_match).unwrap();

        assert!(history.baseline.is_some());
        assert_eq!(history.epochs.len(), 3);
        assert_eq!(history.epochs[2].epoch, 3);
        assert!(history.epochs.iter().all(|r| r.evaluation.total == 20));
        let last = history.final_evaluation().unwrap();
        assert_eq!(last.cost, net.cost(&test));
    }

    #[test]
    fn test_train_rejects_bad_input() {
        let mut net = NeuralNetwork::with_seed(&[2, 2], 5).unwrap();
        let mut train = toy_dataset(4, 1);
        let test = Dataset::default();
        let config = TrainConfig::default();
        assert!(matches!(
            net.train(&config, &mut train, &test, argmax_match),
            Err(MlError::InvalidDataset(_))
        ));

        let mut net = NeuralNetwork::with_seed(&[3, 2], 5).unwrap();
        let config = TrainConfig::new(1, 0, 1.0);
        assert!(matches!(
            net.train(&config, &mut train, &test, argmax_match),
            Err(MlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_check_dataset_widths() {
        let data = toy_dataset(4, 1);
        let net = NeuralNetwork::with_seed(&[3, 2], 5).unwrap();
        assert!(net.check_dataset(&data, "bench").is_ok());
        assert!(net.check_dataset(&Dataset::default(), "bench").is_ok());

        let wide = NeuralNetwork::with_seed(&[784, 2], 5).unwrap();
        assert!(matches!(
            wide.check_dataset(&data, "bench"),
            Err(MlError::InvalidDataset(_))
        ));
        let many = NeuralNetwork::with_seed(&[3, 10], 5).unwrap();
        assert!(matches!(
            many.check_dataset(&data, "bench"),
            Err(MlError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_loaded_network_checked_against_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.bin");
        NeuralNetwork::with_seed(&[5, 2], 2).unwrap().save(&path).unwrap();

        let loaded = NeuralNetwork::load(&path, Random::new(0)).unwrap();
        assert!(matches!(
            loaded.check_dataset(&toy_dataset(3, 1), "benchmark"),
            Err(MlError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_evaluate_empty_set() {
        let net = NeuralNetwork::with_seed(&[3, 2], 5).unwrap();
        let eval = net.evaluate(&Dataset::default(), argmax_match);
        assert_eq!(eval.total, 0);
        assert_eq!(eval.percentage(), 0.0);
        assert_eq!(net.cost(&Dataset::default()), 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.bin");
        let net = NeuralNetwork::with_seed(&[3, 4, 2], 13).unwrap();
        net.save(&path).unwrap();

        let loaded = NeuralNetwork::load(&path, Random::new(0)).unwrap();
        assert_eq!(loaded.state(), net.state());
        let x = vector![0.1, 0.2, 0.3];
        assert_eq!(loaded.forward(&x), net.forward(&x));
        assert_eq!(net.to_string(), loaded.to_string());
    }

    #[test]
    fn test_load_rejects_inconsistent_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.bin");
        let mut state = NeuralNetwork::with_seed(&[3, 4, 2], 13).unwrap().state();
        state.sizes = vec![3, 5, 2];
        let mut file = File::create(&path).unwrap();
        serial::write(&mut file, &state).unwrap();
        drop(file);
        assert!(matches!(
            NeuralNetwork::load(&path, Random::new(0)),
            Err(MlError::ModelLoadError(_))
        ));

        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(matches!(
            NeuralNetwork::load(&path, Random::new(0)),
            Err(MlError::ModelLoadError(_))
        ));
    }
}
