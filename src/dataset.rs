use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::core::normalization::Normalization;
use crate::core::random::RandomSource;
use crate::core::vector::Vector;
use crate::error::{MlError, Result};

pub const IMAGE_WIDTH: usize = 28;
pub const IMAGE_HEIGHT: usize = 28;
pub const IMAGE_SIZE: usize = IMAGE_WIDTH * IMAGE_HEIGHT;
pub const DIGITS: usize = 10;

/// One label byte followed by the pixel bytes.
pub const RECORD_SIZE: usize = IMAGE_SIZE + 1;

/// Index-aligned feature and label vectors.
///
/// All inputs share one length and all labels share one length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    inputs: Vec<Vector>,
    labels: Vec<Vector>,
}

impl Dataset {
    pub fn new(inputs: Vec<Vector>, labels: Vec<Vector>) -> Result<Self> {
        if inputs.len() != labels.len() {
            return Err(MlError::InvalidDataset(format!(
                "{} inputs but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        check_uniform(&inputs, "input")?;
        check_uniform(&labels, "label")?;
        Ok(Self { inputs, labels })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vector, Vector)>,
    {
        let (inputs, labels) = pairs.into_iter().unzip();
        Self::new(inputs, labels)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Vector] {
        &self.inputs
    }

    pub fn labels(&self) -> &[Vector] {
        &self.labels
    }

    pub fn get(&self, i: usize) -> Option<(&Vector, &Vector)> {
        Some((self.inputs.get(i)?, self.labels.get(i)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vector, &Vector)> + '_ {
        self.inputs.iter().zip(self.labels.iter())
    }

    /// Width of each input, `None` when empty.
    pub fn input_width(&self) -> Option<usize> {
        self.inputs.first().map(Vector::len)
    }

    pub fn label_width(&self) -> Option<usize> {
        self.labels.first().map(Vector::len)
    }

    /// Fisher-Yates shuffle applying one permutation to inputs and labels.
    pub fn shuffle<R: RandomSource>(&mut self, rand: &mut R) {
        rand.shuffle_pairs(&mut self.inputs, &mut self.labels);
    }
}

fn check_uniform(vs: &[Vector], what: &str) -> Result<()> {
    if let Some(first) = vs.first() {
        if let Some((i, v)) = vs.iter().enumerate().find(|(_, v)| v.len() != first.len()) {
            return Err(MlError::InvalidDataset(format!(
                "{} {} has length {}, expected {}",
                what,
                i,
                v.len(),
                first.len()
            )));
        }
    }
    Ok(())
}

/// Reads a file of fixed-size digit records, see [`parse_mnist`].
pub fn load_mnist<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let data = parse_mnist(&bytes)?;
    debug!("Loaded {} samples from {}", data.len(), path.display());
    Ok(data)
}

/// Parses `[label: u8][pixels: u8; 784]` records. Pixels are scaled into
/// `[0, 1]` and labels one-hot encoded; a trailing partial record is dropped.
pub fn parse_mnist(bytes: &[u8]) -> Result<Dataset> {
    let records = bytes.chunks_exact(RECORD_SIZE);
    let rest = records.remainder().len();
    if rest != 0 {
        warn!("Ignoring {} trailing bytes (incomplete record)", rest);
    }

    let mut inputs = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    let mut labels = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    for (i, record) in records.enumerate() {
        let digit = record[0] as usize;
        if digit >= DIGITS {
            return Err(MlError::InvalidDataset(format!(
                "record {} has label {}, expected 0-9",
                i, digit
            )));
        }
        let mut x: Vector = record[1..].iter().map(|&p| f64::from(p)).collect();
        x.to_unity(0.0, 255.0);
        inputs.push(x);
        labels.push(digit_to_vector(digit));
    }
    Dataset::new(inputs, labels)
}

/// One-hot encoding of `digit` over ten classes.
pub fn digit_to_vector(digit: usize) -> Vector {
    assert!(digit < DIGITS, "digit {} out of range", digit);
    let mut v = Vector::zero(DIGITS);
    v[digit] = 1.0;
    v
}

/// Index of the largest component; the first wins on ties.
pub fn vector_to_digit(v: &Vector) -> usize {
    let mut max = 0;
    for i in 1..v.len() {
        if v[i] > v[max] {
            max = i;
        }
    }
    max
}

/// Success predicate comparing arg-max of output and label.
pub fn same_digit(output: &Vector, label: &Vector) -> bool {
    vector_to_digit(output) == vector_to_digit(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::Random;
    use crate::vector;

    fn record(label: u8, fill: u8) -> Vec<u8> {
        let mut r = vec![fill; RECORD_SIZE];
        r[0] = label;
        r
    }

    #[test]
    fn test_new_rejects_mismatched_lengths() {
        let res = Dataset::new(vec![vector![1.0]], vec![]);
        assert!(matches!(res, Err(MlError::InvalidDataset(_))));

        let res = Dataset::new(vec![vector![1.0], vector![1.0, 2.0]], vec![vector![0.0], vector![1.0]]);
        assert!(matches!(res, Err(MlError::InvalidDataset(_))));
    }

    #[test]
    fn test_shuffle_keeps_pairs_together() {
        let mut data = Dataset::from_pairs((0..20).map(|i| {
            let x = i as f64;
            (vector![x], vector![10.0 * x])
        }))
        .unwrap();
        data.shuffle(&mut Random::new(3));

        assert_eq!(data.len(), 20);
        for (x, y) in data.iter() {
            assert_eq!(y[0], 10.0 * x[0]);
        }
        let mut xs: Vec<f64> = data.inputs().iter().map(|v| v[0]).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, (0..20).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_mnist_records() {
        let mut bytes = record(3, 255);
        bytes.extend(record(7, 0));
        bytes.extend([1, 2, 3]);

        let data = parse_mnist(&bytes).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.input_width(), Some(IMAGE_SIZE));
        assert_eq!(data.label_width(), Some(DIGITS));

        let (x0, y0) = data.get(0).unwrap();
        assert!(x0.iter().all(|&p| p == 1.0));
        assert_eq!(vector_to_digit(y0), 3);
        let (x1, y1) = data.get(1).unwrap();
        assert!(x1.iter().all(|&p| p == 0.0));
        assert_eq!(y1, &digit_to_vector(7));
        assert!(data.get(2).is_none());
    }

    #[test]
    fn test_parse_mnist_rejects_bad_label() {
        let bytes = record(12, 0);
        assert!(matches!(parse_mnist(&bytes), Err(MlError::InvalidDataset(_))));
    }

    #[test]
    fn test_load_mnist_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digits.data");
        std::fs::write(&path, record(5, 51)).unwrap();

        let data = load_mnist(&path).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.inputs()[0][0], 0.2);
        assert!(matches!(load_mnist(dir.path().join("missing")), Err(MlError::IoError(_))));
    }

    #[test]
    fn test_digit_helpers() {
        let v = digit_to_vector(4);
        assert_eq!(v.iter().sum::<f64>(), 1.0);
        assert_eq!(vector_to_digit(&v), 4);
        assert_eq!(vector_to_digit(&vector![0.2, 0.9, 0.9]), 1);
        assert!(same_digit(&vector![0.1, 0.8, 0.3], &vector![0.0, 1.0, 0.0]));
        assert!(!same_digit(&vector![0.9, 0.8, 0.3], &vector![0.0, 1.0, 0.0]));
    }
}
