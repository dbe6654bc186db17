use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Outcome of running a network over a labelled set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub successes: usize,
    pub total: usize,
    /// Mean quadratic cost over the set, 0 when the set is empty.
    pub cost: f64,
}

impl Evaluation {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.successes as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} / {} ({:.2}%)", self.successes, self.total, self.percentage())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub evaluation: Evaluation,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    /// Evaluation before the first epoch, when requested.
    pub baseline: Option<Evaluation>,
    pub epochs: Vec<EpochReport>,
}

impl TrainingHistory {
    pub fn accuracies(&self) -> Vec<f64> {
        self.epochs.iter().map(|r| r.evaluation.percentage()).collect()
    }

    pub fn costs(&self) -> Vec<f64> {
        self.epochs.iter().map(|r| r.evaluation.cost).collect()
    }

    pub fn final_evaluation(&self) -> Option<Evaluation> {
        self.epochs.last().map(|r| r.evaluation).or(self.baseline)
    }

    pub fn total_duration(&self) -> Duration {
        self.epochs.iter().map(|r| r.duration).sum()
    }
}

#[derive(Serialize)]
struct HistoryRecord {
    epoch: usize,
    successes: usize,
    total: usize,
    accuracy: f64,
    cost: f64,
    duration_ms: u64,
}

/// Writes one row per epoch; the baseline, if any, is written as epoch 0.
pub fn write_history_csv<P: AsRef<Path>>(history: &TrainingHistory, path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;

    if let Some(base) = history.baseline {
        wtr.serialize(HistoryRecord {
            epoch: 0,
            successes: base.successes,
            total: base.total,
            accuracy: base.percentage(),
            cost: base.cost,
            duration_ms: 0,
        })?;
    }
    for report in &history.epochs {
        wtr.serialize(HistoryRecord {
            epoch: report.epoch,
            successes: report.evaluation.successes,
            total: report.evaluation.total,
            accuracy: report.evaluation.percentage(),
            cost: report.evaluation.cost,
            duration_ms: report.duration.as_millis() as u64,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
