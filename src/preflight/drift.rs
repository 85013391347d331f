//! Drift across iterations.
//!
//! Iterations are separate passes over all blocks. If the machine warms up,
//! throttles, or picks up background load partway through, later passes are
//! systematically slower or faster than earlier ones and the noise is no
//! longer stationary.

use serde::{Deserialize, Serialize};

use crate::statistics::mean;
use crate::types::TimingMatrix;

/// Relative change between halves that triggers a warning.
pub const DRIFT_THRESHOLD: f64 = 0.05;

/// Warning from the drift check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriftWarning {
    /// Mean time shifted between the first and second half of the iterations.
    IterationDrift {
        /// Mean time of the first half of the iterations.
        first_half_mean: f64,
        /// Mean time of the second half.
        second_half_mean: f64,
        /// `(second - first) / first`.
        relative_change: f64,
    },
}

impl DriftWarning {
    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            DriftWarning::IterationDrift {
                first_half_mean,
                second_half_mean,
                relative_change,
            } => format!(
                "Iteration drift: second half of the iterations is {:+.1}% vs the first \
                 ({:.2} -> {:.2}). Noise may not be stationary.",
                relative_change * 100.0,
                first_half_mean,
                second_half_mean
            ),
        }
    }
}

/// Compare the mean time of the first and second half of the iterations.
pub fn drift_check(matrix: &TimingMatrix) -> Option<DriftWarning> {
    let means = matrix.iteration_means();
    if means.len() < 4 {
        return None;
    }
    let (first, second) = means.split_at(means.len() / 2);
    let first_half_mean = mean(first);
    let second_half_mean = mean(second);
    if first_half_mean <= 0.0 {
        return None;
    }

    let relative_change = (second_half_mean - first_half_mean) / first_half_mean;
    (relative_change.abs() > DRIFT_THRESHOLD).then_some(DriftWarning::IterationDrift {
        first_half_mean,
        second_half_mean,
        relative_change,
    })
}
