//! Configuration for timing estimation.

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// Configuration options for [`Estimator`](crate::Estimator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Multiplier on the mean block minimum below which a block counts as a
    /// fast outlier (default: 0.75).
    pub outlier_factor: f64,

    /// Quantile of the block minima that must stay above the outlier
    /// threshold (default: 0.002).
    ///
    /// If it does not, far more blocks than expected are "fast" and the
    /// estimate would be biased, so analysis fails instead.
    pub outlier_quantile: f64,

    /// Probability of the noise-of-minimum quantile (default: 0.95).
    pub confidence: f64,

    /// Bisection steps for the quantile of the minimum (default: 60).
    pub bisection_iterations: usize,

    /// Optional cutoff on cells slower than `ratio x block minimum`.
    ///
    /// Such cells are dropped from the noise sample. `None` keeps all
    /// (default). 1.05 discards everything 5% above the block minimum.
    pub extreme_noise_ratio: Option<f64>,

    /// Blocks below which preflight warns that statistics are thin (default: 500).
    pub min_blocks: usize,

    /// Fit exponential, Erlang and log-normal models to the noise (default: true).
    pub fit_distributions: bool,

    /// Iteration cap for the Erlang shape search (default: 100).
    pub erlang_max_iterations: usize,

    /// Convergence tolerance for the Erlang shape search (default: 1e-9).
    pub erlang_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            outlier_factor: 0.75,
            outlier_quantile: 0.002,
            confidence: 0.95,
            bisection_iterations: 60,
            extreme_noise_ratio: None,
            min_blocks: 500,
            fit_distributions: true,
            erlang_max_iterations: 100,
            erlang_tolerance: 1e-9,
        }
    }
}

impl Config {
    /// Check that every field is inside its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.outlier_factor.is_finite() && self.outlier_factor >= 0.0) {
            return Err(EstimateError::invalid(
                "outlier_factor",
                self.outlier_factor,
                "must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.outlier_quantile) {
            return Err(EstimateError::invalid(
                "outlier_quantile",
                self.outlier_quantile,
                "must be in [0, 1]",
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(EstimateError::invalid(
                "confidence",
                self.confidence,
                "must be in (0, 1)",
            ));
        }
        if self.bisection_iterations == 0 {
            return Err(EstimateError::invalid(
                "bisection_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        if let Some(ratio) = self.extreme_noise_ratio {
            if !(ratio.is_finite() && ratio > 1.0) {
                return Err(EstimateError::invalid(
                    "extreme_noise_ratio",
                    ratio,
                    "must be finite and greater than 1",
                ));
            }
        }
        if !(self.erlang_tolerance.is_finite() && self.erlang_tolerance > 0.0) {
            return Err(EstimateError::invalid(
                "erlang_tolerance",
                self.erlang_tolerance,
                "must be positive",
            ));
        }
        Ok(())
    }
}
