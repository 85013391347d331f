//! Confidence interval for the true per-block time.
//!
//! Noise only ever adds time, so the mean of the filtered minima overestimates
//! the true mean by the residual noise that survived the minimum. With `q` the
//! noise-of-minimum quantile, the true mean lies at or above
//! `mean(filtered) - q` with probability of about `p`. The reported interval
//! `[mean - q, mean]` is centered for display only; its lower end is the
//! one-sided bound.

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::statistics::mean;

/// Point estimate plus half-width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Midpoint of the interval.
    pub center: f64,
    /// Half the noise-of-minimum quantile.
    pub half_width: f64,
}

impl Estimate {
    /// `center - half_width`; also the one-sided lower bound.
    pub fn lower(&self) -> f64 {
        self.center - self.half_width
    }

    /// `center + half_width`, the mean of the filtered minima.
    pub fn upper(&self) -> f64 {
        self.center + self.half_width
    }

    /// Bound the true mean stays above with the configured confidence.
    pub fn one_sided_lower_bound(&self) -> f64 {
        self.lower()
    }

    /// Half-width relative to the center; infinite for a zero center.
    pub fn relative_half_width(&self) -> f64 {
        if self.center == 0.0 {
            f64::INFINITY
        } else {
            self.half_width / self.center
        }
    }
}

/// Combine the filtered block minima with the noise-of-minimum quantile.
///
/// `center = mean(filtered_minima) - noise_quantile / 2` and
/// `half_width = noise_quantile / 2`.
pub fn build_interval(filtered_minima: &[f64], noise_quantile: f64) -> Result<Estimate> {
    if filtered_minima.is_empty() {
        return Err(EstimateError::EmptyInput {
            what: "filtered block minima",
        });
    }

    let half_width = noise_quantile / 2.0;
    let center = mean(filtered_minima) - half_width;

    if half_width.is_nan() || half_width < 0.0 {
        return Err(EstimateError::InvariantViolation {
            what: "half-width must be a non-negative number",
            value: half_width,
        });
    }
    if center.is_nan() || center < 0.0 {
        return Err(EstimateError::InvariantViolation {
            what: "center must be a non-negative number",
            value: center,
        });
    }

    let estimate = Estimate { center, half_width };
    if !estimate.lower().is_finite() || estimate.lower() < 0.0 {
        return Err(EstimateError::InvariantViolation {
            what: "lower bound must be finite and non-negative",
            value: estimate.lower(),
        });
    }
    Ok(estimate)
}
