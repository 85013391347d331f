//! Empirical CDF of the noise and the quantile of the minimum of n draws.
//!
//! Taking a per-block minimum over `n` iterations removes most, but not all,
//! measurement noise. The residual is distributed like the minimum of `n`
//! i.i.d. noise draws:
//!
//! ```text
//! F(x) = #{s < x} / |S|
//! G(x) = 1 - (1 - F(x))^n
//! ```
//!
//! `G` is non-decreasing because `F` is, so bisection on `G(x) = p` is valid
//! without continuity.

use crate::error::{EstimateError, Result};

/// Default number of bisection steps; halves the range down to 2^-60.
pub const BISECTION_ITERATIONS: usize = 60;

/// Empirical distribution of a sample, kept sorted for O(log n) evaluation.
#[derive(Debug, Clone)]
pub struct EmpiricalCdf {
    sorted: Vec<f64>,
}

impl EmpiricalCdf {
    /// Build from an unordered sample.
    pub fn new(sample: &[f64]) -> Result<Self> {
        if sample.is_empty() {
            return Err(EstimateError::EmptySample);
        }
        let mut sorted = sample.to_vec();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        Ok(Self { sorted })
    }

    /// Fraction of the sample strictly below `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        let below = self.sorted.partition_point(|&s| s < x);
        below as f64 / self.sorted.len() as f64
    }

    /// CDF of the minimum of `n` independent draws.
    pub fn min_cdf(&self, x: f64, n: usize) -> f64 {
        let survive = 1.0 - self.cdf(x);
        let all_above = match i32::try_from(n) {
            Ok(n) => survive.powi(n),
            Err(_) => survive.powf(n as f64),
        };
        1.0 - all_above
    }

    /// Smallest sample value.
    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    /// Largest sample value.
    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Always false; construction rejects empty samples.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Sorted sample values.
    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    /// The `p`-quantile of the minimum of `n` draws, by bisection.
    ///
    /// A point distribution (min == max) returns that point for any `p`, `n`.
    pub fn quantile_of_min(&self, p: f64, n: usize, iterations: usize) -> Result<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(EstimateError::invalid("p", p, "must be in (0, 1)"));
        }
        if n == 0 {
            return Err(EstimateError::invalid("n", 0.0, "must be at least 1"));
        }

        let (mut lo, mut hi) = (self.min(), self.max());
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(EstimateError::DegenerateRange { min: lo, max: hi });
        }
        if lo == hi {
            return Ok(lo);
        }

        for _ in 0..iterations {
            let mid = 0.5 * (lo + hi);
            if self.min_cdf(mid, n) < p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(0.5 * (lo + hi))
    }

    /// Largest vertical gap between this CDF and `model`, evaluated at each
    /// sample point from both sides (Kolmogorov-Smirnov distance).
    pub fn ks_distance<F>(&self, model: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let n = self.sorted.len() as f64;
        self.sorted
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let m = model(x);
                let before = i as f64 / n;
                let after = (i + 1) as f64 / n;
                (m - before).abs().max((after - m).abs())
            })
            .fold(0.0, f64::max)
    }
}

/// Quantile of the minimum of `n` draws from `sample`, with the default
/// bisection depth.
pub fn quantile_of_min(p: f64, n: usize, sample: &[f64]) -> Result<f64> {
    EmpiricalCdf::new(sample)?.quantile_of_min(p, n, BISECTION_ITERATIONS)
}
