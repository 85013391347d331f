//! Synthetic timing matrices with known ground truth.
//!
//! [`SyntheticBenchmark`] simulates a benchmark run: every block has a true
//! time drawn uniformly from a range, every measurement adds exponential
//! noise, and a few "silent" blocks cost almost nothing. Seeds make each
//! matrix reproducible.
//!
//! # Example
//!
//! ```ignore
//! use timing_estimate::helpers::SyntheticBenchmark;
//!
//! let bench = SyntheticBenchmark::new(5000, 20)
//!     .true_range(40.0, 61.0)
//!     .noise_mean(0.5)
//!     .silent_blocks(5);
//!
//! // Two runs over the same blocks, e.g. before/after a change
//! let times = bench.true_times(1);
//! let before = bench.measure(&times, 2)?;
//! let after = bench.measure(&times, 3)?;
//! ```

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{EstimateError, Result};
use crate::types::TimingMatrix;

/// Generator of synthetic timing matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBenchmark {
    num_blocks: usize,
    num_iters: usize,
    true_min: f64,
    true_max: f64,
    noise_mean: f64,
    silent_blocks: usize,
    silent_time: f64,
}

impl SyntheticBenchmark {
    /// `num_blocks x num_iters` matrix; true times in [40, 61], noise mean
    /// 0.5, no silent blocks.
    pub fn new(num_blocks: usize, num_iters: usize) -> Self {
        Self {
            num_blocks,
            num_iters,
            true_min: 40.0,
            true_max: 61.0,
            noise_mean: 0.5,
            silent_blocks: 0,
            silent_time: 0.01,
        }
    }

    /// Range of the uniform true block times.
    pub fn true_range(mut self, min: f64, max: f64) -> Self {
        self.true_min = min;
        self.true_max = max;
        self
    }

    /// Mean of the exponential noise; zero disables noise.
    pub fn noise_mean(mut self, mean: f64) -> Self {
        self.noise_mean = mean;
        self
    }

    /// Number of blocks with a near-zero true time.
    pub fn silent_blocks(mut self, n: usize) -> Self {
        self.silent_blocks = n;
        self
    }

    /// True time of the silent blocks (default: 0.01).
    pub fn silent_time(mut self, t: f64) -> Self {
        self.silent_time = t;
        self
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Number of iterations.
    pub fn num_iters(&self) -> usize {
        self.num_iters
    }

    /// Mean of the uniform true-time distribution.
    pub fn expected_mean(&self) -> f64 {
        0.5 * (self.true_min + self.true_max)
    }

    /// Indices of the silent blocks, spread evenly over the matrix.
    pub fn silent_indices(&self) -> Vec<usize> {
        let k = self.silent_blocks.min(self.num_blocks);
        (0..k).map(|j| j * self.num_blocks / k).collect()
    }

    /// Draw the true time of every block.
    pub fn true_times(&self, seed: u64) -> Vec<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let (lo, hi) = if self.true_min <= self.true_max {
            (self.true_min, self.true_max)
        } else {
            (self.true_max, self.true_min)
        };
        let mut times: Vec<f64> = (0..self.num_blocks)
            .map(|_| rng.random_range(lo..=hi))
            .collect();
        for i in self.silent_indices() {
            times[i] = self.silent_time;
        }
        times
    }

    /// Measure the given true times `num_iters` times each.
    pub fn measure(&self, true_times: &[f64], seed: u64) -> Result<TimingMatrix> {
        let noise = if self.noise_mean > 0.0 {
            Some(Exp::new(1.0 / self.noise_mean).map_err(|_| {
                EstimateError::invalid("noise_mean", self.noise_mean, "must be finite")
            })?)
        } else if self.noise_mean == 0.0 {
            None
        } else {
            return Err(EstimateError::invalid(
                "noise_mean",
                self.noise_mean,
                "must be non-negative",
            ));
        };

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let rows: Vec<Vec<f64>> = true_times
            .iter()
            .map(|&t| {
                (0..self.num_iters)
                    .map(|_| t + noise.as_ref().map_or(0.0, |d| d.sample(&mut rng)))
                    .collect::<Vec<f64>>()
            })
            .collect();
        TimingMatrix::from_rows(rows)
    }

    /// True times and measurements from one seed.
    pub fn generate(&self, seed: u64) -> Result<TimingMatrix> {
        let times = self.true_times(seed);
        self.measure(&times, seed.wrapping_add(0x9E37_79B9_7F4A_7C15))
    }
}
