//! Fast-block and slow-iteration classification.
//!
//! Two kinds of data are set aside, for different reasons:
//! 1. Blocks whose minimum is far below the mean (silence, short blocks).
//!    Their timings are real but they distort the mean time per sample, so
//!    they are excluded from the point estimate.
//! 2. Iterations whose mean time is above the median iteration. A globally
//!    slow run (scheduling, cache pressure, background daemons) inflates the
//!    noise model, so those iterations are excluded from noise analysis only.
//!    Their minima are still informative and stay in minimum extraction.

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::statistics::{mean, median, quantile};
use crate::types::BlockMinima;

/// Statistics about what outlier classification set aside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierStats {
    /// Threshold on block minima; blocks at or below it are fast outliers.
    pub block_threshold: f64,
    /// Indices of fast blocks.
    pub fast_blocks: Vec<usize>,
    /// Fraction of blocks that were fast (0.0 to 1.0).
    pub fast_fraction: f64,
    /// Median of iteration means; iterations above it are excluded from noise.
    pub iteration_threshold: f64,
    /// Indices of iterations excluded from the noise sample.
    pub slow_iterations: Vec<usize>,
    /// Total cells in the matrix.
    pub total_cells: usize,
    /// Cells dropped from the noise sample as extreme (see `extreme_noise_ratio`).
    pub extreme_cells: usize,
    /// Cells that made it into the noise sample.
    pub noise_cells: usize,
}

impl OutlierStats {
    /// Fraction of all cells retained in the noise sample.
    pub fn noise_fraction(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.noise_cells as f64 / self.total_cells as f64
        }
    }
}

/// Threshold below which a block counts as a fast outlier.
///
/// Returns `mean(minima) * factor`. Fails with [`EstimateError::Distribution`]
/// if the `quantile_p` quantile of the minima is not strictly above the
/// threshold: then many more blocks than expected are fast, the factor is
/// miscalibrated for this data, and any estimate would be biased.
pub fn classify_blocks(minima: &BlockMinima, factor: f64, quantile_p: f64) -> Result<f64> {
    if minima.is_empty() {
        return Err(EstimateError::EmptyInput { what: "no block minima" });
    }
    let threshold = mean(minima.as_slice()) * factor;
    let low = quantile(minima.as_slice(), quantile_p);
    if low.is_nan() || low <= threshold {
        return Err(EstimateError::Distribution {
            quantile_p,
            quantile: low,
            threshold,
            factor,
        });
    }
    Ok(threshold)
}

/// Split minima into those above `threshold` and the indices of fast blocks.
pub fn split_blocks(minima: &BlockMinima, threshold: f64) -> (Vec<f64>, Vec<usize>) {
    let mut filtered = Vec::with_capacity(minima.len());
    let mut fast = Vec::new();
    for (i, &m) in minima.as_slice().iter().enumerate() {
        if m > threshold {
            filtered.push(m);
        } else {
            fast.push(i);
        }
    }
    (filtered, fast)
}

/// Threshold on iteration means: their median.
pub fn classify_iterations(iter_means: &[f64]) -> Result<f64> {
    if iter_means.is_empty() {
        return Err(EstimateError::EmptyInput { what: "no iterations" });
    }
    Ok(median(iter_means))
}

/// Indices of iterations whose mean exceeds `threshold`.
///
/// An iteration whose mean equals the threshold is kept, so tied iteration
/// means never empty the noise sample.
pub fn slow_iterations(iter_means: &[f64], threshold: f64) -> Vec<usize> {
    iter_means
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m > threshold)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minima_with_fast(normal: usize, fast: usize) -> BlockMinima {
        let mut v: Vec<f64> = (0..normal).map(|i| 40.0 + (i % 21) as f64).collect();
        for i in 0..fast {
            v[i * (normal / fast.max(1))] = 0.01;
        }
        BlockMinima(v)
    }

    #[test]
    fn test_threshold_is_scaled_mean() {
        let minima = BlockMinima(vec![10.0; 1000]);
        let threshold = classify_blocks(&minima, 0.75, 0.002).unwrap();
        assert!((threshold - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_few_fast_blocks_are_split_off() {
        let minima = minima_with_fast(5000, 5);
        let threshold = classify_blocks(&minima, 0.75, 0.002).unwrap();
        let (filtered, fast) = split_blocks(&minima, threshold);
        assert_eq!(fast.len(), 5);
        assert_eq!(filtered.len(), 4995);
        assert!(fast.iter().all(|&i| minima.as_slice()[i] == 0.01));
    }

    #[test]
    fn test_too_many_fast_blocks_fails() {
        // 1% fast blocks puts the 0.2% quantile among them
        let minima = minima_with_fast(1000, 10);
        let err = classify_blocks(&minima, 0.75, 0.002).unwrap_err();
        match err {
            EstimateError::Distribution {
                quantile, threshold, ..
            } => assert!(quantile <= threshold),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_wide_distribution_fails() {
        // Uniform minima in [1, 100]: over a third of blocks sit below 0.75 x mean
        let minima = BlockMinima((0..1000).map(|i| 1.0 + 99.0 * i as f64 / 999.0).collect());
        assert!(matches!(
            classify_blocks(&minima, 0.75, 0.002),
            Err(EstimateError::Distribution { .. })
        ));
    }

    #[test]
    fn test_empty_minima_fails() {
        assert!(matches!(
            classify_blocks(&BlockMinima(vec![]), 0.75, 0.002),
            Err(EstimateError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_iteration_threshold_is_median() {
        let means = [5.0, 1.0, 3.0, 2.0, 4.0];
        let threshold = classify_iterations(&means).unwrap();
        assert_eq!(threshold, 3.0);
        // The median iteration itself stays
        assert_eq!(slow_iterations(&means, threshold), vec![0, 4]);
    }

    #[test]
    fn test_tied_iteration_means_are_not_slow() {
        let means = [10.5, 10.5];
        let threshold = classify_iterations(&means).unwrap();
        assert!(slow_iterations(&means, threshold).is_empty());
    }

    #[test]
    fn test_noise_fraction() {
        let stats = OutlierStats {
            block_threshold: 1.0,
            fast_blocks: vec![],
            fast_fraction: 0.0,
            iteration_threshold: 1.0,
            slow_iterations: vec![],
            total_cells: 200,
            extreme_cells: 0,
            noise_cells: 50,
        };
        assert_eq!(stats.noise_fraction(), 0.25);
    }
}
