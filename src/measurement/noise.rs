//! Empirical noise sample: excess time of each cell over its block minimum.
//!
//! Separating "which block is slow" (signal) from "how much is added on top"
//! (noise) lets the noise model be estimated independently of the inherent
//! timing variation between blocks. Noise is assumed stationary across
//! blocks.

use crate::error::{EstimateError, Result};
use crate::types::{BlockMinima, NoiseSample, TimingMatrix};

/// Cell counts from building a noise sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoiseCounts {
    /// Cells examined.
    pub total: usize,
    /// Cells with zero excess (the block minimum and ties with it).
    pub zero_excess: usize,
    /// Cells in iterations above the iteration threshold.
    pub slow_iteration: usize,
    /// Cells at or above `extreme_ratio x block minimum`.
    pub extreme: usize,
    /// Cells kept in the sample.
    pub retained: usize,
}

/// Collect the positive excesses of cells in non-slow iterations.
///
/// A cell contributes `matrix[b][i] - minima[b]` when that excess is strictly
/// positive and iteration `i` has a mean time at or below
/// `iteration_threshold`.
pub fn sample_noise(
    matrix: &TimingMatrix,
    minima: &BlockMinima,
    iteration_threshold: f64,
) -> Result<NoiseSample> {
    sample_noise_filtered(matrix, minima, iteration_threshold, None).map(|(sample, _)| sample)
}

/// [`sample_noise`] with an optional extreme-noise cutoff.
///
/// With `Some(ratio)`, cells at or above `ratio x block minimum` are also
/// dropped; they come from disturbances too rare and too large to model.
pub fn sample_noise_filtered(
    matrix: &TimingMatrix,
    minima: &BlockMinima,
    iteration_threshold: f64,
    extreme_ratio: Option<f64>,
) -> Result<(NoiseSample, NoiseCounts)> {
    if minima.len() != matrix.num_blocks() {
        return Err(EstimateError::MisalignedInput {
            before: matrix.num_blocks(),
            after: minima.len(),
        });
    }

    let keep_iteration: Vec<bool> = matrix
        .iteration_means()
        .into_iter()
        .map(|m| m <= iteration_threshold)
        .collect();

    let mut counts = NoiseCounts::default();
    let mut sample = Vec::new();

    for (row, &min) in matrix.rows().zip(minima.as_slice()) {
        let cutoff = extreme_ratio.map(|r| r * min);
        for (value, &keep) in row.into_iter().zip(&keep_iteration) {
            counts.total += 1;
            let excess = value - min;
            if excess <= 0.0 {
                counts.zero_excess += 1;
            } else if !keep {
                counts.slow_iteration += 1;
            } else if cutoff.is_some_and(|c| value >= c) {
                counts.extreme += 1;
            } else {
                sample.push(excess);
            }
        }
    }

    counts.retained = sample.len();
    Ok((NoiseSample(sample), counts))
}

/// Mean excess over the block minima across every cell, zeros included.
pub fn mean_excess(matrix: &TimingMatrix, minima: &BlockMinima) -> f64 {
    let total: f64 = matrix
        .rows()
        .zip(minima.as_slice())
        .map(|(row, &min)| row.into_iter().map(|t| t - min).sum::<f64>())
        .sum();
    total / (matrix.num_blocks() * matrix.num_iters()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::extract_minima;

    fn matrix() -> TimingMatrix {
        // Iteration means: 10.5, 10.0, 13.0, 10.75 -> median 10.625
        TimingMatrix::from_rows(vec![
            vec![11.0, 10.0, 14.0, 10.5],
            vec![10.0, 10.0, 12.0, 11.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_excludes_minimum_and_slow_iterations() {
        let m = matrix();
        let minima = extract_minima(&m).unwrap();
        let (sample, counts) = sample_noise_filtered(&m, &minima, 10.625, None).unwrap();

        // Iterations 0 and 1 are below the threshold; only block 0 / iteration 0
        // has positive excess among them.
        assert_eq!(sample, NoiseSample(vec![1.0]));
        assert_eq!(counts.total, 8);
        assert_eq!(counts.zero_excess, 3);
        assert_eq!(counts.slow_iteration, 4);
        assert_eq!(counts.retained, 1);
    }

    #[test]
    fn test_all_iterations_kept_with_high_threshold() {
        let m = matrix();
        let minima = extract_minima(&m).unwrap();
        let sample = sample_noise(&m, &minima, f64::INFINITY).unwrap();
        let mut values = sample.0.clone();
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(values, vec![0.5, 1.0, 1.0, 2.0, 4.0]);
        assert!(values.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_extreme_cutoff() {
        let m = matrix();
        let minima = extract_minima(&m).unwrap();
        let (sample, counts) =
            sample_noise_filtered(&m, &minima, f64::INFINITY, Some(1.05)).unwrap();
        // Every positive excess here is at least 5% of its block minimum
        assert!(sample.is_empty());
        assert_eq!(counts.extreme, 5);
    }

    #[test]
    fn test_misaligned_minima() {
        let m = matrix();
        let minima = BlockMinima(vec![1.0]);
        assert!(matches!(
            sample_noise(&m, &minima, 100.0),
            Err(EstimateError::MisalignedInput { .. })
        ));
    }

    #[test]
    fn test_tied_iteration_means_keep_every_iteration() {
        // Both iteration means are 10.5, equal to their median
        let rows: Vec<Vec<f64>> = (0..600)
            .map(|b| {
                if b % 2 == 0 {
                    vec![10.0, 11.0]
                } else {
                    vec![11.0, 10.0]
                }
            })
            .collect();
        let m = TimingMatrix::from_rows(rows).unwrap();
        let minima = extract_minima(&m).unwrap();

        let (sample, counts) = sample_noise_filtered(&m, &minima, 10.5, None).unwrap();
        assert_eq!(sample.len(), 600);
        assert_eq!(counts.slow_iteration, 0);
        assert!(sample.as_slice().iter().all(|&e| e == 1.0));
    }

    #[test]
    fn test_median_iteration_kept_for_odd_count() {
        // Iteration means 10.5, 11.0, 12.5 -> median 11.0 (iteration 1)
        let m = TimingMatrix::from_rows(vec![
            vec![10.0, 11.0, 12.0],
            vec![11.0, 11.0, 13.0],
        ])
        .unwrap();
        let minima = extract_minima(&m).unwrap();
        let (sample, counts) = sample_noise_filtered(&m, &minima, 11.0, None).unwrap();

        // Block 0 / iteration 1 has excess 1.0; block 1's iterations 0 and 1 tie
        // its minimum; only iteration 2 is slow.
        assert_eq!(sample, NoiseSample(vec![1.0]));
        assert_eq!(counts.slow_iteration, 2);
        assert_eq!(counts.zero_excess, 3);
    }

    #[test]
    fn test_mean_excess() {
        let m = matrix();
        let minima = extract_minima(&m).unwrap();
        // Excesses: 1, 0, 4, 0.5, 0, 0, 2, 1 -> 8.5 / 8
        assert!((mean_excess(&m, &minima) - 8.5 / 8.0).abs() < 1e-12);
    }
}
