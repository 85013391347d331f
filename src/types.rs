//! Timing matrix and the derived per-block and per-cell series.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

/// Raw timings: one row per block, one column per iteration.
///
/// All cells are finite and non-negative, and there is at least one block
/// and one iteration. The matrix is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingMatrix {
    data: DMatrix<f64>,
}

impl TimingMatrix {
    /// Build a matrix from rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let num_blocks = rows.len();
        if num_blocks == 0 {
            return Err(EstimateError::EmptyInput { what: "no blocks" });
        }
        let num_iters = rows[0].len();
        if num_iters == 0 {
            return Err(EstimateError::EmptyInput {
                what: "no iterations",
            });
        }

        for (row, values) in rows.iter().enumerate() {
            if values.len() != num_iters {
                return Err(EstimateError::Ragged {
                    row,
                    expected: num_iters,
                    found: values.len(),
                });
            }
            if let Some((column, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(EstimateError::NegativeTiming { row, column, value });
            }
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Self {
            data: DMatrix::from_row_slice(num_blocks, num_iters, &flat),
        })
    }

    /// Number of blocks (rows).
    pub fn num_blocks(&self) -> usize {
        self.data.nrows()
    }

    /// Number of iterations (columns).
    pub fn num_iters(&self) -> usize {
        self.data.ncols()
    }

    /// Timing of `block` in `iteration`.
    pub fn get(&self, block: usize, iteration: usize) -> f64 {
        self.data[(block, iteration)]
    }

    /// All timings of one block, in iteration order.
    pub fn row(&self, block: usize) -> Vec<f64> {
        self.data.row(block).iter().copied().collect()
    }

    /// Iterate over blocks, yielding each row's timings.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        self.data
            .row_iter()
            .map(|row| row.iter().copied().collect())
    }

    /// Mean time of each iteration across all blocks.
    pub fn iteration_means(&self) -> Vec<f64> {
        let n = self.num_blocks() as f64;
        self.data
            .column_iter()
            .map(|column| column.iter().sum::<f64>() / n)
            .collect()
    }

    /// Mean time of each block across all iterations.
    pub fn block_means(&self) -> Vec<f64> {
        let n = self.num_iters() as f64;
        self.data
            .row_iter()
            .map(|row| row.iter().sum::<f64>() / n)
            .collect()
    }

    /// Apply `f` to every cell, e.g. to inject a constant slowdown.
    ///
    /// The result is validated like any other matrix.
    pub fn map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        Self::from_rows(self.rows().map(|row| row.into_iter().map(&f).collect()).collect())
    }

    /// Keep only the given blocks, in the given order.
    pub fn select_blocks(&self, indices: &[usize]) -> Result<Self> {
        let rows = indices
            .iter()
            .map(|&i| {
                if i < self.num_blocks() {
                    Ok(self.row(i))
                } else {
                    Err(EstimateError::invalid(
                        "block index",
                        i as f64,
                        "must be below the number of blocks",
                    ))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }
}

/// Minimum observed time of each block, in block order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMinima(pub Vec<f64>);

impl BlockMinima {
    /// Minima as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Positive excess times over the block minima, in no particular order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseSample(pub Vec<f64>);

impl NoiseSample {
    /// Sample values as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of noise values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no cell contributed noise.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TimingMatrix {
        TimingMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_shape_and_access() {
        let m = small();
        assert_eq!(m.num_blocks(), 2);
        assert_eq!(m.num_iters(), 3);
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.row(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_means() {
        let m = small();
        assert_eq!(m.iteration_means(), vec![2.5, 3.5, 4.5]);
        assert_eq!(m.block_means(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            TimingMatrix::from_rows(vec![]),
            Err(EstimateError::EmptyInput { .. })
        ));
        assert!(matches!(
            TimingMatrix::from_rows(vec![vec![]]),
            Err(EstimateError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_rejects_ragged() {
        let err = TimingMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            EstimateError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let err = TimingMatrix::from_rows(vec![vec![1.0, -2.0]]).unwrap_err();
        assert!(matches!(err, EstimateError::NegativeTiming { row: 0, column: 1, .. }));
        let err = TimingMatrix::from_rows(vec![vec![f64::NAN]]).unwrap_err();
        assert!(matches!(err, EstimateError::NegativeTiming { .. }));
    }

    #[test]
    fn test_map_adds_constant() {
        let m = small().map(|x| x + 1.0).unwrap();
        assert_eq!(m.row(1), vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_select_blocks() {
        let m = small().select_blocks(&[1]).unwrap();
        assert_eq!(m.num_blocks(), 1);
        assert_eq!(m.row(0), vec![4.0, 5.0, 6.0]);
        assert!(small().select_blocks(&[2]).is_err());
    }
}
