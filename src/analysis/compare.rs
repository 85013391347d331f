//! Paired before/after comparison over matched blocks.
//!
//! Block `i` of both datasets must be the same workload. Per-block deltas
//! `after - before` are tested two ways:
//!
//! - **t-test**: one-sample Student t against zero mean, two-sided.
//! - **Sign test**: exact binomial test on the count of negative deltas
//!   against probability 0.5, robust to the heavy-tailed noise.
//!
//! Both p-values are reported; picking a significance level is up to the
//! caller.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, ContinuousCDF, DiscreteCDF, StudentsT};

use crate::error::{EstimateError, Result};
use crate::statistics::{mean, sample_std};
use crate::types::BlockMinima;

/// Outcome of a paired comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedComparison {
    /// `after[i] - before[i]` for each block.
    pub deltas: Vec<f64>,
    /// Mean delta.
    pub mean: f64,
    /// Sample standard deviation of the deltas.
    pub std: f64,
    /// t statistic of the mean delta.
    pub t_statistic: f64,
    /// Degrees of freedom of the t-test.
    pub degrees_of_freedom: f64,
    /// Two-sided t-test p-value for zero mean delta.
    pub p_value_ttest: f64,
    /// Number of strictly negative deltas (blocks that got faster).
    pub num_negative: usize,
    /// `num_negative / deltas.len()`.
    pub negative_fraction: f64,
    /// Two-sided exact sign-test p-value.
    ///
    /// Zero deltas count as non-negative, so ties from a quantized timer
    /// push this toward significance even when nothing changed.
    pub p_value_sign: f64,
}

/// Compare two aligned sets of block minima.
pub fn compare(before: &BlockMinima, after: &BlockMinima) -> Result<PairedComparison> {
    if before.len() != after.len() {
        return Err(EstimateError::MisalignedInput {
            before: before.len(),
            after: after.len(),
        });
    }
    if before.len() < 2 {
        return Err(EstimateError::EmptyInput {
            what: "paired comparison needs at least two blocks",
        });
    }

    let deltas: Vec<f64> = before
        .as_slice()
        .iter()
        .zip(after.as_slice())
        .map(|(b, a)| a - b)
        .collect();

    let (t_statistic, degrees_of_freedom, p_value_ttest) = one_sample_t_test(&deltas)?;
    let num_negative = deltas.iter().filter(|&&d| d < 0.0).count();
    let p_value_sign = sign_test(num_negative, deltas.len())?;

    Ok(PairedComparison {
        mean: mean(&deltas),
        std: sample_std(&deltas),
        t_statistic,
        degrees_of_freedom,
        p_value_ttest,
        num_negative,
        negative_fraction: num_negative as f64 / deltas.len() as f64,
        p_value_sign,
        deltas,
    })
}

/// One-sample t-test of `data` against mean zero.
///
/// Returns `(t, df, p)`. Zero spread gives `p = 1` for a zero mean and
/// `p = 0` otherwise. Needs at least two values.
pub fn one_sample_t_test(data: &[f64]) -> Result<(f64, f64, f64)> {
    if data.len() < 2 {
        return Err(EstimateError::EmptyInput {
            what: "t-test needs at least two values",
        });
    }
    let n = data.len() as f64;
    let df = n - 1.0;
    let m = mean(data);
    let sd = sample_std(data);

    if sd == 0.0 {
        return Ok(if m == 0.0 {
            (0.0, df, 1.0)
        } else {
            (m.signum() * f64::INFINITY, df, 0.0)
        });
    }

    let t = m / (sd / n.sqrt());
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|_| EstimateError::invalid("degrees of freedom", df, "must be positive"))?;
    let p = (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0);
    Ok((t, df, p))
}

/// Two-sided exact binomial test of `successes` out of `trials` at p = 0.5.
///
/// Callers count ties (zero deltas) as failures, so on coarse timers where
/// many blocks measure identically before and after, the p-value can be
/// small even for unchanged code. Check `num_negative` against the number
/// of non-zero deltas in that case.
pub fn sign_test(successes: usize, trials: usize) -> Result<f64> {
    if successes > trials {
        return Err(EstimateError::invalid(
            "successes",
            successes as f64,
            "must not exceed the number of trials",
        ));
    }
    if trials == 0 {
        return Ok(1.0);
    }
    let k = successes.min(trials - successes) as u64;
    let dist = Binomial::new(0.5, trials as u64)
        .map_err(|_| EstimateError::invalid("trials", trials as f64, "must be positive"))?;
    Ok((2.0 * dist.cdf(k)).min(1.0))
}
