//! Reliability checks on a finished analysis.
//!
//! 1. Noise coverage: enough cells must feed the empirical noise model
//! 2. Interval width: a wide interval means the noise dominates the signal
//! 3. Model fit: how far the closest parametric model is from the data
//! 4. Erlang search: whether the shape iteration converged

use super::{Estimate, Fits};
use crate::measurement::OutlierStats;
use crate::result::Diagnostics;

/// Minimum fraction of cells in the noise sample.
pub const MIN_NOISE_FRACTION: f64 = 0.05;

/// Relative half-width above which the interval is flagged.
pub const MAX_RELATIVE_HALF_WIDTH: f64 = 0.05;

/// KS distance above which no candidate model is considered a fit.
pub const MAX_FIT_KS: f64 = 0.1;

/// Compute all diagnostic checks.
pub fn compute_diagnostics(
    outliers: &OutlierStats,
    estimate: &Estimate,
    fits: Option<&Fits>,
) -> Diagnostics {
    let mut warnings = Vec::new();

    // 1. Noise coverage
    let noise_fraction = outliers.noise_fraction();
    let noise_fraction_ok = noise_fraction >= MIN_NOISE_FRACTION;
    if !noise_fraction_ok {
        warnings.push(format!(
            "Only {:.1}% of cells contribute to the noise sample; the noise quantile rests on few values.",
            noise_fraction * 100.0
        ));
    }

    // 2. Interval width
    let relative_half_width = estimate.relative_half_width();
    if relative_half_width > MAX_RELATIVE_HALF_WIDTH {
        warnings.push(format!(
            "Interval half-width is {:.1}% of the estimate. More iterations per block would tighten it.",
            relative_half_width * 100.0
        ));
    }

    // 3 + 4. Parametric fits
    let (best_fit, best_fit_ks, fit_ok) = match fits {
        Some(fits) => {
            let best = fits.best();
            let ok = best.ks_distance <= MAX_FIT_KS;
            if !ok {
                warnings.push(format!(
                    "No parametric model fits the noise (best: {}, KS = {:.3}); the empirical model is the only valid one.",
                    best.model.name(),
                    best.ks_distance
                ));
            }
            if !fits.erlang_search.converged {
                warnings.push(format!(
                    "Erlang shape search stopped after {} steps without converging.",
                    fits.erlang_search.iterations
                ));
            }
            (Some(best.model.name().to_string()), Some(best.ks_distance), ok)
        }
        None => (None, None, true),
    };

    Diagnostics {
        noise_fraction,
        noise_fraction_ok,
        relative_half_width,
        best_fit,
        best_fit_ks,
        fit_ok,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(noise_cells: usize, total_cells: usize) -> OutlierStats {
        OutlierStats {
            block_threshold: 1.0,
            fast_blocks: Vec::new(),
            fast_fraction: 0.0,
            iteration_threshold: 1.0,
            slow_iterations: Vec::new(),
            total_cells,
            extreme_cells: 0,
            noise_cells,
        }
    }

    #[test]
    fn test_clean_result_passes() {
        let est = Estimate {
            center: 50.0,
            half_width: 0.1,
        };
        let diag = compute_diagnostics(&stats(400, 1000), &est, None);
        assert!(diag.all_checks_passed());
        assert!(diag.warnings.is_empty());
        assert!(diag.best_fit.is_none());
    }

    #[test]
    fn test_sparse_noise_and_wide_interval_warn() {
        let est = Estimate {
            center: 10.0,
            half_width: 2.0,
        };
        let diag = compute_diagnostics(&stats(10, 1000), &est, None);
        assert!(!diag.noise_fraction_ok);
        assert!(!diag.all_checks_passed());
        assert_eq!(diag.warnings.len(), 2);
        assert!((diag.relative_half_width - 0.2).abs() < 1e-12);
    }
}
