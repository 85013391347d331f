//! Analysis result types.

use serde::{Deserialize, Serialize};

use crate::analysis::{Estimate, Fits, PairedComparison};
use crate::measurement::OutlierStats;
use crate::preflight::PreflightResult;

/// Complete result from analyzing one timing matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Rows in the matrix.
    pub num_blocks: usize,

    /// Columns in the matrix.
    pub num_iters: usize,

    /// Mean of all block minima, fast blocks included ("time per sample").
    pub mean_of_minima: f64,

    /// What outlier classification set aside.
    pub outliers: OutlierStats,

    /// Mean of the block minima above the outlier threshold.
    pub filtered_mean: f64,

    /// Mean of the per-block mean times above the block threshold.
    ///
    /// Each block mean is compared with the threshold itself, so a fast
    /// block whose slower iterations lift its mean above it still counts.
    pub filtered_block_mean: f64,

    /// Shape of the noise sample.
    pub noise: NoiseStats,

    /// Quantile of the minimum of `num_iters` noise draws.
    pub noise_quantile: f64,

    /// Probability used for `noise_quantile`.
    pub confidence: f64,

    /// Point estimate and interval for the true per-block time.
    pub estimate: Estimate,

    /// `filtered_mean - noise_quantile`.
    pub one_sided_lower_bound: f64,

    /// Interval under an exponential noise assumption (diagnostic only).
    pub exponential_interval: Option<(f64, f64)>,

    /// Candidate parametric fits to the noise (diagnostic only).
    pub fits: Option<Fits>,

    /// Reliability checks on the result.
    pub diagnostics: Diagnostics,

    /// Input checks run before analysis.
    pub preflight: PreflightResult,
}

impl Summary {
    /// Precision class of the estimate.
    pub fn precision(&self) -> Precision {
        Precision::from_relative_half_width(self.estimate.relative_half_width())
    }
}

/// Summary statistics of the noise sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseStats {
    /// Values in the sample.
    pub count: usize,
    /// Mean excess.
    pub mean: f64,
    /// Median excess.
    pub median: f64,
    /// Largest excess.
    pub max: f64,
    /// Mean excess over every cell of the matrix, zeros included.
    pub mean_all_cells: f64,
}

/// How tight the interval is relative to the estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Precision {
    /// Half-width below 0.5% of the estimate.
    Excellent,
    /// Half-width 0.5-2%.
    Good,
    /// Half-width 2-10%.
    Poor,
    /// Half-width above 10%, or not a number.
    TooNoisy,
}

impl Precision {
    /// Classify a relative half-width.
    pub fn from_relative_half_width(r: f64) -> Self {
        if !r.is_finite() || r < 0.0 {
            return Precision::TooNoisy;
        }
        if r < 0.005 {
            Precision::Excellent
        } else if r < 0.02 {
            Precision::Good
        } else if r < 0.10 {
            Precision::Poor
        } else {
            Precision::TooNoisy
        }
    }
}

/// Reliability checks on a computed summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Fraction of cells that ended up in the noise sample.
    pub noise_fraction: f64,
    /// True if enough cells fed the noise model.
    pub noise_fraction_ok: bool,

    /// Half-width divided by the center.
    pub relative_half_width: f64,

    /// Name of the closest parametric fit, if fits were computed.
    pub best_fit: Option<String>,
    /// KS distance of that fit.
    pub best_fit_ks: Option<f64>,
    /// True if the best fit is within the KS tolerance (or fits were skipped).
    pub fit_ok: bool,

    /// Human-readable warnings (empty if all checks pass).
    pub warnings: Vec<String>,
}

impl Diagnostics {
    /// Check if all diagnostics are OK.
    pub fn all_checks_passed(&self) -> bool {
        self.noise_fraction_ok && self.fit_ok
    }
}

/// Before/after analysis of two datasets over the same blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Summary of the baseline.
    pub before: Summary,
    /// Summary of the changed version.
    pub after: Summary,
    /// Paired tests on the full block minima.
    pub paired: PairedComparison,
    /// Mean delta relative to the baseline's filtered mean.
    pub relative_change: f64,
}

impl Comparison {
    /// Difference of the two point estimates.
    pub fn estimate_shift(&self) -> f64 {
        self.after.estimate.center - self.before.estimate.center
    }
}
