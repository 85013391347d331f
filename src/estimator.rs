//! Main `Estimator` entry point and builder.

use crate::analysis::{
    build_interval, compare, compute_diagnostics, exponential_interval, fit_all,
};
use crate::config::Config;
use crate::error::{EstimateError, Result};
use crate::measurement::{
    classify_blocks, classify_iterations, extract_minima, mean_excess, sample_noise_filtered,
    slow_iterations, split_blocks, OutlierStats,
};
use crate::preflight::run_all_checks;
use crate::result::{Comparison, NoiseStats, Summary};
use crate::statistics::{max_of, mean, median, EmpiricalCdf};
use crate::types::{BlockMinima, TimingMatrix};

/// Main entry point for timing estimation.
///
/// Use the builder pattern to configure and run the pipeline.
///
/// # Example
///
/// ```ignore
/// use timing_estimate::{Estimator, input::load_matrix};
///
/// let matrix = load_matrix("bench.txt")?;
/// let summary = Estimator::new()
///     .confidence(0.99)
///     .extreme_noise_ratio(1.05)
///     .analyze(&matrix)?;
/// println!("{:.2} ns per block", summary.estimate.center);
/// ```
#[derive(Debug, Clone)]
pub struct Estimator {
    config: Config,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Create with fast configuration for repeated runs.
    ///
    /// Settings:
    /// - No parametric fits (the Erlang search dominates on large samples)
    /// - 40 bisection steps (vs 60 default)
    pub fn quick() -> Self {
        Self {
            config: Config {
                fit_distributions: false,
                bisection_iterations: 40,
                ..Config::default()
            },
        }
    }

    /// Create with the extreme-noise cutoff older summaries were produced with.
    ///
    /// Settings:
    /// - Cells 5% or more above their block minimum are dropped as extreme noise
    pub fn legacy() -> Self {
        Self {
            config: Config {
                extreme_noise_ratio: Some(1.05),
                ..Config::default()
            },
        }
    }

    /// Set the fast-block threshold multiplier.
    pub fn outlier_factor(mut self, factor: f64) -> Self {
        self.config.outlier_factor = factor;
        self
    }

    /// Set the quantile of block minima that must exceed the threshold.
    pub fn outlier_quantile(mut self, p: f64) -> Self {
        self.config.outlier_quantile = p;
        self
    }

    /// Set the probability of the noise-of-minimum quantile.
    pub fn confidence(mut self, p: f64) -> Self {
        self.config.confidence = p;
        self
    }

    /// Set bisection steps for the quantile of the minimum.
    pub fn bisection_iterations(mut self, n: usize) -> Self {
        self.config.bisection_iterations = n;
        self
    }

    /// Drop cells at or above `ratio x block minimum` from the noise sample.
    pub fn extreme_noise_ratio(mut self, ratio: f64) -> Self {
        self.config.extreme_noise_ratio = Some(ratio);
        self
    }

    /// Set the block count below which preflight warns.
    pub fn min_blocks(mut self, n: usize) -> Self {
        self.config.min_blocks = n;
        self
    }

    /// Enable or disable the parametric noise fits.
    pub fn fit_distributions(mut self, enabled: bool) -> Self {
        self.config.fit_distributions = enabled;
        self
    }

    /// Set the iteration cap of the Erlang shape search.
    pub fn erlang_max_iterations(mut self, n: usize) -> Self {
        self.config.erlang_max_iterations = n;
        self
    }

    /// Set the convergence tolerance of the Erlang shape search.
    pub fn erlang_tolerance(mut self, tol: f64) -> Self {
        self.config.erlang_tolerance = tol;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Run the full pipeline on one matrix.
    ///
    /// 1. Preflight checks (logged, never fatal)
    /// 2. Block minima and the fast-block threshold
    /// 3. Iteration threshold and the noise sample
    /// 4. Quantile of the minimum of `num_iters` noise draws
    /// 5. Interval, diagnostics and optional fits
    pub fn analyze(&self, matrix: &TimingMatrix) -> Result<Summary> {
        self.run(matrix).map(|(summary, _)| summary)
    }

    /// Analyze independent matrices, in parallel with the `parallel` feature.
    ///
    /// Results are in input order; one failure does not affect the others.
    pub fn analyze_all(&self, matrices: &[TimingMatrix]) -> Vec<Result<Summary>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            crate::thread_pool::install(|| matrices.par_iter().map(|m| self.analyze(m)).collect())
        }
        #[cfg(not(feature = "parallel"))]
        {
            matrices.iter().map(|m| self.analyze(m)).collect()
        }
    }

    /// Analyze a before/after pair over the same blocks and test the change.
    ///
    /// The paired tests use every block minimum, fast blocks included, since
    /// a block is compared only with itself.
    pub fn compare(&self, before: &TimingMatrix, after: &TimingMatrix) -> Result<Comparison> {
        if before.num_blocks() != after.num_blocks() {
            return Err(EstimateError::MisalignedInput {
                before: before.num_blocks(),
                after: after.num_blocks(),
            });
        }

        let (before_summary, before_minima) = self.run(before)?;
        let (after_summary, after_minima) = self.run(after)?;
        let paired = compare(&before_minima, &after_minima)?;
        let relative_change = paired.mean / before_summary.filtered_mean;

        tracing::debug!(
            mean_delta = paired.mean,
            p_ttest = paired.p_value_ttest,
            p_sign = paired.p_value_sign,
            "paired comparison"
        );

        Ok(Comparison {
            before: before_summary,
            after: after_summary,
            paired,
            relative_change,
        })
    }

    fn run(&self, matrix: &TimingMatrix) -> Result<(Summary, BlockMinima)> {
        self.validate()?;
        let config = &self.config;

        let preflight = run_all_checks(matrix, config);

        // Signal: block minima and fast blocks
        let minima = extract_minima(matrix)?;
        let mean_of_minima = mean(minima.as_slice());
        let block_threshold =
            classify_blocks(&minima, config.outlier_factor, config.outlier_quantile)?;
        let (filtered, fast_blocks) = split_blocks(&minima, block_threshold);
        tracing::debug!(
            blocks = matrix.num_blocks(),
            threshold = block_threshold,
            fast = fast_blocks.len(),
            "classified blocks"
        );

        // Noise: excesses in non-slow iterations
        let iter_means = matrix.iteration_means();
        let iteration_threshold = classify_iterations(&iter_means)?;
        let slow = slow_iterations(&iter_means, iteration_threshold);
        let (noise, counts) = sample_noise_filtered(
            matrix,
            &minima,
            iteration_threshold,
            config.extreme_noise_ratio,
        )?;
        tracing::debug!(
            threshold = iteration_threshold,
            slow_iterations = slow.len(),
            retained = counts.retained,
            extreme = counts.extreme,
            "sampled noise"
        );

        let ecdf = EmpiricalCdf::new(noise.as_slice())?;
        let noise_quantile = ecdf.quantile_of_min(
            config.confidence,
            matrix.num_iters(),
            config.bisection_iterations,
        )?;
        let estimate = build_interval(&filtered, noise_quantile)?;
        tracing::debug!(
            quantile = noise_quantile,
            center = estimate.center,
            half_width = estimate.half_width,
            "built interval"
        );

        let filtered_mean = mean(&filtered);
        let ok_block_means: Vec<f64> = matrix
            .block_means()
            .into_iter()
            .filter(|&b| b > block_threshold)
            .collect();
        let filtered_block_mean = mean(&ok_block_means);

        let mean_all_cells = mean_excess(matrix, &minima);
        let noise_stats = NoiseStats {
            count: noise.len(),
            mean: mean(noise.as_slice()),
            median: median(noise.as_slice()),
            max: max_of(noise.as_slice()),
            mean_all_cells,
        };

        let fits = if config.fit_distributions {
            Some(fit_all(
                noise.as_slice(),
                config.erlang_max_iterations,
                config.erlang_tolerance,
            )?)
        } else {
            None
        };

        let outliers = OutlierStats {
            block_threshold,
            fast_fraction: fast_blocks.len() as f64 / minima.len() as f64,
            fast_blocks,
            iteration_threshold,
            slow_iterations: slow,
            total_cells: counts.total,
            extreme_cells: counts.extreme,
            noise_cells: counts.retained,
        };

        let diagnostics = compute_diagnostics(&outliers, &estimate, fits.as_ref());
        for warning in &diagnostics.warnings {
            tracing::warn!("{}", warning);
        }

        let summary = Summary {
            num_blocks: matrix.num_blocks(),
            num_iters: matrix.num_iters(),
            mean_of_minima,
            outliers,
            filtered_mean,
            filtered_block_mean,
            noise: noise_stats,
            noise_quantile,
            confidence: config.confidence,
            one_sided_lower_bound: estimate.one_sided_lower_bound(),
            estimate,
            exponential_interval: exponential_interval(
                filtered_block_mean,
                mean_all_cells,
                matrix.num_iters(),
                config.confidence,
            ),
            fits,
            diagnostics,
            preflight,
        };
        Ok((summary, minima))
    }
}
