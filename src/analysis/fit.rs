//! Parametric fits to the noise sample, for validation only.
//!
//! The estimate never depends on these. They show how far the observed noise
//! is from the textbook shapes:
//!
//! - **Exponential**: rate = 1 / mean.
//! - **Log-normal**: mean and standard deviation of `ln x`.
//! - **Erlang**: Gamma maximum-likelihood shape, rounded to an integer.
//!
//! Each fit carries its Kolmogorov-Smirnov distance to the empirical CDF.
//! [`exponential_interval`] is the older exponential-noise confidence
//! interval, kept for comparison with the empirical one.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Gamma, LogNormal, Normal};
use statrs::function::gamma::digamma;

use crate::error::{EstimateError, Result};
use crate::statistics::{mean, EmpiricalCdf};

/// Upper bound on the Erlang shape.
pub const MAX_ERLANG_SHAPE: u32 = 10_000;

/// A candidate noise distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseModel {
    /// Exponential with the given rate.
    Exponential {
        /// Rate parameter (1 / mean).
        rate: f64,
    },
    /// Erlang (Gamma with integer shape).
    Erlang {
        /// Integer shape `k >= 1`.
        shape: u32,
        /// Rate parameter (`k / mean`).
        rate: f64,
    },
    /// Log-normal.
    LogNormal {
        /// Mean of `ln x`.
        mu: f64,
        /// Standard deviation of `ln x`.
        sigma: f64,
    },
}

impl NoiseModel {
    /// Cumulative distribution function.
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        match *self {
            NoiseModel::Exponential { rate } => 1.0 - (-rate * x).exp(),
            NoiseModel::Erlang { shape, rate } => {
                Gamma::new(shape as f64, rate).map_or(f64::NAN, |d| d.cdf(x))
            }
            NoiseModel::LogNormal { mu, sigma } => {
                if sigma == 0.0 {
                    if x.ln() >= mu {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    LogNormal::new(mu, sigma).map_or(f64::NAN, |d| d.cdf(x))
                }
            }
        }
    }

    /// Mean of the distribution.
    pub fn mean(&self) -> f64 {
        match *self {
            NoiseModel::Exponential { rate } => 1.0 / rate,
            NoiseModel::Erlang { shape, rate } => shape as f64 / rate,
            NoiseModel::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseModel::Exponential { .. } => "exponential",
            NoiseModel::Erlang { .. } => "erlang",
            NoiseModel::LogNormal { .. } => "log-normal",
        }
    }
}

/// A fitted model and its distance to the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Fitted model.
    pub model: NoiseModel,
    /// Kolmogorov-Smirnov distance to the empirical CDF.
    pub ks_distance: f64,
}

/// Trace of the Erlang shape search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSearch {
    /// Continuous Gamma shape before rounding.
    pub continuous_shape: f64,
    /// Newton steps taken.
    pub iterations: usize,
    /// Whether the step size fell below tolerance within the cap.
    pub converged: bool,
}

/// All candidate fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fits {
    /// Exponential fit.
    pub exponential: FitReport,
    /// Erlang fit.
    pub erlang: FitReport,
    /// How the Erlang shape was found.
    pub erlang_search: ShapeSearch,
    /// Log-normal fit.
    pub log_normal: FitReport,
}

impl Fits {
    /// The fit with the smallest KS distance.
    pub fn best(&self) -> &FitReport {
        [&self.exponential, &self.erlang, &self.log_normal]
            .into_iter()
            .min_by(|a, b| a.ks_distance.total_cmp(&b.ks_distance))
            .unwrap_or(&self.exponential)
    }
}

fn check_sample(sample: &[f64]) -> Result<()> {
    if sample.is_empty() {
        return Err(EstimateError::EmptySample);
    }
    if let Some(&bad) = sample.iter().find(|&&x| !(x.is_finite() && x > 0.0)) {
        return Err(EstimateError::invalid(
            "noise value",
            bad,
            "must be finite and positive",
        ));
    }
    Ok(())
}

/// Exponential fit by maximum likelihood.
pub fn fit_exponential(sample: &[f64]) -> Result<NoiseModel> {
    check_sample(sample)?;
    Ok(NoiseModel::Exponential {
        rate: 1.0 / mean(sample),
    })
}

/// Log-normal fit by maximum likelihood (population standard deviation).
pub fn fit_log_normal(sample: &[f64]) -> Result<NoiseModel> {
    check_sample(sample)?;
    let logs: Vec<f64> = sample.iter().map(|x| x.ln()).collect();
    let mu = mean(&logs);
    let var = logs.iter().map(|l| (l - mu).powi(2)).sum::<f64>() / logs.len() as f64;
    Ok(NoiseModel::LogNormal {
        mu,
        sigma: var.sqrt(),
    })
}

/// Erlang fit: Gamma MLE shape rounded to an integer.
///
/// Solves `ln k - digamma(k) = ln(mean) - mean(ln x)` by Newton's method,
/// starting from the closed-form approximation of Minka. Stops after
/// `max_iterations` steps or when a step is below `tolerance x k`.
pub fn fit_erlang(
    sample: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> Result<(NoiseModel, ShapeSearch)> {
    check_sample(sample)?;
    let m = mean(sample);
    let mean_ln = sample.iter().map(|x| x.ln()).sum::<f64>() / sample.len() as f64;
    let s = m.ln() - mean_ln;

    // Point mass: the likelihood keeps growing with k
    if s.is_nan() || s <= 1e-12 {
        let shape = MAX_ERLANG_SHAPE;
        return Ok((
            NoiseModel::Erlang {
                shape,
                rate: shape as f64 / m,
            },
            ShapeSearch {
                continuous_shape: f64::INFINITY,
                iterations: 0,
                converged: false,
            },
        ));
    }

    let mut k = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let f = k.ln() - digamma(k) - s;
        let df = 1.0 / k - trigamma(k);
        let mut next = k - f / df;
        if !(next.is_finite() && next > 0.0) {
            next = k / 2.0;
        }
        let step = (next - k).abs();
        k = next;
        if step <= tolerance * k {
            converged = true;
            break;
        }
    }

    let shape = (k.round().max(1.0) as u32).min(MAX_ERLANG_SHAPE);
    Ok((
        NoiseModel::Erlang {
            shape,
            rate: shape as f64 / m,
        },
        ShapeSearch {
            continuous_shape: k,
            iterations,
            converged,
        },
    ))
}

/// Derivative of the digamma function, by recurrence up to 6 and the
/// asymptotic series beyond.
fn trigamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result += 1.0 / (x * x);
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    result
        + 1.0 / x
        + f / 2.0
        + (f / x) * (1.0 / 6.0 - f * (1.0 / 30.0 - f * (1.0 / 42.0 - f / 30.0)))
}

/// Fit every candidate model and measure its KS distance.
pub fn fit_all(sample: &[f64], max_iterations: usize, tolerance: f64) -> Result<Fits> {
    let ecdf = EmpiricalCdf::new(sample)?;
    let report = |model: NoiseModel| FitReport {
        ks_distance: ecdf.ks_distance(|x| model.cdf(x)),
        model,
    };

    let (erlang, erlang_search) = fit_erlang(sample, max_iterations, tolerance)?;
    Ok(Fits {
        exponential: report(fit_exponential(sample)?),
        erlang: report(erlang),
        erlang_search,
        log_normal: report(fit_log_normal(sample)?),
    })
}

/// Confidence interval for the true mean assuming exponential noise.
///
/// With `sqrt_n = sqrt(num_iters)` and `z` the two-sided normal quantile of
/// `confidence`, the mean noise is bounded by `mean_noise / (1 +- z / sqrt_n)`
/// and subtracted from `block_mean`. Returns `(lower, upper)`, or `None` when
/// the noise is zero or too few iterations make the bound unbounded.
pub fn exponential_interval(
    block_mean: f64,
    mean_noise: f64,
    num_iters: usize,
    confidence: f64,
) -> Option<(f64, f64)> {
    if mean_noise.is_nan() || mean_noise <= 0.0 || num_iters == 0 {
        return None;
    }
    let z = Normal::new(0.0, 1.0).ok()?.inverse_cdf(0.5 + confidence / 2.0);
    let spread = z / (num_iters as f64).sqrt();
    if 1.0 - spread <= 0.0 {
        return None;
    }
    let a = block_mean - mean_noise / (1.0 - spread);
    let b = block_mean - mean_noise / (1.0 + spread);
    Some((a.min(b), a.max(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Exp, Gamma};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn exp_sample(mean: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let exp = Exp::new(1.0 / mean).unwrap();
        (0..n).map(|_| exp.sample(&mut rng)).collect()
    }

    #[test]
    fn test_exponential_recovers_rate() {
        let sample = exp_sample(0.5, 20_000, 1);
        let fits = fit_all(&sample, 100, 1e-9).unwrap();
        match fits.exponential.model {
            NoiseModel::Exponential { rate } => assert!((rate - 2.0).abs() < 0.1, "{}", rate),
            other => panic!("unexpected model {:?}", other),
        }
        assert!(fits.exponential.ks_distance < 0.02);
    }

    #[test]
    fn test_erlang_recovers_shape() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let gamma = Gamma::new(3.0, 1.0 / 4.0).unwrap();
        let sample: Vec<f64> = (0..20_000).map(|_| gamma.sample(&mut rng)).collect();

        let (model, search) = fit_erlang(&sample, 100, 1e-9).unwrap();
        assert!(search.converged);
        assert!((search.continuous_shape - 3.0).abs() < 0.2);
        match model {
            NoiseModel::Erlang { shape, rate } => {
                assert_eq!(shape, 3);
                assert!((rate - 4.0).abs() < 0.3, "{}", rate);
            }
            other => panic!("unexpected model {:?}", other),
        }
    }

    #[test]
    fn test_erlang_respects_iteration_cap() {
        let sample = exp_sample(1.0, 1000, 3);
        let (_, search) = fit_erlang(&sample, 1, 1e-300).unwrap();
        assert_eq!(search.iterations, 1);
        assert!(!search.converged);
    }

    #[test]
    fn test_erlang_point_mass() {
        let (model, search) = fit_erlang(&[2.0, 2.0, 2.0], 100, 1e-9).unwrap();
        assert!(!search.converged);
        assert_eq!(
            model,
            NoiseModel::Erlang {
                shape: MAX_ERLANG_SHAPE,
                rate: MAX_ERLANG_SHAPE as f64 / 2.0
            }
        );
    }

    #[test]
    fn test_log_normal_parameters() {
        let e = std::f64::consts::E;
        let model = fit_log_normal(&[1.0, e, e * e]).unwrap();
        match model {
            NoiseModel::LogNormal { mu, sigma } => {
                assert!((mu - 1.0).abs() < 1e-12);
                assert!((sigma - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
            }
            other => panic!("unexpected model {:?}", other),
        }
    }

    #[test]
    fn test_exponential_fits_better_than_log_normal_on_exponential_data() {
        let sample = exp_sample(0.5, 5000, 4);
        let fits = fit_all(&sample, 100, 1e-9).unwrap();
        assert!(fits.exponential.ks_distance < fits.log_normal.ks_distance);
        assert_ne!(fits.best().model.name(), "log-normal");
    }

    #[test]
    fn test_fit_rejects_bad_samples() {
        assert!(matches!(fit_exponential(&[]), Err(EstimateError::EmptySample)));
        assert!(matches!(
            fit_log_normal(&[1.0, 0.0]),
            Err(EstimateError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_exponential_interval() {
        // z ~= 1.96, sqrt(16) = 4 -> bounds 1 / 1.49 and 1 / 0.51
        let (lo, hi) = exponential_interval(10.0, 1.0, 16, 0.95).unwrap();
        assert!((hi - (10.0 - 1.0 / 1.49)).abs() < 1e-3, "{}", hi);
        assert!((lo - (10.0 - 1.0 / 0.51)).abs() < 5e-3, "{}", lo);
        assert!(lo < hi);
    }

    #[test]
    fn test_trigamma_known_values() {
        let pi2 = std::f64::consts::PI.powi(2);
        assert!((trigamma(1.0) - pi2 / 6.0).abs() < 1e-9);
        assert!((trigamma(0.5) - pi2 / 2.0).abs() < 1e-9);
        // Recurrence: trigamma(x + 1) = trigamma(x) - 1 / x^2
        assert!((trigamma(3.5) - (trigamma(2.5) - 1.0 / 6.25)).abs() < 1e-12);
    }

    #[test]
    fn test_model_cdfs() {
        let exp = NoiseModel::Exponential { rate: 2.0 };
        let erlang = NoiseModel::Erlang { shape: 1, rate: 2.0 };
        for x in [0.1, 0.5, 1.0, 3.0] {
            // Erlang with shape 1 is exponential
            assert!((exp.cdf(x) - erlang.cdf(x)).abs() < 1e-10);
        }
        let ln = NoiseModel::LogNormal { mu: 0.0, sigma: 1.0 };
        assert!((ln.cdf(1.0) - 0.5).abs() < 1e-12);
        assert_eq!(ln.cdf(0.0), 0.0);
        assert_eq!(exp.cdf(-1.0), 0.0);
    }

    #[test]
    fn test_exponential_interval_unbounded() {
        assert!(exponential_interval(10.0, 1.0, 2, 0.95).is_none());
        assert!(exponential_interval(10.0, 0.0, 100, 0.95).is_none());
    }
}
