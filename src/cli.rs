//! Command line interface.
//!
//! `main.rs` only parses arguments and installs logging; everything else runs
//! through [`run`] so it can be tested against an in-memory writer.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::estimator::Estimator;
use crate::input::load_matrix;
use crate::output::{format_comparison, format_summary, to_json_pretty};
use crate::result::Summary;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "timing-estimate")]
#[command(version)]
#[command(
    about = "Estimate true per-block time from noisy repeated benchmark timings",
    long_about = None
)]
pub struct Cli {
    /// Log every pipeline stage to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate the true time of one or more timing matrices
    Summarize {
        /// Timing matrix files (one line per block, one column per iteration)
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: AnalysisOptions,
    },

    /// Compare two timing matrices over the same blocks
    Compare {
        /// Baseline timing matrix
        before: PathBuf,

        /// Timing matrix after the change
        after: PathBuf,

        #[command(flatten)]
        options: AnalysisOptions,
    },
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct AnalysisOptions {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Probability of the noise-of-minimum quantile
    #[arg(long, value_name = "P", default_value_t = 0.95)]
    pub confidence: f64,

    /// Blocks with a minimum below FACTOR x mean are fast outliers
    #[arg(long, value_name = "FACTOR", default_value_t = 0.75)]
    pub outlier_factor: f64,

    /// Drop cells at or above RATIO x block minimum from the noise sample
    #[arg(long = "extreme-noise", value_name = "RATIO")]
    pub extreme_noise: Option<f64>,

    /// Skip the exponential / Erlang / log-normal noise fits
    #[arg(long)]
    pub no_fits: bool,
}

impl AnalysisOptions {
    /// Build the estimator these options describe.
    pub fn estimator(&self) -> Result<Estimator> {
        let mut estimator = Estimator::new()
            .confidence(self.confidence)
            .outlier_factor(self.outlier_factor)
            .fit_distributions(!self.no_fits);
        if let Some(ratio) = self.extreme_noise {
            estimator = estimator.extreme_noise_ratio(ratio);
        }
        estimator.validate().context("invalid analysis options")?;
        Ok(estimator)
    }
}

#[derive(Serialize)]
struct FileSummary<'a> {
    file: &'a Path,
    summary: &'a Summary,
}

/// Execute a parsed command line, writing results to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Summarize { files, options } => summarize(files, options, out),
        Command::Compare {
            before,
            after,
            options,
        } => compare(before, after, options, out),
    }
}

fn summarize<W: Write>(files: &[PathBuf], options: &AnalysisOptions, out: &mut W) -> Result<()> {
    let estimator = options.estimator()?;
    let matrices = files
        .iter()
        .map(|path| load_matrix(path).with_context(|| format!("loading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let mut summaries = Vec::with_capacity(files.len());
    for (path, result) in files.iter().zip(estimator.analyze_all(&matrices)) {
        let summary = result.with_context(|| format!("analyzing {}", path.display()))?;
        summaries.push(summary);
    }

    if options.json {
        let entries: Vec<FileSummary<'_>> = files
            .iter()
            .zip(&summaries)
            .map(|(file, summary)| FileSummary { file, summary })
            .collect();
        writeln!(out, "{}", to_json_pretty(&entries)?)?;
    } else {
        for (path, summary) in files.iter().zip(&summaries) {
            if files.len() > 1 {
                writeln!(out, "{}", path.display())?;
            }
            write!(out, "{}", format_summary(summary))?;
        }
    }
    Ok(())
}

fn compare<W: Write>(
    before: &Path,
    after: &Path,
    options: &AnalysisOptions,
    out: &mut W,
) -> Result<()> {
    let estimator = options.estimator()?;
    let before_matrix =
        load_matrix(before).with_context(|| format!("loading {}", before.display()))?;
    let after_matrix =
        load_matrix(after).with_context(|| format!("loading {}", after.display()))?;

    let comparison = estimator
        .compare(&before_matrix, &after_matrix)
        .with_context(|| format!("comparing {} with {}", before.display(), after.display()))?;

    if options.json {
        writeln!(out, "{}", to_json_pretty(&comparison)?)?;
    } else {
        write!(out, "{}", format_comparison(&comparison))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::try_parse_from([
            "timing-estimate",
            "summarize",
            "a.txt",
            "b.txt",
            "--json",
            "--extreme-noise",
            "1.05",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Summarize { files, options } => {
                assert_eq!(files.len(), 2);
                assert!(options.json);
                assert_eq!(options.extreme_noise, Some(1.05));
                assert_eq!(options.confidence, 0.95);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_compare_requires_two_files() {
        assert!(Cli::try_parse_from(["timing-estimate", "compare", "a.txt"]).is_err());
    }

    #[test]
    fn test_bad_options_rejected() {
        let options = AnalysisOptions {
            json: false,
            confidence: 2.0,
            outlier_factor: 0.75,
            extreme_noise: None,
            no_fits: false,
        };
        assert!(options.estimator().is_err());
    }
}
