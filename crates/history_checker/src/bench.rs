//! Checking a directory of histories and summarizing the outcomes.

use {
    crate::{check_file_as, CheckOptions, ModelKind, Result},
    consistency_model::{CheckResult, Checker},
    std::{
        error::Error,
        fmt::{Display, Formatter},
        path::{Path, PathBuf},
        time::Duration,
    },
    tracing::warn,
};

/// The `*.csv` files directly inside `dir`, sorted by path.
pub fn history_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.csv", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => files.push(path),
            Err(err) => warn!(
                path = %err.path().display(),
                error = %err.error(),
                "Skipping unreadable path."
            ),
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The check ran to a verdict or timed out.
    Checked {
        result: CheckResult,
        elapsed: Duration,
    },
    /// The history could not be loaded or checked.
    Failed { error: String },
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Checked { result, elapsed } => {
                let label = match result {
                    CheckResult::Ok => "✓ Linearizable",
                    CheckResult::Illegal => "✗ Not Linearizable",
                    CheckResult::Unknown => "? Inconclusive",
                };
                write!(f, "{label} ({:?})", round_ms(*elapsed))
            }
            Outcome::Failed { error } => write!(f, "FAILED ({error})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Checks one file, recording an error as a failed run rather than returning it.
pub fn run_file<C: Checker>(
    kind: ModelKind,
    checker: &C,
    path: &Path,
    options: &CheckOptions,
) -> FileOutcome {
    let outcome = match check_file_as(kind, checker, path, options) {
        Ok(report) => Outcome::Checked {
            result: report.result,
            elapsed: report.elapsed,
        },
        Err(err) => {
            let mut error = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                error = format!("{error}: {cause}");
                source = cause.source();
            }
            warn!(path = %path.display(), %error, "Run failed.");
            Outcome::Failed { error }
        }
    };
    FileOutcome {
        path: path.to_path_buf(),
        outcome,
    }
}

/// Timing over the runs that reached a verdict.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub runs: usize,
    pub total: Duration,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    /// Sample standard deviation.
    pub std_dev: Duration,
}

impl Timing {
    fn from_samples(samples: &[Duration]) -> Option<Timing> {
        let (&first, rest) = samples.split_first()?;
        let runs = samples.len();
        let total: Duration = samples.iter().sum();
        let mean = Duration::from_nanos((total.as_nanos() / runs as u128) as u64);
        let (min, max) = rest
            .iter()
            .fold((first, first), |(min, max), &t| (min.min(t), max.max(t)));
        let mean_ns = mean.as_nanos() as f64;
        let mut variance: f64 = samples
            .iter()
            .map(|t| (t.as_nanos() as f64 - mean_ns).powi(2))
            .sum();
        if runs > 1 {
            variance /= (runs - 1) as f64;
        }
        Some(Timing {
            runs,
            total,
            mean,
            min,
            max,
            std_dev: Duration::from_nanos(variance.sqrt() as u64),
        })
    }

    /// The standard deviation as a percentage of the mean, if the mean is nonzero.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (!self.mean.is_zero())
            .then(|| self.std_dev.as_nanos() as f64 / self.mean.as_nanos() as f64 * 100.0)
    }
}

/// Aggregate counts across a batch. A run is successful when it reached a verdict, whether
/// linearizable or not. Timeouts count as inconclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BenchmarkStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub linearizable: usize,
    pub non_linearizable: usize,
    /// `None` when no run succeeded.
    pub timing: Option<Timing>,
}

impl BenchmarkStats {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a FileOutcome>) -> Self {
        let mut stats = BenchmarkStats::default();
        let mut samples = Vec::new();
        for FileOutcome { outcome, .. } in outcomes {
            stats.total += 1;
            match outcome {
                Outcome::Checked { result, elapsed } => match result {
                    CheckResult::Ok | CheckResult::Illegal => {
                        stats.successful += 1;
                        samples.push(*elapsed);
                        if *result == CheckResult::Ok {
                            stats.linearizable += 1;
                        } else {
                            stats.non_linearizable += 1;
                        }
                    }
                    CheckResult::Unknown => stats.inconclusive += 1,
                },
                Outcome::Failed { .. } => stats.failed += 1,
            }
        }
        stats.timing = Timing::from_samples(&samples);
        stats
    }
}

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

impl Display for BenchmarkStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "BENCHMARK SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total Runs:         {}", self.total)?;
        writeln!(f, "Successful Runs:    {}", self.successful)?;
        if self.failed > 0 {
            writeln!(f, "Failed Runs:        {}", self.failed)?;
        }
        if self.inconclusive > 0 {
            writeln!(f, "Inconclusive Runs:  {}", self.inconclusive)?;
        }
        match &self.timing {
            None => writeln!(f, "\nNo successful runs to report.")?,
            Some(timing) => {
                writeln!(f, "Linearizable:       {}", self.linearizable)?;
                writeln!(f, "Non-Linearizable:   {}", self.non_linearizable)?;
                writeln!(f, "\n{THIN_RULE}")?;
                writeln!(f, "TIMING STATISTICS")?;
                writeln!(f, "{THIN_RULE}")?;
                writeln!(f, "Total Time:         {:?}", round_ms(timing.total))?;
                writeln!(f, "Mean Time:          {:?}", round_ms(timing.mean))?;
                if timing.runs > 1 {
                    writeln!(f, "Min Time:           {:?}", round_ms(timing.min))?;
                    writeln!(f, "Max Time:           {:?}", round_ms(timing.max))?;
                    writeln!(f, "Std. Deviation:     {:?}", round_ms(timing.std_dev))?;
                    if let Some(cv) = timing.coefficient_of_variation() {
                        writeln!(f, "Coefficient of Variation: {cv:.2}%")?;
                    }
                }
                writeln!(f, "{THIN_RULE}")?;
            }
        }
        write!(f, "{RULE}")
    }
}

fn round_ms(d: Duration) -> Duration {
    Duration::from_millis(((d.as_nanos() + 500_000) / 1_000_000) as u64)
}

#[cfg(test)]
mod test {
    use super::*;

    fn checked(result: CheckResult, ms: u64) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from("h.csv"),
            outcome: Outcome::Checked {
                result,
                elapsed: Duration::from_millis(ms),
            },
        }
    }

    fn failed() -> FileOutcome {
        FileOutcome {
            path: PathBuf::from("bad.csv"),
            outcome: Outcome::Failed {
                error: "malformed CSV".to_string(),
            },
        }
    }

    #[test]
    fn counts_outcomes_by_category() {
        let outcomes = vec![
            checked(CheckResult::Ok, 10),
            checked(CheckResult::Illegal, 20),
            checked(CheckResult::Unknown, 1000),
            failed(),
            checked(CheckResult::Ok, 30),
        ];
        let stats = BenchmarkStats::from_outcomes(&outcomes);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.successful, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.inconclusive, 1);
        assert_eq!(stats.linearizable, 2);
        assert_eq!(stats.non_linearizable, 1);
    }

    #[test]
    fn times_successful_runs_only() {
        let outcomes = vec![
            checked(CheckResult::Ok, 10),
            checked(CheckResult::Unknown, 1000),
            checked(CheckResult::Illegal, 20),
            checked(CheckResult::Ok, 30),
        ];
        let timing = BenchmarkStats::from_outcomes(&outcomes).timing.unwrap();
        assert_eq!(timing.runs, 3);
        assert_eq!(timing.total, Duration::from_millis(60));
        assert_eq!(timing.mean, Duration::from_millis(20));
        assert_eq!(timing.min, Duration::from_millis(10));
        assert_eq!(timing.max, Duration::from_millis(30));
        // Sample variance: (100 + 0 + 100) / 2 = 100 ms^2.
        assert_eq!(timing.std_dev, Duration::from_millis(10));
        let cv = timing.coefficient_of_variation().unwrap();
        assert!((cv - 50.0).abs() < 1e-9);
    }

    #[test]
    fn single_run_has_zero_deviation() {
        let timing = BenchmarkStats::from_outcomes(&[checked(CheckResult::Ok, 7)])
            .timing
            .unwrap();
        assert_eq!(timing.std_dev, Duration::ZERO);
        assert_eq!(timing.min, timing.max);
    }

    #[test]
    fn summary_omits_spread_for_a_single_run() {
        let summary = BenchmarkStats::from_outcomes(&[checked(CheckResult::Ok, 7)]).to_string();
        assert!(summary.contains("Mean Time:          7ms"));
        assert!(!summary.contains("Min Time"));
        assert!(!summary.contains("Coefficient of Variation"));
        assert!(!summary.contains("Failed Runs"));
    }

    #[test]
    fn summary_without_successes() {
        let summary = BenchmarkStats::from_outcomes(&[failed()]).to_string();
        assert!(summary.contains("Failed Runs:        1"));
        assert!(summary.contains("No successful runs to report."));
        assert!(!summary.contains("TIMING STATISTICS"));
    }

    #[test]
    fn summary_with_spread() {
        let outcomes = [checked(CheckResult::Ok, 10), checked(CheckResult::Illegal, 30)];
        let summary = BenchmarkStats::from_outcomes(&outcomes).to_string();
        assert!(summary.contains("Min Time:           10ms"));
        assert!(summary.contains("Max Time:           30ms"));
        assert!(summary.contains("Coefficient of Variation:"));
    }

    #[test]
    fn outcomes_render_as_progress_lines() {
        assert_eq!(
            checked(CheckResult::Ok, 12).outcome.to_string(),
            "✓ Linearizable (12ms)"
        );
        assert_eq!(
            checked(CheckResult::Illegal, 3).outcome.to_string(),
            "✗ Not Linearizable (3ms)"
        );
        assert_eq!(failed().outcome.to_string(), "FAILED (malformed CSV)");
    }

    #[test]
    fn rounds_to_milliseconds() {
        assert_eq!(round_ms(Duration::from_micros(1499)), Duration::from_millis(1));
        assert_eq!(round_ms(Duration::from_micros(1500)), Duration::from_millis(2));
    }
}
