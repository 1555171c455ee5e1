use {
    crate::{
        read_log, reconstruct, HistoryError, HistoryModel, KvModel, LogFormat, ModelKind,
        QueueModel, RawLog, Reconstruction, Result, Warning,
    },
    consistency_model::{CheckResult, Checker},
    std::{
        fs::File,
        path::{Path, PathBuf},
        time::{Duration, Instant},
    },
    tracing::info,
};

#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    pub format: LogFormat,
    /// `None` lets the search run until it reaches a verdict.
    pub timeout: Option<Duration>,
    /// Where to write the HTML visualization, if anywhere.
    pub visualization: Option<PathBuf>,
}

/// The outcome of checking one history file.
#[derive(Clone, Debug)]
pub struct Report {
    pub result: CheckResult,
    pub operations: usize,
    pub warnings: Vec<Warning>,
    pub discarded: usize,
    /// Time spent loading and checking, excluding the visualization.
    pub elapsed: Duration,
}

/// Loads the operations of a history file. Interleaved logs are reconstructed, paired logs are
/// used as is.
pub fn load_history<M: HistoryModel>(
    path: &Path,
    format: LogFormat,
) -> Result<Reconstruction<M::Input>> {
    let file = File::open(path).map_err(|source| HistoryError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match read_log::<M, _>(file, format)? {
        RawLog::Paired(operations) => Reconstruction {
            operations,
            ..Reconstruction::default()
        },
        RawLog::Interleaved(events) => {
            info!(path = %path.display(), events = events.len(), "Read event log.");
            reconstruct::<M>(events)
        }
    })
}

/// Loads the history at `path` and checks it against `model`, writing a visualization if
/// `options` asks for one.
pub fn check_file<M: HistoryModel, C: Checker>(
    model: &M,
    checker: &C,
    path: impl AsRef<Path>,
    options: &CheckOptions,
) -> Result<Report> {
    let path = path.as_ref();
    let start = Instant::now();
    let history = load_history::<M>(path, options.format)?;
    info!(
        path = %path.display(),
        model = M::NAME,
        operations = history.operations.len(),
        warnings = history.warnings.len(),
        discarded = history.discarded,
        "Loaded history."
    );
    let (result, linearization) = checker.check(model, &history.operations, options.timeout);
    let elapsed = start.elapsed();

    if let Some(output) = &options.visualization {
        consistency_model::visualize_path(model, &history.operations, &linearization, output)
            .map_err(|source| HistoryError::Visualize {
                path: output.clone(),
                source,
            })?;
        info!(path = %output.display(), "Wrote visualization.");
    }

    Ok(Report {
        result,
        operations: history.operations.len(),
        warnings: history.warnings,
        discarded: history.discarded,
        elapsed,
    })
}

/// [`check_file`] with the model chosen at runtime.
pub fn check_file_as<C: Checker>(
    kind: ModelKind,
    checker: &C,
    path: impl AsRef<Path>,
    options: &CheckOptions,
) -> Result<Report> {
    match kind {
        ModelKind::Kv => check_file(&KvModel, checker, path, options),
        ModelKind::Queue => check_file(&QueueModel, checker, path, options),
    }
}
