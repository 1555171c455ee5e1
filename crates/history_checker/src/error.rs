use {
    std::{io, path::PathBuf},
    thiserror::Error,
};

/// Everything that can go wrong while loading or checking a history. Each of these aborts the
/// current history; log-quality problems that do not are reported as
/// [`Warning`](crate::Warning)s instead.
///
/// A `row` is the 1-based data row, not counting the header.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column {column:?} in header {header:?}")]
    MissingColumn {
        column: &'static str,
        header: Vec<String>,
    },

    #[error("unrecognized log format, header {header:?} is neither interleaved nor paired")]
    UnknownFormat { header: Vec<String> },

    #[error("row {row}: column {column:?} holds {value:?}, expected an integer")]
    InvalidInteger {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: event kind {value:?} is neither Invocation nor Response")]
    InvalidKind { row: usize, value: String },

    #[error("row {row}: unknown {model} operation {op:?}")]
    UnknownOperation {
        row: usize,
        model: &'static str,
        op: String,
    },

    #[error("row {row}: missing key")]
    MissingKey { row: usize },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to write visualization to {}", path.display())]
    Visualize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = HistoryError> = std::result::Result<T, E>;
