use {
    crate::{Action, Result},
    consistency_model::Model,
    std::{
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

/// A reference [`Model`] that also knows how to decode log rows into its typed input.
///
/// Outputs are the observed return values, `None` when a paired log left the output column
/// empty. Models compare an absent output as the empty string.
pub trait HistoryModel: Model<Output = Option<String>> + Default {
    /// The name selecting this model on the command line.
    const NAME: &'static str;

    /// Whether paired logs for this model carry a `key` column.
    const KEYED: bool;

    /// Maps a recognized invocation to an input, given its action and the invocation's payloads.
    fn input_from_invocation(action: Action, payloads: [String; 3]) -> Self::Input;

    /// Parses the operation of one paired-log row. `op` is matched case-insensitively and `row`
    /// is only used to report errors.
    fn input_from_row(
        row: usize,
        op: &str,
        key: Option<String>,
        value: String,
    ) -> Result<Self::Input>;
}

/// Selects one of the supported reference models.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ModelKind {
    Kv,
    Queue,
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kv" => Ok(ModelKind::Kv),
            "queue" => Ok(ModelKind::Queue),
            _ => Err(format!("unknown model {s:?} (use kv|queue)")),
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ModelKind::Kv => crate::KvModel::NAME,
            ModelKind::Queue => crate::QueueModel::NAME,
        })
    }
}
