use {
    crate::{Action, HistoryError, HistoryModel, Result},
    consistency_model::{Model, Operation},
    std::collections::BTreeMap,
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum KvInput {
    Put { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

impl KvInput {
    pub fn key(&self) -> &str {
        match self {
            KvInput::Put { key, .. } | KvInput::Get { key } | KvInput::Delete { key } => key,
        }
    }
}

/// A key-value store. The state maps each key to the output a read of that key must observe.
///
/// Writes and deletes always succeed and their outputs are not checked; only their effect on
/// later reads is. Operations on distinct keys never constrain each other, so histories are
/// partitioned by key.
#[derive(Clone, Copy, Debug, Default)]
pub struct KvModel;

impl KvModel {
    /// The observed output of a read on a key that holds no value.
    pub const ABSENT: &'static str = r#"{"type":"VOption","value":null}"#;

    /// The observed output of a read on a key holding `value`. The value is embedded verbatim.
    pub fn present(value: &str) -> String {
        format!(r#"{{"type":"VOption","value":{value}}}"#)
    }
}

impl Model for KvModel {
    type State = BTreeMap<String, String>;
    type Input = KvInput;
    type Output = Option<String>;

    fn init(&self) -> Self::State {
        BTreeMap::new()
    }

    fn step(
        &self,
        state: &Self::State,
        input: &KvInput,
        output: &Option<String>,
    ) -> (bool, Self::State) {
        match input {
            KvInput::Put { key, value } => {
                let mut next = state.clone();
                next.insert(key.clone(), Self::present(value));
                (true, next)
            }
            KvInput::Get { key } => {
                let expected = state.get(key).map_or(Self::ABSENT, String::as_str);
                (output.as_deref().unwrap_or("") == expected, state.clone())
            }
            KvInput::Delete { key } => {
                let mut next = state.clone();
                next.remove(key);
                (true, next)
            }
        }
    }

    fn equal(&self, lhs: &Self::State, rhs: &Self::State) -> bool {
        lhs == rhs
    }

    fn partition(&self, history: &[Operation<KvInput, Option<String>>]) -> Vec<Vec<usize>> {
        let mut by_key: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, op) in history.iter().enumerate() {
            by_key.entry(op.input.key()).or_default().push(i);
        }
        by_key.into_values().collect()
    }

    fn describe_operation(&self, input: &KvInput, output: &Option<String>) -> String {
        match input {
            KvInput::Put { key, value } => format!("PUT({key:?}, {value:?})"),
            KvInput::Get { key } => match output {
                Some(output) => format!("GET({key:?}) -> {output}"),
                None => format!("GET({key:?}) -> ?"),
            },
            KvInput::Delete { key } => format!("DELETE({key:?})"),
        }
    }

    fn describe_state(&self, state: &Self::State) -> String {
        let entries: Vec<_> = state.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        format!("{{{}}}", entries.join(", "))
    }
}

impl HistoryModel for KvModel {
    const NAME: &'static str = "kv";
    const KEYED: bool = true;

    fn input_from_invocation(action: Action, payloads: [String; 3]) -> KvInput {
        let [_, key, value] = payloads;
        match action {
            Action::Write => KvInput::Put { key, value },
            Action::Read => KvInput::Get { key },
            Action::Delete => KvInput::Delete { key },
        }
    }

    fn input_from_row(
        row: usize,
        op: &str,
        key: Option<String>,
        value: String,
    ) -> Result<KvInput> {
        let key = key.ok_or(HistoryError::MissingKey { row })?;
        match op.to_ascii_uppercase().as_str() {
            "PUT" => Ok(KvInput::Put { key, value }),
            "GET" => Ok(KvInput::Get { key }),
            "DELETE" => Ok(KvInput::Delete { key }),
            _ => Err(HistoryError::UnknownOperation {
                row,
                model: Self::NAME,
                op: op.to_string(),
            }),
        }
    }
}
