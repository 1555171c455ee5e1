use {
    crate::{Action, HistoryError, HistoryModel, Result},
    consistency_model::Model,
    std::collections::VecDeque,
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum QueueInput {
    Enq { value: String },
    Deq,
}

/// A FIFO queue of strings, head first.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueModel;

impl QueueModel {
    /// The observed output of a dequeue from an empty queue.
    pub const EMPTY: &'static str = "<empty>";
}

impl Model for QueueModel {
    type State = VecDeque<String>;
    type Input = QueueInput;
    type Output = Option<String>;

    fn init(&self) -> Self::State {
        VecDeque::new()
    }

    fn step(
        &self,
        state: &Self::State,
        input: &QueueInput,
        output: &Option<String>,
    ) -> (bool, Self::State) {
        let output = output.as_deref().unwrap_or("");
        match input {
            QueueInput::Enq { value } => {
                let mut next = state.clone();
                next.push_back(value.clone());
                (true, next)
            }
            QueueInput::Deq => match state.front() {
                None => (output == Self::EMPTY, state.clone()),
                Some(head) if head == output => {
                    let mut next = state.clone();
                    next.pop_front();
                    (true, next)
                }
                Some(_) => (false, state.clone()),
            },
        }
    }

    fn equal(&self, lhs: &Self::State, rhs: &Self::State) -> bool {
        lhs == rhs
    }

    fn describe_operation(&self, input: &QueueInput, output: &Option<String>) -> String {
        match (input, output) {
            (QueueInput::Enq { value }, _) => format!("ENQ({value:?})"),
            (QueueInput::Deq, Some(output)) => format!("DEQ -> {output:?}"),
            (QueueInput::Deq, None) => "DEQ -> ?".to_string(),
        }
    }

    fn describe_state(&self, state: &Self::State) -> String {
        format!("{state:?}")
    }
}

impl HistoryModel for QueueModel {
    const NAME: &'static str = "queue";
    const KEYED: bool = false;

    fn input_from_invocation(action: Action, payloads: [String; 3]) -> QueueInput {
        let [_, value, _] = payloads;
        match action {
            Action::Write => QueueInput::Enq { value },
            Action::Read | Action::Delete => QueueInput::Deq,
        }
    }

    fn input_from_row(
        row: usize,
        op: &str,
        _key: Option<String>,
        value: String,
    ) -> Result<QueueInput> {
        match op.to_ascii_uppercase().as_str() {
            "ENQ" => Ok(QueueInput::Enq { value }),
            "DEQ" => Ok(QueueInput::Deq),
            _ => Err(HistoryError::UnknownOperation {
                row,
                model: Self::NAME,
                op: op.to_string(),
            }),
        }
    }
}
