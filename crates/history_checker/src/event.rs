use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Whether an event opens or closes an operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    Invocation,
    Response,
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Invocation" => Ok(EventKind::Invocation),
            "Response" => Ok(EventKind::Response),
            other => Err(other.to_string()),
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EventKind::Invocation => "Invocation",
            EventKind::Response => "Response",
        })
    }
}

/// The category of a logged action, classified from its name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    /// Classifies a raw action name by suffix: `*_read`, `*_write` or `*_delete`. Anything else
    /// is unrecognized and yields `None`.
    ///
    /// ```
    /// use history_checker::Action;
    /// assert_eq!(Action::classify("kv_write"), Some(Action::Write));
    /// assert_eq!(Action::classify("heartbeat"), None);
    /// ```
    pub fn classify(raw: &str) -> Option<Action> {
        if raw.ends_with("_read") {
            Some(Action::Read)
        } else if raw.ends_with("_write") {
            Some(Action::Write)
        } else if raw.ends_with("_delete") {
            Some(Action::Delete)
        } else {
            None
        }
    }
}

/// One row of an interleaved log.
///
/// The meaning of the payloads depends on the action and kind. On an invocation `payloads[1]`
/// is usually a key and `payloads[2]` a value; on a response `payloads[0]` is the observed
/// output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    /// Correlates an invocation with its response.
    pub id: String,
    pub client_id: u64,
    pub kind: EventKind,
    /// `None` if the action name was not recognized.
    pub action: Option<Action>,
    pub payloads: [String; 3],
}
