use {
    crate::{Event, EventKind, HistoryModel},
    consistency_model::Operation,
    std::{
        collections::HashMap,
        fmt::{Display, Formatter},
    },
    tracing::{debug, warn},
};

/// A log-quality problem that did not stop reconstruction. Positions are the 1-based event
/// positions, which double as the synthetic timestamps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Warning {
    /// A second invocation arrived for an id that was still pending. The earlier one is lost.
    DuplicateInvocation {
        id: String,
        overwritten: i64,
        position: i64,
    },
    /// A response arrived for an id with no pending invocation. The response is skipped.
    OrphanResponse { id: String, position: i64 },
    /// An invocation never received a response before the log ended.
    UnmatchedInvocation { id: String, position: i64 },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DuplicateInvocation {
                id,
                overwritten,
                position,
            } => write!(
                f,
                "duplicate invocation for {id:?} at event {position}, \
                 overwriting the one at event {overwritten}"
            ),
            Warning::OrphanResponse { id, position } => {
                write!(f, "response for {id:?} at event {position} has no matching invocation")
            }
            Warning::UnmatchedInvocation { id, position } => {
                write!(f, "invocation for {id:?} at event {position} never received a response")
            }
        }
    }
}

/// The operations rebuilt from an event log.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconstruction<I> {
    /// In order of their responses.
    pub operations: Vec<Operation<I, Option<String>>>,
    pub warnings: Vec<Warning>,
    /// Matched pairs dropped because the invocation's action was not recognized.
    pub discarded: usize,
}

impl<I> Default for Reconstruction<I> {
    fn default() -> Self {
        Reconstruction {
            operations: Vec::new(),
            warnings: Vec::new(),
            discarded: 0,
        }
    }
}

struct Pending {
    call: i64,
    invocation: Event,
}

/// Pairs invocations with responses by correlation id.
///
/// Every event is stamped with its 1-based position in `events`. An operation takes its call
/// time, client and input from the invocation and its return time and output (`payloads[0]`)
/// from the response. Matching consumes the pending invocation, so an id may be reused once its
/// response has been seen.
pub fn reconstruct<M: HistoryModel>(events: Vec<Event>) -> Reconstruction<M::Input> {
    let mut pending: HashMap<String, Pending> = HashMap::new();
    let mut reconstruction = Reconstruction::default();

    for (i, event) in events.into_iter().enumerate() {
        let position = i as i64 + 1;
        match event.kind {
            EventKind::Invocation => {
                let id = event.id.clone();
                let previous = pending.insert(
                    id.clone(),
                    Pending {
                        call: position,
                        invocation: event,
                    },
                );
                if let Some(previous) = previous {
                    warn!(
                        %id,
                        overwritten = previous.call,
                        position,
                        "Duplicate invocation. Overwriting."
                    );
                    reconstruction.warnings.push(Warning::DuplicateInvocation {
                        id,
                        overwritten: previous.call,
                        position,
                    });
                }
            }
            EventKind::Response => {
                let Some(Pending { call, invocation }) = pending.remove(&event.id) else {
                    warn!(
                        id = %event.id,
                        position,
                        "Response without matching invocation. Skipping."
                    );
                    reconstruction.warnings.push(Warning::OrphanResponse {
                        id: event.id,
                        position,
                    });
                    continue;
                };
                let Some(action) = invocation.action else {
                    debug!(id = %event.id, call, position, "Discarding unrecognized action.");
                    reconstruction.discarded += 1;
                    continue;
                };
                let [output, _, _] = event.payloads;
                reconstruction.operations.push(Operation {
                    client_id: invocation.client_id,
                    input: M::input_from_invocation(action, invocation.payloads),
                    call,
                    output: Some(output),
                    ret: position,
                });
            }
        }
    }

    let mut unmatched: Vec<_> = pending.into_iter().collect();
    unmatched.sort_by_key(|(_, p)| p.call);
    for (id, Pending { call, .. }) in unmatched {
        warn!(%id, position = call, "Invocation never received a response.");
        reconstruction.warnings.push(Warning::UnmatchedInvocation {
            id,
            position: call,
        });
    }
    reconstruction
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{Action, KvInput, KvModel, QueueInput, QueueModel},
    };

    fn invocation(id: &str, client_id: u64, action: &str, key: &str, value: &str) -> Event {
        Event {
            id: id.to_string(),
            client_id,
            kind: EventKind::Invocation,
            action: Action::classify(action),
            payloads: [String::new(), key.to_string(), value.to_string()],
        }
    }

    fn response(id: &str, client_id: u64, output: &str) -> Event {
        Event {
            id: id.to_string(),
            client_id,
            kind: EventKind::Response,
            action: None,
            payloads: [output.to_string(), String::new(), String::new()],
        }
    }

    #[test]
    fn pairs_by_id_with_positional_timestamps() {
        let events = vec![
            invocation("a", 1, "kv_write", "x", "1"),
            invocation("b", 2, "kv_read", "x", ""),
            response("b", 2, "null"),
            response("a", 1, "ok"),
        ];
        let r = reconstruct::<KvModel>(events);
        assert!(r.warnings.is_empty());
        assert_eq!(
            r.operations,
            vec![
                Operation {
                    client_id: 2,
                    input: KvInput::Get {
                        key: "x".to_string()
                    },
                    call: 2,
                    output: Some("null".to_string()),
                    ret: 3,
                },
                Operation {
                    client_id: 1,
                    input: KvInput::Put {
                        key: "x".to_string(),
                        value: "1".to_string()
                    },
                    call: 1,
                    output: Some("ok".to_string()),
                    ret: 4,
                },
            ]
        );
    }

    #[test]
    fn duplicate_invocation_overwrites_and_warns() {
        let events = vec![
            invocation("a", 1, "q_write", "first", ""),
            invocation("a", 2, "q_read", "", ""),
            response("a", 2, "<empty>"),
        ];
        let r = reconstruct::<QueueModel>(events);
        assert_eq!(
            r.warnings,
            vec![Warning::DuplicateInvocation {
                id: "a".to_string(),
                overwritten: 1,
                position: 2,
            }]
        );
        assert_eq!(r.operations.len(), 1);
        assert_eq!(r.operations[0].client_id, 2);
        assert_eq!(r.operations[0].call, 2);
        assert_eq!(r.operations[0].ret, 3);
        assert_eq!(r.operations[0].input, QueueInput::Deq);
    }

    #[test]
    fn orphan_response_is_skipped() {
        let events = vec![
            response("ghost", 1, "x"),
            invocation("a", 1, "q_write", "v", ""),
            response("a", 1, ""),
        ];
        let r = reconstruct::<QueueModel>(events);
        assert_eq!(
            r.warnings,
            vec![Warning::OrphanResponse {
                id: "ghost".to_string(),
                position: 1,
            }]
        );
        assert_eq!(r.operations.len(), 1);
        assert_eq!((r.operations[0].call, r.operations[0].ret), (2, 3));
    }

    #[test]
    fn ids_can_be_reused_after_matching() {
        let events = vec![
            invocation("a", 1, "q_write", "v", ""),
            response("a", 1, ""),
            invocation("a", 1, "q_read", "", ""),
            response("a", 1, "v"),
            response("a", 1, "v"),
        ];
        let r = reconstruct::<QueueModel>(events);
        assert_eq!(r.operations.len(), 2);
        assert_eq!((r.operations[1].call, r.operations[1].ret), (3, 4));
        assert_eq!(
            r.warnings,
            vec![Warning::OrphanResponse {
                id: "a".to_string(),
                position: 5,
            }]
        );
    }

    #[test]
    fn unrecognized_actions_are_discarded_silently() {
        let events = vec![
            invocation("a", 1, "heartbeat", "", ""),
            response("a", 1, "ok"),
        ];
        let r = reconstruct::<KvModel>(events);
        assert!(r.operations.is_empty());
        assert!(r.warnings.is_empty());
        assert_eq!(r.discarded, 1);
    }

    #[test]
    fn unmatched_invocations_are_reported_in_log_order() {
        let events = vec![
            invocation("late", 1, "kv_read", "x", ""),
            invocation("later", 2, "kv_read", "y", ""),
            invocation("done", 3, "kv_read", "z", ""),
            response("done", 3, "null"),
        ];
        let r = reconstruct::<KvModel>(events);
        assert_eq!(r.operations.len(), 1);
        assert_eq!(
            r.warnings,
            vec![
                Warning::UnmatchedInvocation {
                    id: "late".to_string(),
                    position: 1,
                },
                Warning::UnmatchedInvocation {
                    id: "later".to_string(),
                    position: 2,
                },
            ]
        );
    }

    #[test]
    fn warnings_render_for_humans() {
        let warning = Warning::OrphanResponse {
            id: "a".to_string(),
            position: 3,
        };
        assert_eq!(
            warning.to_string(),
            "response for \"a\" at event 3 has no matching invocation"
        );
    }
}
