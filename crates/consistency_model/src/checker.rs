use {
    crate::{entries::Entries, Model, Operation},
    bit_vec::BitVec,
    std::{
        collections::HashMap,
        fmt::{Display, Formatter},
        time::{Duration, Instant},
    },
    tracing::{debug, warn},
};

/// The three-way outcome of checking a history.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CheckResult {
    /// A valid linearization exists.
    Ok,
    /// Provably no valid linearization exists.
    Illegal,
    /// The search did not finish before the timeout.
    Unknown,
}

impl CheckResult {
    /// Combines the results of independent partitions.
    fn and(self, other: CheckResult) -> CheckResult {
        use CheckResult::*;
        match (self, other) {
            (Illegal, _) | (_, Illegal) => Illegal,
            (Unknown, _) | (_, Unknown) => Unknown,
            (Ok, Ok) => Ok,
        }
    }
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CheckResult::Ok => "linearizable",
            CheckResult::Illegal => "not linearizable",
            CheckResult::Unknown => "inconclusive",
        })
    }
}

/// Diagnostic trace for one partition of a checked history.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartitionInfo {
    /// Indices into the checked history.
    pub operations: Vec<usize>,
    /// The longest linearized prefix found, as indices into the checked history. When the
    /// partition is linearizable this covers every operation.
    pub linearization: Vec<usize>,
    pub result: CheckResult,
}

/// Diagnostic trace for a checked history, one entry per partition.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinearizationInfo {
    pub partitions: Vec<PartitionInfo>,
}

/// A linearizability decision procedure.
///
/// This is the seam between code that assembles histories and the search itself, so the former
/// can be tested against a stub that returns a fixed verdict.
pub trait Checker {
    /// Checks `history` against `model`. A `timeout` of `None` or zero lets the search run until
    /// it reaches a verdict.
    fn check<M: Model>(
        &self,
        model: &M,
        history: &[Operation<M::Input, M::Output>],
        timeout: Option<Duration>,
    ) -> (CheckResult, LinearizationInfo);
}

/// Checks histories with the backtracking search described by Wing and Gong and refined by Lowe,
/// memoizing `(linearized set, state)` pairs that have already been explored.
///
/// Each partition reported by [`Model::partition`] is searched independently.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearizabilityChecker;

impl Checker for LinearizabilityChecker {
    fn check<M: Model>(
        &self,
        model: &M,
        history: &[Operation<M::Input, M::Output>],
        timeout: Option<Duration>,
    ) -> (CheckResult, LinearizationInfo) {
        let deadline = timeout
            .filter(|timeout| !timeout.is_zero())
            .map(|timeout| Instant::now() + timeout);
        let mut result = CheckResult::Ok;
        let mut info = LinearizationInfo::default();
        for operations in model.partition(history) {
            let partition = if deadline.map_or(false, |d| Instant::now() >= d) {
                PartitionInfo {
                    operations,
                    linearization: Vec::new(),
                    result: CheckResult::Unknown,
                }
            } else {
                check_partition(model, history, operations, deadline)
            };
            debug!(
                operations = partition.operations.len(),
                linearized = partition.linearization.len(),
                result = %partition.result,
                "Checked partition."
            );
            result = result.and(partition.result);
            info.partitions.push(partition);
        }
        if result == CheckResult::Unknown {
            warn!(?timeout, "Linearizability search timed out.");
        }
        (result, info)
    }
}

/// Shorthand for [`LinearizabilityChecker::check`].
pub fn check_operations<M: Model>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    timeout: Option<Duration>,
) -> (CheckResult, LinearizationInfo) {
    LinearizabilityChecker.check(model, history, timeout)
}

fn check_partition<M: Model>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    operations: Vec<usize>,
    deadline: Option<Instant>,
) -> PartitionInfo {
    let mut entries = Entries::new(history, &operations);
    let mut linearized = BitVec::from_elem(operations.len(), false);
    let mut cache: HashMap<BitVec, Vec<M::State>> = HashMap::new();
    let mut calls: Vec<(usize, M::State)> = Vec::new(); // (call node, state before the call)
    let mut longest: Vec<usize> = Vec::new();
    let mut state = model.init();

    let to_history = |local: &[usize]| local.iter().map(|&i| operations[i]).collect::<Vec<_>>();
    let mut cursor = entries.first();
    let result = loop {
        let node = match cursor {
            None if entries.first().is_none() => break CheckResult::Ok,
            None => break CheckResult::Illegal, // only reachable if a return precedes its call
            Some(node) => node,
        };
        if deadline.map_or(false, |d| Instant::now() >= d) {
            break CheckResult::Unknown;
        }

        if entries.is_call(node) {
            let local = entries.op(node);
            let op = &history[operations[local]];
            let (is_legal, next_state) = model.step(&state, &op.input, &op.output);
            if is_legal {
                let mut next_linearized = linearized.clone();
                next_linearized.set(local, true);
                let explored = cache
                    .get(&next_linearized)
                    .map_or(false, |states| states.iter().any(|s| model.equal(s, &next_state)));
                if !explored {
                    cache
                        .entry(next_linearized.clone())
                        .or_default()
                        .push(next_state.clone());
                    calls.push((node, std::mem::replace(&mut state, next_state)));
                    linearized = next_linearized;
                    entries.lift(node);
                    if calls.len() > longest.len() {
                        longest = calls.iter().map(|(n, _)| entries.op(*n)).collect();
                    }
                    cursor = entries.first();
                    continue;
                }
            }
            cursor = entries.next(node);
        } else {
            // A return was reached before its call could be linearized, so revoke the most
            // recent linearization choice.
            let (call, prior) = match calls.pop() {
                None => break CheckResult::Illegal,
                Some(pair) => pair,
            };
            state = prior;
            linearized.set(entries.op(call), false);
            entries.unlift(call);
            cursor = entries.next(call);
        }
    };

    PartitionInfo {
        linearization: to_history(&longest),
        operations,
        result,
    }
}
