//! This library checks whether a recorded, potentially concurrent history of operations is
//! [linearizable] with respect to a reference model of the object being operated on.
//!
//! # Defining Correctness Via A Reference Model
//!
//! [`Model`] is a trait for defining correctness via an abstract state machine (e.g. "*this
//! system should behave like a FIFO queue*"). A model threads an explicit state value through
//! the check rather than mutating itself, so the same model instance can be shared across
//! every branch the search explores. Implementing the trait is straightforward: pick types for
//! the abstract state, the operation inputs and the observed outputs, then decide for any
//! `(state, input, output)` triple whether the step is legal and which state results.
//!
//! # Checking Recorded Histories
//!
//! A history is a slice of [`Operation`]s, each bounded by a call time and a return time and
//! attributed to a client. A [`Checker`] such as [`LinearizabilityChecker`] searches for a total
//! order of the operations that respects real-time order (an operation that returned before
//! another was called must precede it) and that the model accepts step by step. The outcome is a
//! three-way [`CheckResult`] plus a [`LinearizationInfo`] diagnostic trace, which the `visualize`
//! feature can render as a standalone HTML page.
//!
//! # Additional Reading
//!
//! - ["Linearizability: A Correctness Condition for Concurrent
//!   Objects"](https://doi.org/10.1145/78969.78972) by Herlihy and Wing
//! - ["Testing for Linearizability"](https://doi.org/10.1002/cpe.3928) by Lowe
//! - ["Faster Linearizability Checking via
//!   P-Compositionality"](https://arxiv.org/abs/1504.00204) by Horn and Kroening
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` for the result types.
//! - `visualize` (default): Render a checked history to HTML.
//!
//! [linearizable]: https://en.wikipedia.org/wiki/Linearizability

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod checker;
mod entries;
#[cfg(feature = "visualize")]
mod visualize;

pub use checker::{
    check_operations, CheckResult, Checker, LinearizabilityChecker, LinearizationInfo,
    PartitionInfo,
};

#[cfg(feature = "visualize")]
pub use visualize::{visualize, visualize_path};

/// One completed call/return pair in a recorded history.
///
/// `call` and `ret` are opaque, comparable timestamps. They need not be wall-clock times, only
/// consistent with the real-time order of the events that were recorded.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Operation<I, O> {
    pub client_id: u64,
    pub input: I,
    pub call: i64,
    pub output: O,
    pub ret: i64,
}

/// An implementation of this trait serves as a sequential "reference model" (an operational
/// specification) against which to validate the observed behavior of a more complex system,
/// such as a distributed key-value store.
///
/// The model itself holds no per-history state. All state lives in [`Model::State`] values that
/// the checker threads through the search, which is why [`Model::step`] returns the successor
/// state instead of mutating one in place.
pub trait Model {
    /// The abstract state. Cloned whenever the search needs to remember a branch point.
    type State: Clone;

    /// The type of operation inputs. Often an enum.
    type Input;

    /// The type of observed outputs.
    type Output;

    /// The state before any operation has been applied.
    fn init(&self) -> Self::State;

    /// Indicates whether applying `input` to `state` could have produced `output`, along with
    /// the resulting state. An illegal step must return a state equal to `state`.
    fn step(
        &self,
        state: &Self::State,
        input: &Self::Input,
        output: &Self::Output,
    ) -> (bool, Self::State);

    /// Structural equality on states. Used to prune branches that reach a state already explored
    /// with the same set of linearized operations.
    fn equal(&self, lhs: &Self::State, rhs: &Self::State) -> bool;

    /// Splits a history into independent sub-histories such that the whole history is
    /// linearizable if and only if every part is. Each part lists indices into `history`.
    ///
    /// The default keeps the history whole.
    fn partition(&self, history: &[Operation<Self::Input, Self::Output>]) -> Vec<Vec<usize>> {
        vec![(0..history.len()).collect()]
    }

    /// Human readable label for an operation. Display only.
    fn describe_operation(&self, input: &Self::Input, output: &Self::Output) -> String;

    /// Human readable label for a state. Display only.
    fn describe_state(&self, state: &Self::State) -> String;
}
