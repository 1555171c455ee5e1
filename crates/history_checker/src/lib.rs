//! Reconstructs operation histories from client event logs and checks them for linearizability
//! against a reference model of a key-value store or a FIFO queue.
//!
//! # Pipeline
//!
//! 1. [`read_log`] parses a CSV log. Interleaved logs carry separate `Invocation` and `Response`
//!    rows correlated by a `UniqueID`; paired logs carry one row per completed operation.
//! 2. [`reconstruct`] pairs the events of an interleaved log into [`Operation`]s, stamping each
//!    with the 1-based row positions of its invocation and response, and collects [`Warning`]s
//!    for log-quality problems such as orphan responses.
//! 3. A [`Checker`] decides whether the operations are linearizable with respect to a
//!    [`HistoryModel`] ([`KvModel`] or [`QueueModel`]).
//!
//! [`check_file`] runs the whole pipeline for one file, and the [`bench`] module aggregates
//! outcomes across a directory of logs.
//!
//! # Usage
//!
//! ```no_run
//! use history_checker::{check_file, CheckOptions, KvModel, LinearizabilityChecker};
//!
//! let report = check_file(
//!     &KvModel,
//!     &LinearizabilityChecker,
//!     "history.csv",
//!     &CheckOptions::default(),
//! )?;
//! println!("{}", report.result);
//! # Ok::<(), history_checker::HistoryError>(())
//! ```

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

pub mod bench;
mod check;
mod error;
mod event;
mod ingest;
mod kv;
mod model;
mod queue;
mod reconstruct;

pub use check::{check_file, check_file_as, load_history, CheckOptions, Report};
pub use consistency_model::{
    CheckResult, Checker, LinearizabilityChecker, LinearizationInfo, Model, Operation,
};
pub use error::{HistoryError, Result};
pub use event::{Action, Event, EventKind};
pub use ingest::{read_events, read_log, read_paired, LogFormat, RawLog};
pub use kv::{KvInput, KvModel};
pub use model::{HistoryModel, ModelKind};
pub use queue::{QueueInput, QueueModel};
pub use reconstruct::{reconstruct, Reconstruction, Warning};
