#![forbid(unsafe_code)]
//! Rebuilds resumable exam sessions from test content plus answer history and
//! derives progress statistics from the result.
//!
//! Pipeline: [`flatten::Flattener`] and [`reconcile::Reconciler`] run
//! independently, [`assemble::assemble`] composes their output into a
//! [`model::SessionState`], and [`stats::progress`] summarizes it. Every step is
//! a pure, synchronous transform.

pub mod assemble;
pub mod error;
pub mod flatten;
pub mod model;
pub mod reconcile;
pub mod stats;
pub mod time;

pub use assemble::assemble;
pub use error::{AssemblyError, MalformedEntry, MalformedReason};
pub use flatten::{Flattened, Flattener};
pub use reconcile::{EmptyWritePolicy, Reconciler};
pub use stats::{ProgressCounts, ProgressSummary, SectionProgress, UnitOutcome, grade, progress};
pub use time::Clock;
