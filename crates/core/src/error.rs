use std::fmt;
use thiserror::Error;

use crate::model::{PartId, TestQuestionId, TestResultId};

/// Why the flattener refused an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The group flag disagrees with the payload that is present.
    ShapeMismatch,
    /// The entry id was already emitted earlier in the same test.
    DuplicateEntry,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::ShapeMismatch => f.write_str("group flag does not match the payload"),
            MalformedReason::DuplicateEntry => f.write_str("entry id is already used in this test"),
        }
    }
}

/// A question entry the flattener skipped.
///
/// Non-fatal: the flattener skips the entry, logs it and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed entry {entry_id} in part {part_id}: {reason}")]
pub struct MalformedEntry {
    pub part_id: PartId,
    pub entry_id: TestQuestionId,
    pub is_group: bool,
    pub reason: MalformedReason,
}

/// Conditions that block rebuilding a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssemblyError {
    #[error("attempt {test_result_id} has no recorded timer preference; cannot resume safely")]
    MissingTimerPreference { test_result_id: TestResultId },

    #[error("attempt {test_result_id} has no answerable content to resume")]
    EmptyContent { test_result_id: TestResultId },
}
