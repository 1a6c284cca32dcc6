use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::content::{AnswerOption, MediaRefs};
use crate::model::ids::{PartId, TestQuestionId};
use crate::model::section::SectionTag;

/// Identity of an answerable unit: the owning entry plus the position inside it.
///
/// Standalone questions always use `sub_index == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub entry_id: TestQuestionId,
    pub sub_index: u32,
}

impl UnitKey {
    #[must_use]
    pub fn new(entry_id: TestQuestionId, sub_index: u32) -> Self {
        Self {
            entry_id,
            sub_index,
        }
    }

    /// Builds a key from a wire sub-index, where a missing index means 0.
    #[must_use]
    pub fn normalized(entry_id: TestQuestionId, sub_index: Option<u32>) -> Self {
        Self::new(entry_id, sub_index.unwrap_or(0))
    }
}

/// `"<entry>"` for sub-index 0, `"<entry>_<sub>"` otherwise.
impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_index == 0 {
            write!(f, "{}", self.entry_id)
        } else {
            write!(f, "{}_{}", self.entry_id, self.sub_index)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Single,
    Group,
}

/// Smallest gradable piece of content: a standalone question or one sub-question
/// of a group. Derived by the flattener, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerableUnit {
    pub key: UnitKey,
    /// 1-based position across the whole test.
    pub global_order: u32,
    pub kind: UnitKind,
    pub part_id: PartId,
    pub part_name: String,
    pub section: SectionTag,
    pub content: String,
    pub passage: Option<String>,
    /// Shared group media for grouped units.
    pub group_media: MediaRefs,
    pub media: MediaRefs,
    pub options: Vec<AnswerOption>,
    pub correct_label: Option<String>,
}

impl AnswerableUnit {
    /// True for writing/speaking prompts with nothing to grade against.
    #[must_use]
    pub fn is_open_ended(&self) -> bool {
        self.correct_label.is_none()
    }
}
