use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::TestQuestionId;
use crate::model::unit::UnitKey;

//
// ─── ANSWER VALUE ──────────────────────────────────────────────────────────────
//

/// The resolved content of an answer, tagged by where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// Listening & reading: the chosen option label.
    OptionLabel(String),
    /// Writing: free text.
    Text(String),
    /// Speaking: reference to the recorded audio.
    Audio(String),
}

impl AnswerValue {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            AnswerValue::OptionLabel(v) | AnswerValue::Text(v) | AnswerValue::Audio(v) => v,
        }
    }
}

//
// ─── RAW RECORD ────────────────────────────────────────────────────────────────
//

/// One answer write from the answer-history service, already normalized to the
/// internal schema. Several records may target the same unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnswerRecord {
    pub entry_id: TestQuestionId,
    pub sub_index: Option<u32>,
    pub chosen_option_label: Option<String>,
    pub answer_text: Option<String>,
    pub answer_audio_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawAnswerRecord {
    #[must_use]
    pub fn new(entry_id: TestQuestionId, sub_index: Option<u32>) -> Self {
        Self {
            entry_id,
            sub_index,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_option(mut self, label: impl Into<String>) -> Self {
        self.chosen_option_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.answer_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_audio(mut self, url: impl Into<String>) -> Self {
        self.answer_audio_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    #[must_use]
    pub fn updated(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    #[must_use]
    pub fn key(&self) -> UnitKey {
        UnitKey::normalized(self.entry_id, self.sub_index)
    }

    /// First non-empty of option label, free text, audio reference.
    #[must_use]
    pub fn extract_value(&self) -> Option<AnswerValue> {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned)
        }

        non_empty(&self.chosen_option_label)
            .map(AnswerValue::OptionLabel)
            .or_else(|| non_empty(&self.answer_text).map(AnswerValue::Text))
            .or_else(|| non_empty(&self.answer_audio_url).map(AnswerValue::Audio))
    }

    /// `updated_at`, else `created_at`, else the Unix epoch.
    #[must_use]
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.updated_at
            .or(self.created_at)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

//
// ─── RECONCILED ────────────────────────────────────────────────────────────────
//

/// The single authoritative answer for a unit after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledAnswer {
    pub key: UnitKey,
    pub value: AnswerValue,
    pub resolved_at: DateTime<Utc>,
}

/// At most one reconciled answer per unit, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ReconciledAnswer>", into = "Vec<ReconciledAnswer>")]
pub struct ReconciledAnswers(BTreeMap<UnitKey, ReconciledAnswer>);

impl ReconciledAnswers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &UnitKey) -> Option<&ReconciledAnswer> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &UnitKey) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReconciledAnswer> {
        self.0.values()
    }
}

impl From<Vec<ReconciledAnswer>> for ReconciledAnswers {
    fn from(answers: Vec<ReconciledAnswer>) -> Self {
        Self(answers.into_iter().map(|a| (a.key, a)).collect())
    }
}

impl From<ReconciledAnswers> for Vec<ReconciledAnswer> {
    fn from(answers: ReconciledAnswers) -> Self {
        answers.0.into_values().collect()
    }
}

impl FromIterator<ReconciledAnswer> for ReconciledAnswers {
    fn from_iter<I: IntoIterator<Item = ReconciledAnswer>>(iter: I) -> Self {
        Self(iter.into_iter().map(|a| (a.key, a)).collect())
    }
}
