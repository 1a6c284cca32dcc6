//! Merges duplicate answer writes into one authoritative answer per unit.
//!
//! Conflict policy is last-write-wins on the effective timestamp, with later
//! input position breaking ties. The policy lives in [`last_write_wins`] and
//! [`group_latest`] so it can be exercised without any answer types.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::model::{AnswerValue, RawAnswerRecord, ReconciledAnswer, ReconciledAnswers, UnitKey};

//
// ─── LAST-WRITE-WINS REDUCER ───────────────────────────────────────────────────
//

/// A timestamped write; `seq` is its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub seq: usize,
    pub at: DateTime<Utc>,
    pub item: T,
}

/// Picks the newest candidate; equal timestamps go to the highest `seq`.
pub fn last_write_wins<T>(candidates: impl IntoIterator<Item = Candidate<T>>) -> Option<Candidate<T>> {
    candidates.into_iter().max_by_key(|c| (c.at, c.seq))
}

/// Groups candidates by key and reduces each group with [`last_write_wins`].
pub fn group_latest<K: Ord, T>(
    candidates: impl IntoIterator<Item = (K, Candidate<T>)>,
) -> BTreeMap<K, Candidate<T>> {
    let mut groups: BTreeMap<K, Vec<Candidate<T>>> = BTreeMap::new();
    for (key, candidate) in candidates {
        groups.entry(key).or_default().push(candidate);
    }
    groups
        .into_iter()
        .filter_map(|(key, group)| last_write_wins(group).map(|winner| (key, winner)))
        .collect()
}

//
// ─── RECONCILER ────────────────────────────────────────────────────────────────
//

/// What to do with a write that carries no answer value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyWritePolicy {
    /// Drop empty writes before grouping; an earlier answer survives.
    #[default]
    Ignore,
    /// Empty writes take part in last-write-wins; winning clears the answer.
    Clear,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    empty_writes: EmptyWritePolicy,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_empty_write_policy(mut self, policy: EmptyWritePolicy) -> Self {
        self.empty_writes = policy;
        self
    }

    /// Never fails: a unit with no usable write simply has no answer.
    #[must_use]
    pub fn reconcile(&self, records: &[RawAnswerRecord]) -> ReconciledAnswers {
        let candidates = records.iter().enumerate().filter_map(|(seq, record)| {
            let value = record.extract_value();
            if value.is_none() && self.empty_writes == EmptyWritePolicy::Ignore {
                return None;
            }
            Some((
                record.key(),
                Candidate {
                    seq,
                    at: record.effective_timestamp(),
                    item: value,
                },
            ))
        });

        let winners: BTreeMap<UnitKey, Candidate<Option<AnswerValue>>> = group_latest(candidates);
        let answers: ReconciledAnswers = winners
            .into_iter()
            .filter_map(|(key, winner)| {
                winner.item.map(|value| ReconciledAnswer {
                    key,
                    value,
                    resolved_at: winner.at,
                })
            })
            .collect();

        debug!(
            records = records.len(),
            answers = answers.len(),
            policy = ?self.empty_writes,
            "reconciled answer history"
        );
        answers
    }
}
