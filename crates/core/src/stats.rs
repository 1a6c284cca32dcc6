//! Answered / correct / wrong / unanswered tallies and accuracy, overall and
//! per declared section.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{
    AnswerableUnit, ReconciledAnswer, ReconciledAnswers, SectionMap, SectionTag, SessionState,
};

//
// ─── PER-UNIT OUTCOME ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOutcome {
    Unanswered,
    /// Answered, but there is no correct label to grade against.
    Ungraded,
    Correct,
    Wrong,
}

/// Grades one unit by exact string comparison against its correct label.
#[must_use]
pub fn grade(unit: &AnswerableUnit, answer: Option<&ReconciledAnswer>) -> UnitOutcome {
    match (answer, unit.correct_label.as_deref()) {
        (None, _) => UnitOutcome::Unanswered,
        (Some(_), None) => UnitOutcome::Ungraded,
        (Some(a), Some(expected)) if a.value.as_str() == expected => UnitOutcome::Correct,
        (Some(_), Some(_)) => UnitOutcome::Wrong,
    }
}

//
// ─── COUNTS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounts {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub unanswered: usize,
    /// `round(correct / total * 100)`, 0 when there are no units.
    pub accuracy: u8,
}

impl ProgressCounts {
    fn record(&mut self, outcome: UnitOutcome) {
        self.total += 1;
        match outcome {
            UnitOutcome::Unanswered => {}
            UnitOutcome::Ungraded => self.answered += 1,
            UnitOutcome::Correct => {
                self.answered += 1;
                self.correct += 1;
            }
            UnitOutcome::Wrong => {
                self.answered += 1;
                self.wrong += 1;
            }
        }
        self.unanswered = self.total - self.answered;
        self.accuracy = accuracy_percent(self.correct, self.total);
    }
}

/// Percentage of `correct` over `total`, rounded half up; 0 when `total` is 0.
#[must_use]
pub fn accuracy_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u128;
    let total = total as u128;
    let pct = (correct * 200 + total) / (total * 2);
    u8::try_from(pct).unwrap_or(100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub tag: SectionTag,
    pub counts: ProgressCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub overall: ProgressCounts,
    /// One entry per declared section, in declaration order.
    pub sections: Vec<SectionProgress>,
}

impl ProgressSummary {
    #[must_use]
    pub fn section(&self, tag: &str) -> Option<&ProgressCounts> {
        self.sections
            .iter()
            .find(|s| s.tag.as_str() == tag)
            .map(|s| &s.counts)
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Computes the progress summary for a set of units and their answers.
///
/// Answers for keys that match no unit are ignored. Units tagged with a section
/// the map does not declare count toward `overall` only.
#[must_use]
pub fn progress(
    units: &[AnswerableUnit],
    answers: &ReconciledAnswers,
    sections: &SectionMap,
) -> ProgressSummary {
    let mut per_section: Vec<SectionProgress> = sections
        .declared()
        .into_iter()
        .map(|tag| SectionProgress {
            tag,
            counts: ProgressCounts::default(),
        })
        .collect();
    let index: HashMap<SectionTag, usize> = per_section
        .iter()
        .enumerate()
        .map(|(i, s)| (s.tag.clone(), i))
        .collect();

    let mut overall = ProgressCounts::default();
    for unit in units {
        let outcome = grade(unit, answers.get(&unit.key));
        overall.record(outcome);
        if let Some(&i) = index.get(&unit.section) {
            per_section[i].counts.record(outcome);
        }
    }

    ProgressSummary {
        overall,
        sections: per_section,
    }
}

impl SessionState {
    #[must_use]
    pub fn progress(&self, sections: &SectionMap) -> ProgressSummary {
        progress(&self.units, &self.answers, sections)
    }
}
