use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::answer::{ReconciledAnswer, ReconciledAnswers};
use crate::model::ids::{TestId, TestResultId};
use crate::model::unit::{AnswerableUnit, UnitKey};

//
// ─── SKILL & TYPE ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSkill {
    Speaking,
    Writing,
    ListeningReading,
    SpeakingWriting,
}

impl TestSkill {
    /// Maps the numeric skill code used by the content service.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Speaking),
            2 => Some(Self::Writing),
            3 => Some(Self::ListeningReading),
            4 => Some(Self::SpeakingWriting),
            _ => None,
        }
    }

    /// Accepts codes as text plus the display labels seen in history payloads.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Ok(code) = label.parse::<u8>() {
            return Self::from_code(code);
        }
        match label.to_ascii_uppercase().as_str() {
            "SPEAKING" => Some(Self::Speaking),
            "WRITING" => Some(Self::Writing),
            "LR" | "L&R" | "LISTENING & READING" | "LISTENINGREADING" => {
                Some(Self::ListeningReading)
            }
            "SW" | "S&W" | "SPEAKING & WRITING" | "SPEAKINGWRITING" => {
                Some(Self::SpeakingWriting)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Speaking => 1,
            Self::Writing => 2,
            Self::ListeningReading => 3,
            Self::SpeakingWriting => 4,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Speaking => "Speaking",
            Self::Writing => "Writing",
            Self::ListeningReading => "Listening & Reading",
            Self::SpeakingWriting => "S&W",
        }
    }
}

impl fmt::Display for TestSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Simulator,
    Practice,
}

impl TestType {
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Simulator),
            2 => Some(Self::Practice),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Ok(code) = label.parse::<u8>() {
            return Self::from_code(code);
        }
        match label.to_ascii_lowercase().as_str() {
            "simulator" => Some(Self::Simulator),
            "practice" => Some(Self::Practice),
            _ => None,
        }
    }
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// How the exam clock runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Fixed duration ticking to zero.
    Countdown,
    /// Elapsed time ticking upward, unbounded.
    Countup,
}

impl TimerMode {
    /// Maps the "select time" preference captured when the attempt first started.
    #[must_use]
    pub fn from_preference(select_time: bool) -> Self {
        if select_time {
            Self::Countdown
        } else {
            Self::Countup
        }
    }
}

/// Clock state of a session at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerReading {
    pub mode: TimerMode,
    pub elapsed: Duration,
    /// Only set for countdown.
    pub remaining: Option<Duration>,
    pub expired: bool,
}

//
// ─── METADATA ──────────────────────────────────────────────────────────────────
//

/// What the history service knows about an attempt when it is resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub test_id: TestId,
    pub test_result_id: TestResultId,
    pub skill: TestSkill,
    pub test_type: Option<TestType>,
    pub duration_minutes: u32,
    pub total_questions: u32,
    /// Timer preference captured at first start; `None` when history lacks it.
    pub select_time: Option<bool>,
    pub created_at: DateTime<Utc>,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Resumable exam state, rebuilt from scratch on every resume.
///
/// Owned by the calling flow for one exam-taking interaction and handed to a
/// session store on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub test_id: TestId,
    pub test_result_id: TestResultId,
    pub skill: TestSkill,
    pub test_type: Option<TestType>,
    pub timer_mode: TimerMode,
    pub duration_minutes: u32,
    pub total_questions: u32,
    pub original_created_at: DateTime<Utc>,
    pub units: Vec<AnswerableUnit>,
    pub answers: ReconciledAnswers,
}

impl SessionState {
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn answer_for(&self, key: &UnitKey) -> Option<&ReconciledAnswer> {
        self.answers.get(key)
    }

    /// First unit without an answer, where a resumed user picks up.
    #[must_use]
    pub fn first_unanswered(&self) -> Option<&AnswerableUnit> {
        self.units.iter().find(|u| !self.answers.contains(&u.key))
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Reads the exam clock at `now`, anchored at the original start instant.
    #[must_use]
    pub fn timer_at(&self, now: DateTime<Utc>) -> TimerReading {
        let elapsed = (now - self.original_created_at).max(Duration::zero());
        match self.timer_mode {
            TimerMode::Countdown => {
                let remaining = (self.duration() - elapsed).max(Duration::zero());
                TimerReading {
                    mode: TimerMode::Countdown,
                    elapsed,
                    remaining: Some(remaining),
                    expired: remaining == Duration::zero(),
                }
            }
            TimerMode::Countup => TimerReading {
                mode: TimerMode::Countup,
                elapsed,
                remaining: None,
                expired: false,
            },
        }
    }
}
