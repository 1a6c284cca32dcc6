mod answer;
pub mod content;
mod ids;
mod section;
mod session;
mod unit;

pub use content::{
    AnswerOption, EntryShape, MediaRefs, MediaUri, MediaValidationError, Part, QuestionGroup,
    QuestionSnapshot, TestDefinition, TestQuestionEntry,
};
pub use ids::{ParseIdError, PartId, TestId, TestQuestionId, TestResultId};

pub use answer::{AnswerValue, RawAnswerRecord, ReconciledAnswer, ReconciledAnswers};
pub use section::{SectionMap, SectionMapError, SectionRange, SectionTag};
pub use session::{
    SessionMetadata, SessionState, TestSkill, TestType, TimerMode, TimerReading,
};
pub use unit::{AnswerableUnit, UnitKey, UnitKind};
