pub mod media;

pub use media::{MediaRefs, MediaUri, MediaValidationError};
pub use test::{
    AnswerOption, EntryShape, Part, QuestionGroup, QuestionSnapshot, TestDefinition,
    TestQuestionEntry,
};
