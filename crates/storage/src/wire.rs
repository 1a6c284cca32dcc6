//! Ingestion adapter: wire payloads from the content and answer-history
//! services, normalized once into the strict core schema.
//!
//! Field priority: every field is read from its camelCase name first and falls
//! back to the PascalCase spelling (`testResultId`, then `TestResultId`). A
//! payload may carry both; the camelCase value wins. Ids may arrive as numbers
//! or numeric strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use exam_core::model::{
    AnswerOption, MediaRefs, MediaUri, Part, PartId, QuestionGroup, QuestionSnapshot,
    RawAnswerRecord, SessionMetadata, TestDefinition, TestId, TestQuestionEntry, TestQuestionId,
    TestResultId, TestSkill, TestType,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid id `{raw}` in `{field}`")]
    InvalidId { field: &'static str, raw: String },

    #[error("unknown test skill `{0}`")]
    UnknownSkill(String),

    #[error("unknown test type `{0}`")]
    UnknownTestType(String),

    #[error("invalid timestamp `{raw}` in `{field}`")]
    InvalidTimestamp { field: &'static str, raw: String },
}

//
// ─── SCALAR HELPERS ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumOrText {
    Num(u64),
    Text(String),
}

impl NumOrText {
    fn as_id(&self, field: &'static str) -> Result<u64, IngestError> {
        match self {
            NumOrText::Num(n) => Ok(*n),
            NumOrText::Text(s) => s.trim().parse().map_err(|_| IngestError::InvalidId {
                field,
                raw: s.clone(),
            }),
        }
    }

    fn as_label(&self) -> String {
        match self {
            NumOrText::Num(n) => n.to_string(),
            NumOrText::Text(s) => s.clone(),
        }
    }
}

fn required_id(value: Option<&NumOrText>, field: &'static str) -> Result<u64, IngestError> {
    value.ok_or(IngestError::MissingField(field))?.as_id(field)
}

/// Parses RFC 3339, or an offset-less ISO-8601 timestamp taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp(raw: Option<&str>, field: &'static str) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!(field, raw, "ignoring unparsable timestamp");
    }
    parsed
}

fn media(image: Option<&str>, audio: Option<&str>) -> MediaRefs {
    MediaRefs::new(MediaUri::parse_optional(image), MediaUri::parse_optional(audio))
}

//
// ─── TEST CONTENT ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct OptionDto {
    #[serde(rename = "label")]
    label: Option<String>,
    #[serde(rename = "Label")]
    label_pascal: Option<String>,
    #[serde(rename = "content")]
    content: Option<String>,
    #[serde(rename = "Content")]
    content_pascal: Option<String>,
    #[serde(rename = "isCorrect")]
    is_correct: Option<bool>,
    #[serde(rename = "IsCorrect")]
    is_correct_pascal: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct QuestionSnapshotDto {
    #[serde(rename = "content")]
    content: Option<String>,
    #[serde(rename = "Content")]
    content_pascal: Option<String>,
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
    #[serde(rename = "ImageUrl")]
    image_url_pascal: Option<String>,
    #[serde(rename = "audioUrl")]
    audio_url: Option<String>,
    #[serde(rename = "AudioUrl")]
    audio_url_pascal: Option<String>,
    #[serde(rename = "options")]
    options: Option<Vec<OptionDto>>,
    #[serde(rename = "Options")]
    options_pascal: Option<Vec<OptionDto>>,
}

#[derive(Debug, Deserialize)]
struct QuestionGroupDto {
    #[serde(rename = "passage")]
    passage: Option<String>,
    #[serde(rename = "Passage")]
    passage_pascal: Option<String>,
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
    #[serde(rename = "ImageUrl")]
    image_url_pascal: Option<String>,
    #[serde(rename = "audioUrl")]
    audio_url: Option<String>,
    #[serde(rename = "AudioUrl")]
    audio_url_pascal: Option<String>,
    #[serde(rename = "questionSnapshots")]
    question_snapshots: Option<Vec<QuestionSnapshotDto>>,
    #[serde(rename = "QuestionSnapshots")]
    question_snapshots_pascal: Option<Vec<QuestionSnapshotDto>>,
}

#[derive(Debug, Deserialize)]
struct TestQuestionDto {
    #[serde(rename = "testQuestionId")]
    test_question_id: Option<NumOrText>,
    #[serde(rename = "TestQuestionId")]
    test_question_id_pascal: Option<NumOrText>,
    #[serde(rename = "isGroup")]
    is_group: Option<bool>,
    #[serde(rename = "IsGroup")]
    is_group_pascal: Option<bool>,
    #[serde(rename = "questionSnapshotDto")]
    question_snapshot_dto: Option<QuestionSnapshotDto>,
    #[serde(rename = "QuestionSnapshotDto")]
    question_snapshot_dto_pascal: Option<QuestionSnapshotDto>,
    #[serde(rename = "questionGroupSnapshotDto")]
    question_group_snapshot_dto: Option<QuestionGroupDto>,
    #[serde(rename = "QuestionGroupSnapshotDto")]
    question_group_snapshot_dto_pascal: Option<QuestionGroupDto>,
}

#[derive(Debug, Deserialize)]
struct PartDto {
    #[serde(rename = "partId")]
    part_id: Option<NumOrText>,
    #[serde(rename = "PartId")]
    part_id_pascal: Option<NumOrText>,
    #[serde(rename = "partName")]
    part_name: Option<String>,
    #[serde(rename = "PartName")]
    part_name_pascal: Option<String>,
    #[serde(rename = "description")]
    description: Option<String>,
    #[serde(rename = "Description")]
    description_pascal: Option<String>,
    #[serde(rename = "testQuestions")]
    test_questions: Option<Vec<TestQuestionDto>>,
    #[serde(rename = "TestQuestions")]
    test_questions_pascal: Option<Vec<TestQuestionDto>>,
}

/// Payload returned when a test is (re)started: content plus saved answers.
#[derive(Debug, Deserialize)]
struct StartTestDto {
    #[serde(rename = "parts")]
    parts: Option<Vec<PartDto>>,
    #[serde(rename = "Parts")]
    parts_pascal: Option<Vec<PartDto>>,
    #[serde(rename = "savedAnswers")]
    saved_answers: Option<Vec<SavedAnswerDto>>,
    #[serde(rename = "SavedAnswers")]
    saved_answers_pascal: Option<Vec<SavedAnswerDto>>,
}

impl OptionDto {
    fn into_domain(self) -> AnswerOption {
        AnswerOption::new(
            self.label.or(self.label_pascal).unwrap_or_default(),
            self.content.or(self.content_pascal).unwrap_or_default(),
            self.is_correct.or(self.is_correct_pascal).unwrap_or(false),
        )
    }
}

impl QuestionSnapshotDto {
    fn into_domain(self) -> QuestionSnapshot {
        let image = self.image_url.or(self.image_url_pascal);
        let audio = self.audio_url.or(self.audio_url_pascal);
        let options = self
            .options
            .or(self.options_pascal)
            .unwrap_or_default()
            .into_iter()
            .map(OptionDto::into_domain)
            .collect();
        QuestionSnapshot::new(self.content.or(self.content_pascal).unwrap_or_default(), options)
            .with_media(media(image.as_deref(), audio.as_deref()))
    }
}

impl QuestionGroupDto {
    fn into_domain(self) -> QuestionGroup {
        let image = self.image_url.or(self.image_url_pascal);
        let audio = self.audio_url.or(self.audio_url_pascal);
        let questions = self
            .question_snapshots
            .or(self.question_snapshots_pascal)
            .unwrap_or_default()
            .into_iter()
            .map(QuestionSnapshotDto::into_domain)
            .collect();
        QuestionGroup::new(self.passage.or(self.passage_pascal), questions)
            .with_media(media(image.as_deref(), audio.as_deref()))
    }
}

impl TestQuestionDto {
    /// Keeps the flag and both payloads as sent; shape checks happen when flattening.
    fn into_domain(self) -> Result<TestQuestionEntry, IngestError> {
        let id = required_id(
            self.test_question_id.or(self.test_question_id_pascal).as_ref(),
            "testQuestionId",
        )?;
        Ok(TestQuestionEntry {
            id: TestQuestionId::new(id),
            is_group: self.is_group.or(self.is_group_pascal).unwrap_or(false),
            single: self
                .question_snapshot_dto
                .or(self.question_snapshot_dto_pascal)
                .map(QuestionSnapshotDto::into_domain),
            group: self
                .question_group_snapshot_dto
                .or(self.question_group_snapshot_dto_pascal)
                .map(QuestionGroupDto::into_domain),
        })
    }
}

impl PartDto {
    fn into_domain(self) -> Result<Part, IngestError> {
        let id = match self.part_id.or(self.part_id_pascal) {
            Some(raw) => raw.as_id("partId")?,
            None => 0,
        };
        let entries = self
            .test_questions
            .or(self.test_questions_pascal)
            .unwrap_or_default()
            .into_iter()
            .map(TestQuestionDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Part {
            id: PartId::new(id),
            name: self
                .part_name
                .or(self.part_name_pascal)
                .unwrap_or_else(|| format!("Part {id}")),
            description: self.description.or(self.description_pascal),
            entries,
        })
    }
}

fn definition_from_parts(test_id: TestId, parts: Vec<PartDto>) -> Result<TestDefinition, IngestError> {
    let parts = parts
        .into_iter()
        .map(PartDto::into_domain)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TestDefinition::new(test_id, parts))
}

//
// ─── SAVED ANSWERS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct SavedAnswerDto {
    #[serde(rename = "testQuestionId")]
    test_question_id: Option<NumOrText>,
    #[serde(rename = "TestQuestionId")]
    test_question_id_pascal: Option<NumOrText>,
    #[serde(rename = "subQuestionIndex")]
    sub_question_index: Option<u32>,
    #[serde(rename = "SubQuestionIndex")]
    sub_question_index_pascal: Option<u32>,
    #[serde(rename = "chosenOptionLabel")]
    chosen_option_label: Option<String>,
    #[serde(rename = "ChosenOptionLabel")]
    chosen_option_label_pascal: Option<String>,
    #[serde(rename = "answerText")]
    answer_text: Option<String>,
    #[serde(rename = "AnswerText")]
    answer_text_pascal: Option<String>,
    #[serde(rename = "answerAudioUrl")]
    answer_audio_url: Option<String>,
    #[serde(rename = "AnswerAudioUrl")]
    answer_audio_url_pascal: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "CreatedAt")]
    created_at_pascal: Option<String>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<String>,
    #[serde(rename = "UpdatedAt")]
    updated_at_pascal: Option<String>,
}

impl SavedAnswerDto {
    fn into_domain(self) -> Result<RawAnswerRecord, IngestError> {
        let id = required_id(
            self.test_question_id.or(self.test_question_id_pascal).as_ref(),
            "testQuestionId",
        )?;
        let created_at = self.created_at.or(self.created_at_pascal);
        let updated_at = self.updated_at.or(self.updated_at_pascal);
        Ok(RawAnswerRecord {
            entry_id: TestQuestionId::new(id),
            sub_index: self.sub_question_index.or(self.sub_question_index_pascal),
            chosen_option_label: self.chosen_option_label.or(self.chosen_option_label_pascal),
            answer_text: self.answer_text.or(self.answer_text_pascal),
            answer_audio_url: self.answer_audio_url.or(self.answer_audio_url_pascal),
            created_at: lenient_timestamp(created_at.as_deref(), "createdAt"),
            updated_at: lenient_timestamp(updated_at.as_deref(), "updatedAt"),
        })
    }
}

fn answers_from_dtos(dtos: Vec<SavedAnswerDto>) -> Result<Vec<RawAnswerRecord>, IngestError> {
    dtos.into_iter().map(SavedAnswerDto::into_domain).collect()
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct HistoryEntryDto {
    #[serde(rename = "testId")]
    test_id: Option<NumOrText>,
    #[serde(rename = "TestId")]
    test_id_pascal: Option<NumOrText>,
    #[serde(rename = "testResultId")]
    test_result_id: Option<NumOrText>,
    #[serde(rename = "TestResultId")]
    test_result_id_pascal: Option<NumOrText>,
    #[serde(rename = "testSkill")]
    test_skill: Option<NumOrText>,
    #[serde(rename = "TestSkill")]
    test_skill_pascal: Option<NumOrText>,
    #[serde(rename = "testType")]
    test_type: Option<NumOrText>,
    #[serde(rename = "TestType")]
    test_type_pascal: Option<NumOrText>,
    #[serde(rename = "duration")]
    duration: Option<u32>,
    #[serde(rename = "Duration")]
    duration_pascal: Option<u32>,
    #[serde(rename = "totalQuestion")]
    total_question: Option<u32>,
    #[serde(rename = "TotalQuestion")]
    total_question_pascal: Option<u32>,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "CreatedAt")]
    created_at_pascal: Option<String>,
    #[serde(rename = "isSelectTime")]
    is_select_time: Option<bool>,
    #[serde(rename = "IsSelectTime")]
    is_select_time_pascal: Option<bool>,
}

impl HistoryEntryDto {
    /// A missing `isSelectTime` stays `None`; it is never defaulted here.
    fn into_domain(self) -> Result<SessionMetadata, IngestError> {
        let test_id = required_id(self.test_id.or(self.test_id_pascal).as_ref(), "testId")?;
        let test_result_id = required_id(
            self.test_result_id.or(self.test_result_id_pascal).as_ref(),
            "testResultId",
        )?;

        let raw_skill = self
            .test_skill
            .or(self.test_skill_pascal)
            .ok_or(IngestError::MissingField("testSkill"))?
            .as_label();
        let skill =
            TestSkill::from_label(&raw_skill).ok_or(IngestError::UnknownSkill(raw_skill))?;

        let test_type = match self.test_type.or(self.test_type_pascal) {
            Some(raw) => {
                let raw = raw.as_label();
                Some(TestType::from_label(&raw).ok_or(IngestError::UnknownTestType(raw))?)
            }
            None => None,
        };

        let raw_created = self
            .created_at
            .or(self.created_at_pascal)
            .ok_or(IngestError::MissingField("createdAt"))?;
        let created_at =
            parse_timestamp(&raw_created).ok_or_else(|| IngestError::InvalidTimestamp {
                field: "createdAt",
                raw: raw_created.clone(),
            })?;

        Ok(SessionMetadata {
            test_id: TestId::new(test_id),
            test_result_id: TestResultId::new(test_result_id),
            skill,
            test_type,
            duration_minutes: self.duration.or(self.duration_pascal).unwrap_or(0),
            total_questions: self.total_question.or(self.total_question_pascal).unwrap_or(0),
            select_time: self.is_select_time.or(self.is_select_time_pascal),
            created_at,
        })
    }
}

//
// ─── ENTRY POINTS ──────────────────────────────────────────────────────────────
//

/// Parses a `{ parts: [...] }` content payload.
///
/// # Errors
///
/// Returns `IngestError` on malformed JSON or unusable ids.
pub fn parse_test_definition(test_id: TestId, json: &str) -> Result<TestDefinition, IngestError> {
    let dto: StartTestDto = serde_json::from_str(json)?;
    definition_from_parts(test_id, dto.parts.or(dto.parts_pascal).unwrap_or_default())
}

/// Parses a JSON array of saved answers.
///
/// # Errors
///
/// Returns `IngestError` on malformed JSON or unusable ids.
pub fn parse_saved_answers(json: &str) -> Result<Vec<RawAnswerRecord>, IngestError> {
    let dtos: Vec<SavedAnswerDto> = serde_json::from_str(json)?;
    answers_from_dtos(dtos)
}

/// Parses a start/continue response carrying both content and saved answers.
///
/// # Errors
///
/// Returns `IngestError` on malformed JSON or unusable ids.
pub fn parse_start_response(
    test_id: TestId,
    json: &str,
) -> Result<(TestDefinition, Vec<RawAnswerRecord>), IngestError> {
    let dto: StartTestDto = serde_json::from_str(json)?;
    let definition =
        definition_from_parts(test_id, dto.parts.or(dto.parts_pascal).unwrap_or_default())?;
    let answers = answers_from_dtos(
        dto.saved_answers
            .or(dto.saved_answers_pascal)
            .unwrap_or_default(),
    )?;
    Ok((definition, answers))
}

/// Parses one history entry into session metadata.
///
/// # Errors
///
/// Returns `IngestError` on malformed JSON or missing required fields.
pub fn parse_history_entry(json: &str) -> Result<SessionMetadata, IngestError> {
    let dto: HistoryEntryDto = serde_json::from_str(json)?;
    dto.into_domain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{EntryShape, UnitKey};

    const CONTENT: &str = r#"{
        "parts": [
            {
                "partId": 3,
                "partName": "Conversations",
                "testQuestions": [
                    {
                        "testQuestionId": 31,
                        "isGroup": true,
                        "questionGroupSnapshotDto": {
                            "passage": "Listen to the conversation.",
                            "audioUrl": "https://cdn.example.com/p3/31.mp3",
                            "questionSnapshots": [
                                { "content": "Where are they?", "options": [
                                    { "label": "A", "content": "Office", "isCorrect": true },
                                    { "label": "B", "content": "Park", "isCorrect": false }
                                ]},
                                { "content": "Who is speaking?", "options": [] }
                            ]
                        }
                    }
                ]
            },
            {
                "PartId": "1",
                "PartName": "Photographs",
                "TestQuestions": [
                    {
                        "TestQuestionId": "11",
                        "IsGroup": false,
                        "QuestionSnapshotDto": {
                            "Content": "Look at the picture.",
                            "ImageUrl": "images/p1/11.png",
                            "Options": [{ "Label": "C", "Content": "A desk", "IsCorrect": true }]
                        }
                    },
                    { "testQuestionId": 12, "isGroup": true, "questionSnapshotDto": { "content": "?" } }
                ]
            }
        ]
    }"#;

    #[test]
    fn content_accepts_both_casings() {
        let def = parse_test_definition(TestId::new(5), CONTENT).unwrap();
        assert_eq!(def.parts.len(), 2);

        let p1 = &def.parts[1];
        assert_eq!(p1.id, PartId::new(1));
        assert_eq!(p1.name, "Photographs");
        let EntryShape::Single(q) = p1.entries[0].shape().unwrap() else {
            panic!("expected single entry");
        };
        assert_eq!(q.correct_label(), Some("C"));
        assert!(q.media.image.as_ref().unwrap().as_path().is_some());
    }

    #[test]
    fn group_payload_keeps_passage_and_media() {
        let def = parse_test_definition(TestId::new(5), CONTENT).unwrap();
        let EntryShape::Group(g) = def.parts[0].entries[0].shape().unwrap() else {
            panic!("expected group entry");
        };
        assert_eq!(g.passage.as_deref(), Some("Listen to the conversation."));
        assert!(g.media.audio.as_ref().unwrap().as_url().is_some());
        assert_eq!(g.questions.len(), 2);
        assert_eq!(g.questions[1].correct_label(), None);
    }

    #[test]
    fn inconsistent_entries_survive_ingestion_for_the_flattener() {
        let def = parse_test_definition(TestId::new(5), CONTENT).unwrap();
        let broken = &def.parts[1].entries[1];
        assert!(broken.is_group);
        assert!(broken.shape().is_none());
    }

    #[test]
    fn missing_entry_id_is_rejected() {
        let json = r#"{ "parts": [ { "partId": 1, "testQuestions": [ { "isGroup": false } ] } ] }"#;
        let err = parse_test_definition(TestId::new(1), json).unwrap_err();
        assert!(matches!(err, IngestError::MissingField("testQuestionId")));
    }

    #[test]
    fn saved_answers_normalize_fields_and_timestamps() {
        let json = r#"[
            { "testQuestionId": 31, "subQuestionIndex": 1, "chosenOptionLabel": "B",
              "createdAt": "2025-11-10T09:57:28.123", "updatedAt": "2025-11-10T10:00:00Z" },
            { "TestQuestionId": "11", "SubQuestionIndex": null, "AnswerText": "hello",
              "CreatedAt": "2025-11-10T09:00:00+07:00", "UpdatedAt": "not a date" }
        ]"#;
        let records = parse_saved_answers(json).unwrap();

        assert_eq!(records[0].key(), UnitKey::new(TestQuestionId::new(31), 1));
        assert_eq!(
            records[0].updated_at,
            parse_timestamp("2025-11-10T10:00:00Z")
        );
        assert!(records[0].created_at.is_some());

        assert_eq!(records[1].key(), UnitKey::new(TestQuestionId::new(11), 0));
        assert_eq!(records[1].answer_text.as_deref(), Some("hello"));
        assert_eq!(records[1].updated_at, None);
        assert_eq!(
            records[1].created_at,
            parse_timestamp("2025-11-10T02:00:00Z")
        );
    }

    #[test]
    fn start_response_splits_content_and_answers() {
        let json = r#"{
            "parts": [ { "partId": 5, "testQuestions": [
                { "testQuestionId": 1, "isGroup": false, "questionSnapshotDto": { "content": "Q" } } ] } ],
            "savedAnswers": [ { "testQuestionId": 1, "chosenOptionLabel": "A" } ]
        }"#;
        let (def, answers) = parse_start_response(TestId::new(2), json).unwrap();
        assert_eq!(def.test_id, TestId::new(2));
        assert_eq!(def.parts[0].entries.len(), 1);
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn history_entry_keeps_missing_timer_preference_absent() {
        let json = r#"{ "testId": 4, "testResultId": 77, "testSkill": "LR",
                        "duration": 120, "createdAt": "2025-11-10T09:00:00Z" }"#;
        let meta = parse_history_entry(json).unwrap();
        assert_eq!(meta.select_time, None);
        assert_eq!(meta.skill, TestSkill::ListeningReading);
        assert_eq!(meta.duration_minutes, 120);
        assert_eq!(meta.test_type, None);
    }

    #[test]
    fn history_entry_reads_pascal_case() {
        let json = r#"{ "TestId": 4, "TestResultId": "78", "TestSkill": 2, "TestType": "Practice",
                        "TotalQuestion": 8, "CreatedAt": "2025-11-10 09:00:00", "IsSelectTime": true }"#;
        let meta = parse_history_entry(json).unwrap();
        assert_eq!(meta.test_result_id, TestResultId::new(78));
        assert_eq!(meta.skill, TestSkill::Writing);
        assert_eq!(meta.test_type, Some(TestType::Practice));
        assert_eq!(meta.total_questions, 8);
        assert_eq!(meta.select_time, Some(true));
    }

    #[test]
    fn history_entry_with_both_spellings_prefers_camel_case() {
        let json = r#"{ "testId": 4, "TestId": 4, "testResultId": 77, "TestResultId": 99,
                        "testSkill": "LR", "TestSkill": "LR",
                        "createdAt": "2025-11-10T09:00:00Z", "CreatedAt": "2025-11-10T09:00:00Z",
                        "isSelectTime": false, "IsSelectTime": true }"#;
        let meta = parse_history_entry(json).unwrap();
        assert_eq!(meta.test_result_id, TestResultId::new(77));
        assert_eq!(meta.select_time, Some(false));
    }

    #[test]
    fn pascal_case_fills_in_when_camel_case_is_null() {
        let json = r#"{ "testId": 4, "testResultId": 77, "testSkill": 3,
                        "createdAt": "2025-11-10T09:00:00Z",
                        "isSelectTime": null, "IsSelectTime": true }"#;
        let meta = parse_history_entry(json).unwrap();
        assert_eq!(meta.select_time, Some(true));
    }

    #[test]
    fn saved_answer_and_content_accept_both_spellings() {
        let answers = parse_saved_answers(
            r#"[ { "testQuestionId": 5, "TestQuestionId": 5,
                   "chosenOptionLabel": "A", "ChosenOptionLabel": "B" } ]"#,
        )
        .unwrap();
        assert_eq!(answers[0].chosen_option_label.as_deref(), Some("A"));

        let def = parse_test_definition(
            TestId::new(1),
            r#"{ "parts": [ { "partId": 2, "PartId": 9, "testQuestions": [
                   { "testQuestionId": 1, "isGroup": false, "IsGroup": false,
                     "questionSnapshotDto": { "content": "Q", "Content": "Q" } } ] } ] }"#,
        )
        .unwrap();
        assert_eq!(def.parts[0].id, PartId::new(2));
        assert_eq!(def.parts[0].entries.len(), 1);
    }

    #[test]
    fn history_entry_requires_created_at_and_known_skill() {
        let missing = r#"{ "testId": 1, "testResultId": 2, "testSkill": 3 }"#;
        assert!(matches!(
            parse_history_entry(missing),
            Err(IngestError::MissingField("createdAt"))
        ));

        let unknown = r#"{ "testId": 1, "testResultId": 2, "testSkill": "Chess",
                           "createdAt": "2025-11-10T09:00:00Z" }"#;
        assert!(matches!(
            parse_history_entry(unknown),
            Err(IngestError::UnknownSkill(_))
        ));
    }

    #[test]
    fn timestamps_parse_leniently() {
        assert!(parse_timestamp("2025-11-10T09:57:28").is_some());
        assert!(parse_timestamp("2025-11-10T09:57:28.5+00:00").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
