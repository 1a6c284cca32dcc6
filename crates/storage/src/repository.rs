use async_trait::async_trait;
use exam_core::model::{
    RawAnswerRecord, SessionState, TestDefinition, TestId, TestResultId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::wire::{self, IngestError};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<IngestError> for StorageError {
    fn from(err: IngestError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Read access to test content.
#[async_trait]
pub trait TestContentRepository: Send + Sync {
    /// Fetch the full definition of a test.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the test is unknown, or other storage errors.
    async fn fetch_test_definition(&self, test_id: TestId) -> Result<TestDefinition, StorageError>;
}

/// Read access to the append-only answer history of an attempt.
#[async_trait]
pub trait AnswerHistoryRepository: Send + Sync {
    /// Fetch every saved write for an attempt, in the order they were stored.
    ///
    /// An attempt with no writes yields an empty list, not `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    async fn fetch_raw_answers(
        &self,
        test_result_id: TestResultId,
    ) -> Result<Vec<RawAnswerRecord>, StorageError>;
}

/// Persistence for assembled session snapshots.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist or replace the snapshot for `state.test_result_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_session(&self, state: &SessionState) -> Result<(), StorageError>;

    /// Load a previously saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was saved, or other storage errors.
    async fn load_session(&self, test_result_id: TestResultId)
    -> Result<SessionState, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Sessions are kept as serialized JSON so loads exercise the same encoding a
/// durable store would.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    definitions: Arc<Mutex<HashMap<TestId, TestDefinition>>>,
    answers: Arc<Mutex<HashMap<TestResultId, Vec<RawAnswerRecord>>>>,
    sessions: Arc<Mutex<HashMap<TestResultId, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a test definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_definition(&self, definition: TestDefinition) -> Result<(), StorageError> {
        let mut guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(definition.test_id, definition);
        Ok(())
    }

    /// Append one answer write to an attempt's history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn append_answer(
        &self,
        test_result_id: TestResultId,
        record: RawAnswerRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .answers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(test_result_id).or_default().push(record);
        Ok(())
    }

    /// Seed content and answer history from a start/continue wire payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the payload cannot be ingested.
    pub fn ingest_start_response(
        &self,
        test_id: TestId,
        test_result_id: TestResultId,
        json: &str,
    ) -> Result<(), StorageError> {
        let (definition, records) = wire::parse_start_response(test_id, json)?;
        self.insert_definition(definition)?;
        for record in records {
            self.append_answer(test_result_id, record)?;
        }
        Ok(())
    }
}

#[async_trait]
impl TestContentRepository for InMemoryRepository {
    async fn fetch_test_definition(&self, test_id: TestId) -> Result<TestDefinition, StorageError> {
        let guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&test_id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AnswerHistoryRepository for InMemoryRepository {
    async fn fetch_raw_answers(
        &self,
        test_result_id: TestResultId,
    ) -> Result<Vec<RawAnswerRecord>, StorageError> {
        let guard = self
            .answers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&test_result_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn save_session(&self, state: &SessionState) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(state)?;
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(state.test_result_id, encoded);
        Ok(())
    }

    async fn load_session(
        &self,
        test_result_id: TestResultId,
    ) -> Result<SessionState, StorageError> {
        let encoded = {
            let guard = self
                .sessions
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard
                .get(&test_result_id)
                .cloned()
                .ok_or(StorageError::NotFound)?
        };
        Ok(serde_json::from_str(&encoded)?)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn TestContentRepository>,
    pub answers: Arc<dyn AnswerHistoryRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wraps one shared in-memory repository so seeded data stays visible.
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let content: Arc<dyn TestContentRepository> = Arc::new(repo.clone());
        let answers: Arc<dyn AnswerHistoryRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionStore> = Arc::new(repo);
        Self {
            content,
            answers,
            sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{
        AnswerOption, Part, PartId, QuestionSnapshot, SectionMap, SessionMetadata, TestQuestionEntry,
        TestQuestionId, TestSkill,
    };
    use exam_core::time::fixed_now;
    use exam_core::{Flattener, Reconciler, assemble};

    fn build_definition(id: u64) -> TestDefinition {
        let entry = TestQuestionEntry::single(
            TestQuestionId::new(1),
            QuestionSnapshot::new("Q", vec![AnswerOption::new("A", "a", true)]),
        );
        TestDefinition::new(
            TestId::new(id),
            vec![Part::new(PartId::new(1), "Part 1", vec![entry])],
        )
    }

    fn build_state(repo_def: &TestDefinition, records: &[RawAnswerRecord]) -> SessionState {
        let metadata = SessionMetadata {
            test_id: repo_def.test_id,
            test_result_id: TestResultId::new(9),
            skill: TestSkill::ListeningReading,
            test_type: None,
            duration_minutes: 10,
            total_questions: 1,
            select_time: Some(true),
            created_at: fixed_now(),
        };
        let flattened = Flattener::new(&SectionMap::toeic()).flatten(repo_def);
        let answers = Reconciler::new().reconcile(records);
        assemble(&metadata, flattened, answers).unwrap()
    }

    #[tokio::test]
    async fn unknown_test_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.fetch_test_definition(TestId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn answer_history_keeps_append_order() {
        let repo = InMemoryRepository::new();
        let id = TestResultId::new(3);
        repo.append_answer(id, RawAnswerRecord::new(TestQuestionId::new(1), None).with_option("A"))
            .unwrap();
        repo.append_answer(id, RawAnswerRecord::new(TestQuestionId::new(1), None).with_option("B"))
            .unwrap();

        let records = repo.fetch_raw_answers(id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].chosen_option_label.as_deref(), Some("B"));

        let none = repo.fetch_raw_answers(TestResultId::new(4)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn session_snapshot_round_trips_through_json() {
        let repo = InMemoryRepository::new();
        let def = build_definition(2);
        let state = build_state(
            &def,
            &[RawAnswerRecord::new(TestQuestionId::new(1), None)
                .with_option("A")
                .updated(fixed_now())],
        );

        repo.save_session(&state).await.unwrap();
        let loaded = repo.load_session(state.test_result_id).await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.load_session(TestResultId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn start_payload_seeds_content_and_history() {
        let repo = InMemoryRepository::new();
        let json = r#"{
            "parts": [ { "partId": 1, "testQuestions": [
                { "testQuestionId": 1, "isGroup": false,
                  "questionSnapshotDto": { "content": "Q", "options": [ { "label": "A", "isCorrect": true } ] } } ] } ],
            "savedAnswers": [ { "testQuestionId": 1, "chosenOptionLabel": "A" } ]
        }"#;
        repo.ingest_start_response(TestId::new(6), TestResultId::new(60), json)
            .unwrap();

        let storage = Storage::from_repository(repo);
        let def = storage.content.fetch_test_definition(TestId::new(6)).await.unwrap();
        assert_eq!(def.parts.len(), 1);
        let records = storage
            .answers
            .fetch_raw_answers(TestResultId::new(60))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        let err = repo
            .ingest_start_response(TestId::new(1), TestResultId::new(1), "{ not json")
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
