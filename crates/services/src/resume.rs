use std::sync::Arc;

use exam_core::model::{SessionMetadata, SessionState, TestId, TestResultId, TimerReading};
use exam_core::{
    Clock, Flattener, MalformedEntry, ProgressSummary, Reconciler, assemble, progress,
};
use storage::repository::{
    AnswerHistoryRepository, SessionStore, Storage, TestContentRepository,
};
use storage::wire;
use tracing::info;

use crate::error::ResumeError;
use crate::settings::ResumeSettings;

/// Result of rebuilding a session: the state plus what a caller shows first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumedSession {
    pub state: SessionState,
    pub progress: ProgressSummary,
    pub timer: TimerReading,
    /// Entries dropped while flattening.
    pub malformed: Vec<MalformedEntry>,
}

/// Rebuilds sessions from scratch on every trigger and hands them to the store.
///
/// Nothing is cached between calls; resume, manual save and autosave all
/// fetch fresh inputs and run the full pipeline.
#[derive(Clone)]
pub struct ResumeService {
    clock: Clock,
    content: Arc<dyn TestContentRepository>,
    answers: Arc<dyn AnswerHistoryRepository>,
    sessions: Arc<dyn SessionStore>,
    settings: ResumeSettings,
}

impl ResumeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn TestContentRepository>,
        answers: Arc<dyn AnswerHistoryRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            clock,
            content,
            answers,
            sessions,
            settings: ResumeSettings::default(),
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.content),
            Arc::clone(&storage.answers),
            Arc::clone(&storage.sessions),
        )
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ResumeSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ResumeSettings {
        &self.settings
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new().with_empty_write_policy(self.settings.empty_write_policy)
    }

    async fn rebuild(
        &self,
        metadata: &SessionMetadata,
    ) -> Result<(SessionState, Vec<MalformedEntry>), ResumeError> {
        let definition = self
            .content
            .fetch_test_definition(metadata.test_id)
            .await?;
        let records = self
            .answers
            .fetch_raw_answers(metadata.test_result_id)
            .await?;

        let flattened = Flattener::new(&self.settings.section_map).flatten(&definition);
        let malformed = flattened.malformed.clone();
        let answers = self.reconciler().reconcile(&records);
        let state = assemble(metadata, flattened, answers)?;
        Ok((state, malformed))
    }

    /// Rebuild and persist the session for an unfinished attempt.
    ///
    /// The attempt keeps its original id, timer mode and start instant.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Assembly` if the attempt cannot be resumed safely,
    /// or `ResumeError::Storage` for fetch/save failures.
    #[tracing::instrument(skip(self, metadata), fields(test_result_id = %metadata.test_result_id))]
    pub async fn resume(&self, metadata: &SessionMetadata) -> Result<ResumedSession, ResumeError> {
        let (state, malformed) = self.rebuild(metadata).await?;
        self.sessions.save_session(&state).await?;

        let now = self.clock.now();
        let timer = state.timer_at(now);
        let progress = state.progress(&self.settings.section_map);
        info!(
            units = state.unit_count(),
            answered = progress.overall.answered,
            malformed = malformed.len(),
            timer_mode = ?state.timer_mode,
            expired = timer.expired,
            "session resumed"
        );

        Ok(ResumedSession {
            state,
            progress,
            timer,
            malformed,
        })
    }

    /// Resume from a raw history entry as sent by the history service.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Ingest` if the entry cannot be parsed, otherwise
    /// the same errors as [`ResumeService::resume`].
    pub async fn resume_history_entry(&self, json: &str) -> Result<ResumedSession, ResumeError> {
        let metadata = wire::parse_history_entry(json)?;
        self.resume(&metadata).await
    }

    /// Persist an already assembled state.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Storage` if the store rejects the snapshot.
    #[tracing::instrument(skip(self, state), fields(test_result_id = %state.test_result_id))]
    pub async fn save(&self, state: &SessionState) -> Result<(), ResumeError> {
        self.sessions.save_session(state).await?;
        info!(answers = state.answers.len(), "session saved");
        Ok(())
    }

    /// Autosave/manual-save trigger: rebuild from fresh inputs, then store.
    ///
    /// # Errors
    ///
    /// Same as [`ResumeService::resume`].
    #[tracing::instrument(skip(self, metadata), fields(test_result_id = %metadata.test_result_id))]
    pub async fn checkpoint(&self, metadata: &SessionMetadata) -> Result<SessionState, ResumeError> {
        let (state, _malformed) = self.rebuild(metadata).await?;
        self.sessions.save_session(&state).await?;
        info!(answers = state.answers.len(), "session checkpointed");
        Ok(state)
    }

    /// Load the last stored snapshot without rebuilding.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Storage`, including `NotFound` when nothing was saved.
    pub async fn load(&self, test_result_id: TestResultId) -> Result<SessionState, ResumeError> {
        Ok(self.sessions.load_session(test_result_id).await?)
    }

    /// Progress for a result detail view. Needs no timer preference.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Storage` if the inputs cannot be fetched.
    #[tracing::instrument(skip(self))]
    pub async fn progress(
        &self,
        test_id: TestId,
        test_result_id: TestResultId,
    ) -> Result<ProgressSummary, ResumeError> {
        let definition = self.content.fetch_test_definition(test_id).await?;
        let records = self.answers.fetch_raw_answers(test_result_id).await?;

        let flattened = Flattener::new(&self.settings.section_map).flatten(&definition);
        let answers = self.reconciler().reconcile(&records);
        Ok(progress(
            &flattened.units,
            &answers,
            &self.settings.section_map,
        ))
    }
}
