//! Composes flattened content, reconciled answers and attempt metadata into a
//! resumable [`SessionState`].

use tracing::warn;

use crate::error::AssemblyError;
use crate::flatten::Flattened;
use crate::model::{ReconciledAnswers, SessionMetadata, SessionState, TimerMode};

/// Builds the session state for an attempt.
///
/// The timer mode comes only from the preference captured at first start, and
/// the attempt id and start instant are carried over unchanged so elapsed time
/// stays anchored at the real start.
///
/// # Errors
///
/// Returns `AssemblyError::MissingTimerPreference` if the metadata has no timer
/// preference, and `AssemblyError::EmptyContent` if flattening produced no units.
pub fn assemble(
    metadata: &SessionMetadata,
    flattened: Flattened,
    answers: ReconciledAnswers,
) -> Result<SessionState, AssemblyError> {
    let select_time = metadata
        .select_time
        .ok_or(AssemblyError::MissingTimerPreference {
            test_result_id: metadata.test_result_id,
        })?;

    if flattened.is_empty() {
        return Err(AssemblyError::EmptyContent {
            test_result_id: metadata.test_result_id,
        });
    }

    let declared = usize::try_from(metadata.total_questions).unwrap_or(usize::MAX);
    if declared != 0 && declared != flattened.units.len() {
        warn!(
            test_result_id = %metadata.test_result_id,
            declared,
            flattened = flattened.units.len(),
            "declared question count differs from flattened content"
        );
    }

    Ok(SessionState {
        test_id: metadata.test_id,
        test_result_id: metadata.test_result_id,
        skill: metadata.skill,
        test_type: metadata.test_type,
        timer_mode: TimerMode::from_preference(select_time),
        duration_minutes: metadata.duration_minutes,
        total_questions: metadata.total_questions,
        original_created_at: metadata.created_at,
        units: flattened.units,
        answers,
    })
}
