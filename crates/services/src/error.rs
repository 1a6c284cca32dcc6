//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::AssemblyError;
use exam_core::model::SectionMapError;
use storage::repository::StorageError;
use storage::wire::IngestError;

/// Errors emitted by `ResumeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResumeError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Errors emitted while reading `ResumeSettings` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid {var}: {source}")]
    SectionMap {
        var: &'static str,
        #[source]
        source: SectionMapError,
    },
    #[error("invalid {var}: `{value}` is not a boolean")]
    InvalidFlag { var: &'static str, value: String },
}
