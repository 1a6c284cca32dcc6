//! Storage boundary for exam sessions: repository traits, an in-memory
//! backend, and the wire ingestion adapter.

#![forbid(unsafe_code)]

pub mod repository;
pub mod wire;

pub use repository::{
    AnswerHistoryRepository, InMemoryRepository, SessionStore, Storage, StorageError,
    TestContentRepository,
};
pub use wire::IngestError;
