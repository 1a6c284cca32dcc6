#![forbid(unsafe_code)]

pub mod error;
pub mod resume;
pub mod settings;

pub use exam_core::Clock;

pub use error::{ResumeError, SettingsError};
pub use resume::{ResumeService, ResumedSession};
pub use settings::ResumeSettings;
