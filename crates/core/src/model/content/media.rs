use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    #[error("Media URI cannot be empty.")]
    EmptyMediaUri,
}

//
// ─── MEDIA REFERENCE ───────────────────────────────────────────────────────────
//

/// Location of an image or audio asset referenced by test content.
///
/// Absolute URLs (CDN, object storage) parse as `Url`; anything else is kept as
/// a relative file path resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaUri {
    FilePath(PathBuf),
    Url(Url),
}

impl MediaUri {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, MediaValidationError> {
        let p = path.into();
        if p.as_os_str().is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        Ok(MediaUri::FilePath(p))
    }

    pub fn from_url(url: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = url.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        let u = Url::parse(s).map_err(|_| MediaValidationError::EmptyMediaUri)?;
        Ok(MediaUri::Url(u))
    }

    /// Parses a raw reference, preferring an absolute URL and falling back to a path.
    ///
    /// # Errors
    ///
    /// Returns `MediaValidationError::EmptyMediaUri` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        match Url::parse(s) {
            Ok(u) => Ok(MediaUri::Url(u)),
            Err(_) => Self::from_file(s),
        }
    }

    /// Like [`MediaUri::parse`] but maps blank or missing input to `None`.
    #[must_use]
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| Self::parse(s).ok())
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaUri::FilePath(p) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaUri::Url(u) => Some(u),
            _ => None,
        }
    }
}

/// Optional image and audio attached to a question or a question group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    pub image: Option<MediaUri>,
    pub audio: Option<MediaUri>,
}

impl MediaRefs {
    #[must_use]
    pub fn new(image: Option<MediaUri>, audio: Option<MediaUri>) -> Self {
        Self { image, audio }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.audio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_parse_as_url() {
        let uri = MediaUri::parse("https://cdn.example.com/audio/p1.mp3").unwrap();
        assert!(uri.as_url().is_some());
    }

    #[test]
    fn relative_refs_fall_back_to_paths() {
        let uri = MediaUri::parse("images/part1/q3.png").unwrap();
        assert_eq!(uri.as_path(), Some(Path::new("images/part1/q3.png")));
    }

    #[test]
    fn blank_refs_are_rejected() {
        assert_eq!(
            MediaUri::parse("   ").unwrap_err(),
            MediaValidationError::EmptyMediaUri
        );
        assert!(MediaUri::parse_optional(Some("")).is_none());
        assert!(MediaUri::parse_optional(None).is_none());
    }
}
