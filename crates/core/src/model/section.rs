use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::PartId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionMapError {
    #[error("section entry `{0}` must look like `tag=start-end`")]
    MalformedEntry(String),

    #[error("section tag cannot be empty")]
    EmptyTag,

    #[error("invalid part id `{0}` in section range")]
    InvalidPartId(String),

    #[error("section range {start}-{end} is reversed")]
    ReversedRange { start: u64, end: u64 },
}

/// Name of a reporting section (e.g. `listening`, `reading`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionTag(String);

impl SectionTag {
    /// Tag assigned to parts no declared range covers.
    pub const OTHER: &'static str = "other";

    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn other() -> Self {
        Self(Self::OTHER.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_other(&self) -> bool {
        self.0 == Self::OTHER
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub tag: SectionTag,
    pub start: u64,
    pub end: u64,
}

impl SectionRange {
    fn contains(&self, part: PartId) -> bool {
        (self.start..=self.end).contains(&part.value())
    }
}

/// Ordered mapping from part-id ranges to section tags.
///
/// The first range containing a part id wins. Part ids no range covers map to
/// [`SectionTag::OTHER`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap {
    ranges: Vec<SectionRange>,
}

impl SectionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard TOEIC layout: listening 1-4, reading 5-7, writing 8-10, speaking 11-15.
    #[must_use]
    pub fn toeic() -> Self {
        Self::new()
            .with_range("listening", 1..=4)
            .with_range("reading", 5..=7)
            .with_range("writing", 8..=10)
            .with_range("speaking", 11..=15)
    }

    #[must_use]
    pub fn with_range(mut self, tag: impl Into<String>, parts: RangeInclusive<u64>) -> Self {
        self.ranges.push(SectionRange {
            tag: SectionTag::new(tag),
            start: *parts.start(),
            end: *parts.end(),
        });
        self
    }

    #[must_use]
    pub fn tag_for(&self, part: PartId) -> SectionTag {
        self.ranges
            .iter()
            .find(|r| r.contains(part))
            .map_or_else(SectionTag::other, |r| r.tag.clone())
    }

    /// Declared tags in declaration order, without duplicates.
    #[must_use]
    pub fn declared(&self) -> Vec<SectionTag> {
        let mut tags: Vec<SectionTag> = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            if !tags.contains(&range.tag) {
                tags.push(range.tag.clone());
            }
        }
        tags
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl FromStr for SectionMap {
    type Err = SectionMapError;

    /// Parses `listening=1-4,reading=5-7`; a single id (`essay=10`) is a one-part range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut map = SectionMap::new();
        for entry in s.split([',', ';']).map(str::trim).filter(|e| !e.is_empty()) {
            let (tag, range) = entry
                .split_once('=')
                .ok_or_else(|| SectionMapError::MalformedEntry(entry.to_string()))?;
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(SectionMapError::EmptyTag);
            }
            let (start, end) = match range.split_once('-') {
                Some((start, end)) => (parse_part(start)?, parse_part(end)?),
                None => {
                    let id = parse_part(range)?;
                    (id, id)
                }
            };
            if start > end {
                return Err(SectionMapError::ReversedRange { start, end });
            }
            map = map.with_range(tag, start..=end);
        }
        Ok(map)
    }
}

fn parse_part(raw: &str) -> Result<u64, SectionMapError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| SectionMapError::InvalidPartId(raw.trim().to_string()))
}
