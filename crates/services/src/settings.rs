use std::env;

use exam_core::EmptyWritePolicy;
use exam_core::model::SectionMap;

use crate::error::SettingsError;

const SECTION_MAP_VAR: &str = "EXAM_SECTION_MAP";
const CLEAR_ON_EMPTY_WRITE_VAR: &str = "EXAM_CLEAR_ON_EMPTY_WRITE";

/// Tunables for rebuilding sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSettings {
    pub section_map: SectionMap,
    pub empty_write_policy: EmptyWritePolicy,
}

impl Default for ResumeSettings {
    fn default() -> Self {
        Self {
            section_map: SectionMap::toeic(),
            empty_write_policy: EmptyWritePolicy::Ignore,
        }
    }
}

impl ResumeSettings {
    #[must_use]
    pub fn with_section_map(mut self, section_map: SectionMap) -> Self {
        self.section_map = section_map;
        self
    }

    #[must_use]
    pub fn with_empty_write_policy(mut self, policy: EmptyWritePolicy) -> Self {
        self.empty_write_policy = policy;
        self
    }

    /// Reads `EXAM_SECTION_MAP` and `EXAM_CLEAR_ON_EMPTY_WRITE`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ResumeSettings::from_env`], reading values through `lookup`.
    ///
    /// Unset or blank values keep the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = read(SECTION_MAP_VAR) {
            settings.section_map =
                raw.parse()
                    .map_err(|source| SettingsError::SectionMap {
                        var: SECTION_MAP_VAR,
                        source,
                    })?;
        }

        if let Some(raw) = read(CLEAR_ON_EMPTY_WRITE_VAR) {
            settings.empty_write_policy = if parse_flag(CLEAR_ON_EMPTY_WRITE_VAR, &raw)? {
                EmptyWritePolicy::Clear
            } else {
                EmptyWritePolicy::Ignore
            };
        }

        Ok(settings)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            var,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::PartId;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let settings = ResumeSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ResumeSettings::default());
        assert_eq!(settings.section_map, SectionMap::toeic());
    }

    #[test]
    fn section_map_and_policy_are_read() {
        let settings = ResumeSettings::from_lookup(lookup(&[
            ("EXAM_SECTION_MAP", "listening=1-2, reading=3"),
            ("EXAM_CLEAR_ON_EMPTY_WRITE", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(settings.section_map.tag_for(PartId::new(3)).as_str(), "reading");
        assert!(settings.section_map.tag_for(PartId::new(4)).is_other());
        assert_eq!(settings.empty_write_policy, EmptyWritePolicy::Clear);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = ResumeSettings::from_lookup(lookup(&[("EXAM_SECTION_MAP", "listening")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::SectionMap { .. }));

        let err = ResumeSettings::from_lookup(lookup(&[("EXAM_CLEAR_ON_EMPTY_WRITE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidFlag { .. }));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let settings =
            ResumeSettings::from_lookup(lookup(&[("EXAM_CLEAR_ON_EMPTY_WRITE", "  ")])).unwrap();
        assert_eq!(settings.empty_write_policy, EmptyWritePolicy::Ignore);
    }
}
