//! Per-session conversion metadata
//!
//! Each session gets a metadata record before conversion: a description, a
//! unique identifier, the session start time, and the version of the
//! segmentation tool that produced the syllables. Callers usually start from
//! `ConversionMetadata::for_session` and override what they know.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to one session's output file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionMetadata {
    /// Free-text description of the session
    pub session_description: String,
    /// Unique identifier for the output file
    pub identifier: String,
    /// Recording start time (UTC)
    pub session_start_time: DateTime<Utc>,
    /// Syllable-detection provenance
    pub syllable: SyllableMetadata,
}

/// Provenance of the syllable segmentation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyllableMetadata {
    /// Version of the keypoint-MoSeq release that produced the results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpms_version: Option<String>,
}

impl ConversionMetadata {
    /// Default metadata for a session: generated identifier, templated
    /// description, conversion time as start time.
    pub fn for_session(session_name: &str) -> Self {
        Self {
            session_description: format!(
                "Behavioral syllables inferred for session {session_name}."
            ),
            identifier: Uuid::new_v4().to_string(),
            session_start_time: Utc::now(),
            syllable: SyllableMetadata::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.session_description = description.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.session_start_time = start_time;
        self
    }

    pub fn with_kpms_version(mut self, version: impl Into<String>) -> Self {
        self.syllable.kpms_version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_mention_session() {
        let metadata = ConversionMetadata::for_session("sess_7");

        assert!(metadata.session_description.contains("sess_7"));
        assert!(metadata.syllable.kpms_version.is_none());
        // Identifier is a parseable UUID
        Uuid::parse_str(&metadata.identifier).unwrap();
    }

    #[test]
    fn test_identifiers_are_unique() {
        let a = ConversionMetadata::for_session("s");
        let b = ConversionMetadata::for_session("s");
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_overrides() {
        let start = "2024-03-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let metadata = ConversionMetadata::for_session("s")
            .with_description("open field, day 2")
            .with_identifier("subj01-day2")
            .with_start_time(start)
            .with_kpms_version("0.4.5");

        assert_eq!(metadata.session_description, "open field, day 2");
        assert_eq!(metadata.identifier, "subj01-day2");
        assert_eq!(metadata.session_start_time, start);
        assert_eq!(metadata.syllable.kpms_version.as_deref(), Some("0.4.5"));
    }
}
