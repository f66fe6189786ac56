//! Output file encoding
//!
//! The encoder builds the header blocks of a behavior file (producer,
//! provenance, file metadata) and serializes completed files to JSON. Data
//! containers are added by the interfaces, not here.

use crate::error::ConvertError;
use crate::metadata::ConversionMetadata;
use crate::types::{
    BehaviorFile, FileMetadata, Producer, Provenance, OUTPUT_SCHEMA_VERSION, SOURCE_SOFTWARE,
};
use crate::{BRIDGE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Encoder for standardized behavior files
pub struct FileEncoder {
    instance_id: String,
}

impl Default for FileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FileEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the file shell for one session: header blocks filled in, no
    /// containers yet.
    pub fn begin_file(
        &self,
        project_dir: &Path,
        model_name: &str,
        session_name: &str,
        metadata: &ConversionMetadata,
    ) -> BehaviorFile {
        let producer = Producer {
            name: PRODUCER_NAME.to_string(),
            version: BRIDGE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = Provenance {
            project_dir: project_dir.display().to_string(),
            model_name: model_name.to_string(),
            session_name: session_name.to_string(),
            source_software: SOURCE_SOFTWARE.to_string(),
            source_software_version: metadata.syllable.kpms_version.clone(),
            converted_at_utc: Utc::now().to_rfc3339(),
        };

        let file_metadata = FileMetadata {
            identifier: metadata.identifier.clone(),
            session_description: metadata.session_description.clone(),
            session_start_time: metadata.session_start_time,
        };

        BehaviorFile {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            producer,
            provenance,
            metadata: file_metadata,
            frame_timestamps: Vec::new(),
            processing: Vec::new(),
        }
    }

    /// Serialize a completed file to pretty JSON
    pub fn to_json(&self, file: &BehaviorFile) -> Result<String, ConvertError> {
        serde_json::to_string_pretty(file).map_err(ConvertError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_begin_file_header() {
        let metadata = ConversionMetadata::for_session("sess_1")
            .with_identifier("subj01")
            .with_kpms_version("0.4.5");
        let encoder = FileEncoder::with_instance_id("test-instance".to_string());

        let file = encoder.begin_file(Path::new("/proj"), "model_a", "sess_1", &metadata);

        assert_eq!(file.schema_version, OUTPUT_SCHEMA_VERSION);
        assert_eq!(file.producer.name, PRODUCER_NAME);
        assert_eq!(file.producer.version, BRIDGE_VERSION);
        assert_eq!(file.producer.instance_id, "test-instance");
        assert_eq!(file.provenance.model_name, "model_a");
        assert_eq!(file.provenance.session_name, "sess_1");
        assert_eq!(file.provenance.source_software, SOURCE_SOFTWARE);
        assert_eq!(
            file.provenance.source_software_version.as_deref(),
            Some("0.4.5")
        );
        assert_eq!(file.metadata.identifier, "subj01");
        assert!(file.processing.is_empty());
    }

    #[test]
    fn test_to_json_is_valid() {
        let metadata = ConversionMetadata::for_session("sess_1");
        let encoder = FileEncoder::new();
        let file = encoder.begin_file(Path::new("/proj"), "m", "sess_1", &metadata);

        let json = encoder.to_json(&file).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("schema_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("metadata").is_some());
    }
}
