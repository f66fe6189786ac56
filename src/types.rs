//! Output document model
//!
//! This module defines the standardized behavior file written once per
//! session: header blocks (producer, provenance, file metadata), the shared
//! frame timestamps, and the processing modules holding behavior containers.
//! Frame-aligned series share the file-level timestamps; labeled events carry
//! their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version stamped into every output file
pub const OUTPUT_SCHEMA_VERSION: &str = "nwb-behavior.v1";

/// Name of the tool whose results this crate imports
pub const SOURCE_SOFTWARE: &str = "keypoint-moseq";

/// Converter identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where the session's data came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub project_dir: String,
    pub model_name: String,
    pub session_name: String,
    pub source_software: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_software_version: Option<String>,
    pub converted_at_utc: String,
}

/// File-level session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub identifier: String,
    pub session_description: String,
    pub session_start_time: DateTime<Utc>,
}

/// One session's standardized behavior file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorFile {
    pub schema_version: String,
    pub producer: Producer,
    pub provenance: Provenance,
    pub metadata: FileMetadata,
    /// Timestamps in seconds shared by all frame-aligned series
    pub frame_timestamps: Vec<f64>,
    pub processing: Vec<ProcessingModule>,
}

impl BehaviorFile {
    /// Get a processing module by name, creating it if absent.
    pub fn module_mut(&mut self, name: &str, description: &str) -> &mut ProcessingModule {
        let idx = match self.processing.iter().position(|m| m.name == name) {
            Some(idx) => idx,
            None => {
                self.processing.push(ProcessingModule {
                    name: name.to_string(),
                    description: description.to_string(),
                    containers: Vec::new(),
                });
                self.processing.len() - 1
            }
        };
        &mut self.processing[idx]
    }

    pub fn module(&self, name: &str) -> Option<&ProcessingModule> {
        self.processing.iter().find(|m| m.name == name)
    }
}

/// Named group of behavior containers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingModule {
    pub name: String,
    pub description: String,
    pub containers: Vec<BehaviorContainer>,
}

impl ProcessingModule {
    pub fn add(&mut self, container: BehaviorContainer) {
        self.containers.push(container);
    }

    pub fn container(&self, name: &str) -> Option<&BehaviorContainer> {
        self.containers.iter().find(|c| c.name() == name)
    }
}

/// A data container inside a processing module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "neurodata_type")]
pub enum BehaviorContainer {
    Position(Position),
    CompassDirection(CompassDirection),
    PoseEstimation(PoseEstimation),
    TimeSeries(TimeSeries),
    LabeledEvents(LabeledEvents),
}

impl BehaviorContainer {
    pub fn name(&self) -> &str {
        match self {
            BehaviorContainer::Position(c) => &c.name,
            BehaviorContainer::CompassDirection(c) => &c.name,
            BehaviorContainer::PoseEstimation(c) => &c.name,
            BehaviorContainer::TimeSeries(c) => &c.name,
            BehaviorContainer::LabeledEvents(c) => &c.name,
        }
    }
}

/// 2-D position container wrapping one spatial series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub name: String,
    pub series: SpatialSeries,
}

/// Heading container wrapping one angular series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompassDirection {
    pub name: String,
    pub series: AngularSeries,
}

/// Frame-aligned (x, y) series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialSeries {
    pub name: String,
    pub description: String,
    pub data: Vec<[f64; 2]>,
    pub unit: String,
    pub reference_frame: String,
}

/// Frame-aligned scalar angle series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngularSeries {
    pub name: String,
    pub description: String,
    pub data: Vec<f64>,
    pub unit: String,
    pub reference_frame: String,
}

/// Estimated pose: one series per bodypart plus the skeleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEstimation {
    pub name: String,
    pub description: String,
    /// Model that scored the keypoints
    pub scorer: String,
    pub source_software: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_software_version: Option<String>,
    /// Bodypart names, in series order
    pub nodes: Vec<String>,
    /// Skeleton bones as index pairs into `nodes`
    pub edges: Vec<[usize; 2]>,
    pub series: Vec<PoseSeries>,
}

/// Frame-aligned (x, y) series for one bodypart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSeries {
    pub name: String,
    pub description: String,
    pub data: Vec<[f64; 2]>,
    pub unit: String,
    pub reference_frame: String,
}

/// Generic frame-aligned multi-channel series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub description: String,
    pub data: Vec<Vec<f64>>,
    pub unit: String,
}

/// Discrete labeled events with their own timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledEvents {
    pub name: String,
    pub description: String,
    /// Event times in seconds
    pub timestamps: Vec<f64>,
    /// Label index of each event
    pub data: Vec<u32>,
    /// Display name per label index
    pub labels: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_file() -> BehaviorFile {
        BehaviorFile {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            producer: Producer {
                name: "test".to_string(),
                version: "0.0.0".to_string(),
                instance_id: "i".to_string(),
            },
            provenance: Provenance {
                project_dir: "/p".to_string(),
                model_name: "m".to_string(),
                session_name: "s".to_string(),
                source_software: SOURCE_SOFTWARE.to_string(),
                source_software_version: None,
                converted_at_utc: "2024-01-01T00:00:00Z".to_string(),
            },
            metadata: FileMetadata {
                identifier: "id".to_string(),
                session_description: "d".to_string(),
                session_start_time: Utc::now(),
            },
            frame_timestamps: vec![0.0, 0.1],
            processing: Vec::new(),
        }
    }

    #[test]
    fn test_module_mut_creates_once() {
        let mut file = make_file();

        file.module_mut("behavior", "Processed behavioral data");
        file.module_mut("behavior", "ignored on second call")
            .add(BehaviorContainer::TimeSeries(TimeSeries {
                name: "latents".to_string(),
                description: String::new(),
                data: vec![],
                unit: "n/a".to_string(),
            }));

        assert_eq!(file.processing.len(), 1);
        assert_eq!(
            file.module("behavior").unwrap().description,
            "Processed behavioral data"
        );
        assert!(file.module("behavior").unwrap().container("latents").is_some());
    }

    #[test]
    fn test_container_tagging() {
        let container = BehaviorContainer::LabeledEvents(LabeledEvents {
            name: "syllable".to_string(),
            description: "Syllable onset times.".to_string(),
            timestamps: vec![0.0],
            data: vec![2],
            labels: vec!["Syllable 0".to_string()],
        });

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&container).unwrap()).unwrap();
        assert_eq!(json["neurodata_type"], "LabeledEvents");
        assert_eq!(json["name"], "syllable");

        let back: BehaviorContainer = serde_json::from_value(json).unwrap();
        assert_eq!(back.name(), "syllable");
    }
}
