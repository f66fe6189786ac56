//! Project configuration (`config.yml`)
//!
//! A keypoint-MoSeq project carries one YAML config at its root. Only the keys
//! this converter consumes are modeled; everything else in the file is ignored
//! so configs written by newer tool versions still parse.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Frame rate assumed when the config does not carry one
pub const DEFAULT_FPS: f64 = 30.0;

fn default_fps() -> f64 {
    DEFAULT_FPS
}

/// Parsed project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding the session videos, if recorded in the config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_dir: Option<PathBuf>,
    /// Full bodypart list from the upstream tracking tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodyparts: Option<Vec<String>>,
    /// Bodyparts actually used for modeling, in array order
    pub use_bodyparts: Vec<String>,
    /// Skeleton bones as bodypart-name pairs
    #[serde(default)]
    pub skeleton: Vec<Vec<String>>,
    /// Recording frame rate (frames per second)
    #[serde(default = "default_fps")]
    pub fps: f64,
}

impl ProjectConfig {
    /// Load and validate a config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the parsed config
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.use_bodyparts.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "use_bodyparts must not be empty".to_string(),
            ));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "fps must be finite and positive, got {}",
                self.fps
            )));
        }
        for bone in &self.skeleton {
            if bone.len() != 2 {
                return Err(ConvertError::InvalidConfig(format!(
                    "skeleton bones must name exactly two bodyparts, got {bone:?}"
                )));
            }
        }
        Ok(())
    }

    /// Extract the keys a subject interface needs from the config.
    ///
    /// This is the config-to-metadata transform: the returned context carries
    /// the video directory, the modeled bodyparts, and the skeleton, nothing
    /// else.
    pub fn source_context(&self) -> SourceContext {
        SourceContext {
            video_dir: self.video_dir.clone(),
            use_bodyparts: self.use_bodyparts.clone(),
            skeleton: self.skeleton.clone(),
        }
    }
}

/// Config-derived inputs for a subject interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceContext {
    pub video_dir: Option<PathBuf>,
    pub use_bodyparts: Vec<String>,
    pub skeleton: Vec<Vec<String>>,
}

impl SourceContext {
    /// Map skeleton bones to index pairs into `use_bodyparts`.
    ///
    /// Bones referencing a bodypart that is not modeled are dropped.
    pub fn skeleton_indices(&self) -> Vec<[usize; 2]> {
        self.skeleton
            .iter()
            .filter_map(|bone| match bone.as_slice() {
                [first, second] => {
                    let a = self.use_bodyparts.iter().position(|bp| bp == first)?;
                    let b = self.use_bodyparts.iter().position(|bp| bp == second)?;
                    Some([a, b])
                }
                _ => None,
            })
            .collect()
    }
}
