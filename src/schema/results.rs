//! Model results artifact (`results.json`)
//!
//! A trained model writes one results artifact covering every session it
//! analyzed: a top-level group per session, each holding the frame-aligned
//! arrays produced by the segmentation run. The artifact is read-only input.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One model's results across all of its sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResults(BTreeMap<String, SessionResults>);

impl ModelResults {
    /// Load a results artifact from disk
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        if !path.is_file() {
            return Err(ConvertError::ResultsNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let results: Self = serde_json::from_str(&content)?;
        Ok(results)
    }

    /// Session names in the artifact, in stable (sorted) order
    pub fn session_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Look up one session's arrays
    pub fn session(&self, name: &str) -> Result<&SessionResults, ConvertError> {
        self.0
            .get(name)
            .ok_or_else(|| ConvertError::SessionNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate sessions in stable order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SessionResults)> {
        self.0.iter()
    }

    /// Insert a session (used when synthesizing artifacts, e.g. in tests)
    pub fn insert(&mut self, name: String, results: SessionResults) {
        self.0.insert(name, results);
    }
}

impl Default for ModelResults {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

/// Frame-aligned arrays for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResults {
    /// Denoised keypoint coordinates, frames x keypoints x 2 (pixels)
    pub estimated_coordinates: Vec<Vec<[f64; 2]>>,
    /// Centroid position, frames x 2 (pixels)
    pub centroid: Vec<[f64; 2]>,
    /// Heading direction, frames (radians)
    pub heading: Vec<f64>,
    /// Latent pose state, frames x latent-dim
    pub latent_state: Vec<Vec<f64>>,
    /// Dense syllable label per frame
    pub syllables: Vec<u32>,
}

impl SessionResults {
    /// Number of frames covered by the session
    pub fn n_frames(&self) -> usize {
        self.syllables.len()
    }

    /// Number of keypoints per frame
    pub fn n_keypoints(&self) -> usize {
        self.estimated_coordinates
            .first()
            .map(|frame| frame.len())
            .unwrap_or(0)
    }

    /// Check the arrays agree on frame count and are non-empty.
    ///
    /// `session` is only used to name the offender in the error.
    pub fn validate(&self, session: &str) -> Result<(), ConvertError> {
        let invalid = |reason: String| ConvertError::InvalidResults {
            session: session.to_string(),
            reason,
        };

        let n = self.n_frames();
        if n == 0 {
            return Err(invalid("session has no frames".to_string()));
        }
        if self.estimated_coordinates.len() != n {
            return Err(invalid(format!(
                "estimated_coordinates has {} frames, expected {n}",
                self.estimated_coordinates.len()
            )));
        }
        if self.centroid.len() != n {
            return Err(invalid(format!(
                "centroid has {} frames, expected {n}",
                self.centroid.len()
            )));
        }
        if self.heading.len() != n {
            return Err(invalid(format!(
                "heading has {} frames, expected {n}",
                self.heading.len()
            )));
        }
        if self.latent_state.len() != n {
            return Err(invalid(format!(
                "latent_state has {} frames, expected {n}",
                self.latent_state.len()
            )));
        }

        let n_keypoints = self.n_keypoints();
        if self
            .estimated_coordinates
            .iter()
            .any(|frame| frame.len() != n_keypoints)
        {
            return Err(invalid("ragged keypoint dimension".to_string()));
        }

        Ok(())
    }

    /// Additionally check the keypoint count against the modeled bodyparts
    pub fn validate_against_bodyparts(
        &self,
        session: &str,
        use_bodyparts: &[String],
    ) -> Result<(), ConvertError> {
        self.validate(session)?;
        if self.n_keypoints() != use_bodyparts.len() {
            return Err(ConvertError::InvalidResults {
                session: session.to_string(),
                reason: format!(
                    "{} keypoints in results but {} bodyparts in config",
                    self.n_keypoints(),
                    use_bodyparts.len()
                ),
            });
        }
        Ok(())
    }
}
