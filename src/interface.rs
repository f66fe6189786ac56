//! Data interfaces
//!
//! A data interface owns one slice of a session's source data and knows how to
//! add its containers to the output file. `SubjectInterface` is the provided
//! implementation: it covers everything the segmentation tool emits for one
//! subject (pose, centroid, heading, latents, syllables).

use crate::error::ConvertError;
use crate::events;
use crate::metadata::ConversionMetadata;
use crate::schema::config::SourceContext;
use crate::schema::results::SessionResults;
use crate::timestamps::frame_timestamps;
use crate::types::{
    AngularSeries, BehaviorContainer, BehaviorFile, CompassDirection, LabeledEvents,
    PoseEstimation, PoseSeries, Position, SpatialSeries, TimeSeries, SOURCE_SOFTWARE,
};
use tracing::debug;

/// Name of the processing module all interfaces write into
pub const BEHAVIOR_MODULE: &str = "behavior";

/// Trait for per-session data interfaces
pub trait DataInterface {
    /// Name of the interface, for logs and reports
    fn name(&self) -> &str;

    /// Add this interface's containers to the output file
    fn add_to_file(
        &self,
        file: &mut BehaviorFile,
        metadata: &ConversionMetadata,
    ) -> Result<(), ConvertError>;
}

/// Interface for one subject's segmentation results
pub struct SubjectInterface {
    session_name: String,
    model_name: String,
    results: SessionResults,
    context: SourceContext,
    fps: f64,
}

impl SubjectInterface {
    pub fn new(
        session_name: impl Into<String>,
        model_name: impl Into<String>,
        results: SessionResults,
        context: SourceContext,
        fps: f64,
    ) -> Self {
        Self {
            session_name: session_name.into(),
            model_name: model_name.into(),
            results,
            context,
            fps,
        }
    }

    fn centroid_container(&self) -> BehaviorContainer {
        BehaviorContainer::Position(Position {
            name: "centroid".to_string(),
            series: SpatialSeries {
                name: "centroid_series".to_string(),
                description: "Position (x, y) of the subject's centroid.".to_string(),
                data: self.results.centroid.clone(),
                unit: "pixels".to_string(),
                reference_frame: "origin corresponds to the top left corner of the video."
                    .to_string(),
            },
        })
    }

    fn heading_container(&self) -> BehaviorContainer {
        BehaviorContainer::CompassDirection(CompassDirection {
            name: "heading".to_string(),
            series: AngularSeries {
                name: "heading_series".to_string(),
                description: "Inferred heading direction of the subject.".to_string(),
                data: self.results.heading.clone(),
                unit: "radians".to_string(),
                reference_frame:
                    "0 points along positive x axis, towards the right side of the video frame."
                        .to_string(),
            },
        })
    }

    fn pose_container(&self, metadata: &ConversionMetadata) -> BehaviorContainer {
        let series = self
            .context
            .use_bodyparts
            .iter()
            .enumerate()
            .map(|(i_keypoint, keypoint_name)| PoseSeries {
                name: keypoint_name.clone(),
                description: format!(
                    "Unaligned keypoint-moseq estimated keypoint {keypoint_name}."
                ),
                data: self
                    .results
                    .estimated_coordinates
                    .iter()
                    .map(|frame| frame[i_keypoint])
                    .collect(),
                unit: "pixels".to_string(),
                reference_frame: "origin corresponds to the bottom left corner of the video."
                    .to_string(),
            })
            .collect();

        BehaviorContainer::PoseEstimation(PoseEstimation {
            name: "pose_estimation".to_string(),
            description: "Inferred denoised keypoint coordinates from keypoint-moseq."
                .to_string(),
            scorer: self.model_name.clone(),
            source_software: SOURCE_SOFTWARE.to_string(),
            source_software_version: metadata.syllable.kpms_version.clone(),
            nodes: self.context.use_bodyparts.clone(),
            edges: self.context.skeleton_indices(),
            series,
        })
    }

    fn latents_container(&self) -> BehaviorContainer {
        BehaviorContainer::TimeSeries(TimeSeries {
            name: "pose_latents".to_string(),
            description: "Latent pose states estimated by keypoint-moseq.".to_string(),
            data: self.results.latent_state.clone(),
            unit: "n/a".to_string(),
        })
    }

    fn syllable_container(&self, timestamps: &[f64]) -> BehaviorContainer {
        let events = events::changepoints(&self.results.syllables);
        BehaviorContainer::LabeledEvents(LabeledEvents {
            name: "syllable".to_string(),
            description: "Syllable onset times.".to_string(),
            timestamps: events.onsets.iter().map(|&i| timestamps[i]).collect(),
            labels: events::label_names(&events.labels),
            data: events.labels,
        })
    }
}

impl DataInterface for SubjectInterface {
    fn name(&self) -> &str {
        "subject"
    }

    fn add_to_file(
        &self,
        file: &mut BehaviorFile,
        metadata: &ConversionMetadata,
    ) -> Result<(), ConvertError> {
        self.results
            .validate_against_bodyparts(&self.session_name, &self.context.use_bodyparts)?;

        let timestamps = frame_timestamps(self.results.n_frames(), self.fps)?;
        debug!(
            session = %self.session_name,
            frames = self.results.n_frames(),
            keypoints = self.results.n_keypoints(),
            "assembling behavior module"
        );

        let centroid = self.centroid_container();
        let heading = self.heading_container();
        let pose = self.pose_container(metadata);
        let latents = self.latents_container();
        let syllables = self.syllable_container(&timestamps);

        file.frame_timestamps = timestamps;
        let module = file.module_mut(BEHAVIOR_MODULE, "Processed behavioral data");
        module.add(centroid);
        module.add(heading);
        module.add(pose);
        module.add(latents);
        module.add(syllables);

        Ok(())
    }
}
