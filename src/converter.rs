//! Conversion orchestration
//!
//! This module provides the public API for moseq-bridge: enumerate the
//! sessions a model analyzed, then convert them one at a time, each conversion
//! a blocking read-assemble-write with no shared state across iterations.

use crate::encoder::FileEncoder;
use crate::error::ConvertError;
use crate::interface::{DataInterface, SubjectInterface};
use crate::metadata::ConversionMetadata;
use crate::project::ProjectLayout;
use crate::schema::config::ProjectConfig;
use crate::schema::results::{ModelResults, SessionResults};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File extension of converted sessions
pub const OUTPUT_EXTENSION: &str = "nwb.json";

/// List the sessions analyzed by a model.
///
/// # Arguments
/// * `project_dir` - Project directory
/// * `model_folder` - Name of the model folder inside the project directory
///
/// # Returns
/// Session names recorded in the model's results artifact, in stable order
pub fn list_sessions(project_dir: &Path, model_folder: &str) -> Result<Vec<String>, ConvertError> {
    let layout = ProjectLayout::resolve(project_dir, model_folder)?;
    Ok(layout.load_results()?.session_names())
}

/// Convert every session of a model with default per-session metadata.
///
/// # Example
/// ```ignore
/// let written = convert_project(
///     Path::new("/data/open_field"),
///     "2024_03_01-10_05_00",
///     Path::new("/data/nwb"),
/// )?;
/// ```
pub fn convert_project(
    project_dir: &Path,
    model_folder: &str,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ConvertError> {
    let converter = ProjectConverter::open(project_dir, model_folder)?;
    converter.convert_all(out_dir, &ConvertOptions::default())
}

/// Options applied to a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Replace existing output files instead of failing
    pub overwrite: bool,
    /// Version of the segmentation tool, stamped into provenance
    pub kpms_version: Option<String>,
}

/// Converter for one (project, model) pair.
///
/// Opening the converter loads the project config and the model's results
/// eagerly; conversion itself is strictly sequential.
pub struct ProjectConverter {
    layout: ProjectLayout,
    config: ProjectConfig,
    results: ModelResults,
    encoder: FileEncoder,
}

impl ProjectConverter {
    /// Open a converter on a project directory and model folder
    pub fn open(project_dir: &Path, model_folder: &str) -> Result<Self, ConvertError> {
        let layout = ProjectLayout::resolve(project_dir, model_folder)?;
        let config = ProjectConfig::load(&layout.config_path())?;
        let results = layout.load_results()?;
        Ok(Self {
            layout,
            config,
            results,
            encoder: FileEncoder::new(),
        })
    }

    /// Session names in the model's results, in stable order
    pub fn sessions(&self) -> Vec<String> {
        self.results.session_names()
    }

    /// The loaded project configuration
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Arrays for one session of the loaded results artifact
    pub fn results_for(&self, session_name: &str) -> Result<&SessionResults, ConvertError> {
        self.results.session(session_name)
    }

    /// Output path for a session inside `out_dir`
    pub fn output_path(&self, out_dir: &Path, session_name: &str) -> PathBuf {
        out_dir.join(format!("{session_name}.{OUTPUT_EXTENSION}"))
    }

    /// Convert one session to `out_path` with explicit metadata.
    ///
    /// The output is write-once: converting onto an existing path fails unless
    /// `overwrite` is set in the options.
    pub fn convert_session(
        &self,
        session_name: &str,
        metadata: &ConversionMetadata,
        out_path: &Path,
        options: &ConvertOptions,
    ) -> Result<(), ConvertError> {
        if out_path.exists() && !options.overwrite {
            return Err(ConvertError::OutputExists(out_path.to_path_buf()));
        }

        let results = self.results.session(session_name)?;
        let interface = SubjectInterface::new(
            session_name,
            self.layout.model_folder(),
            results.clone(),
            self.config.source_context(),
            self.config.fps,
        );

        let mut file = self.encoder.begin_file(
            self.layout.project_dir(),
            self.layout.model_folder(),
            session_name,
            metadata,
        );
        interface.add_to_file(&mut file, metadata)?;

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(out_path, self.encoder.to_json(&file)?)?;

        info!(
            session = %session_name,
            path = %out_path.display(),
            "converted session"
        );
        Ok(())
    }

    /// Convert every session into `out_dir`, one file per session.
    ///
    /// Metadata defaults are generated per session; the tool version from the
    /// options is applied to each. Returns the written paths in session order.
    pub fn convert_all(
        &self,
        out_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        let sessions = self.sessions();
        info!(
            model = %self.layout.model_folder(),
            sessions = sessions.len(),
            "starting conversion"
        );

        let mut written = Vec::with_capacity(sessions.len());
        for session_name in &sessions {
            let mut metadata = ConversionMetadata::for_session(session_name);
            if let Some(version) = &options.kpms_version {
                metadata = metadata.with_kpms_version(version.clone());
            }

            let out_path = self.output_path(out_dir, session_name);
            self.convert_session(session_name, &metadata, &out_path, options)?;
            written.push(out_path);
        }
        Ok(written)
    }
}
