//! Project directory layout
//!
//! A project directory holds `config.yml` at its root and one subfolder per
//! trained model; each model folder holds that model's `results.json`. This
//! module resolves those paths and enumerates what is present, nothing more.

use crate::error::ConvertError;
use crate::schema::results::ModelResults;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// File name of a model's results artifact
pub const RESULTS_FILE_NAME: &str = "results.json";

/// Resolved paths for one (project, model) pair
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    project_dir: PathBuf,
    model_folder: String,
}

impl ProjectLayout {
    /// Resolve a layout, checking the project and model folders exist
    pub fn resolve(project_dir: &Path, model_folder: &str) -> Result<Self, ConvertError> {
        if !project_dir.is_dir() {
            return Err(ConvertError::ProjectNotFound(project_dir.to_path_buf()));
        }
        let layout = Self {
            project_dir: project_dir.to_path_buf(),
            model_folder: model_folder.to_string(),
        };
        if !layout.model_dir().is_dir() {
            return Err(ConvertError::ModelNotFound(model_folder.to_string()));
        }
        Ok(layout)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn model_folder(&self) -> &str {
        &self.model_folder
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE_NAME)
    }

    pub fn model_dir(&self) -> PathBuf {
        self.project_dir.join(&self.model_folder)
    }

    pub fn results_path(&self) -> PathBuf {
        self.model_dir().join(RESULTS_FILE_NAME)
    }

    /// Load the model's results artifact
    pub fn load_results(&self) -> Result<ModelResults, ConvertError> {
        ModelResults::load(&self.results_path())
    }
}

/// List the model folders of a project: subfolders holding a results artifact,
/// in sorted order.
pub fn list_models(project_dir: &Path) -> Result<Vec<String>, ConvertError> {
    if !project_dir.is_dir() {
        return Err(ConvertError::ProjectNotFound(project_dir.to_path_buf()));
    }

    let mut models = Vec::new();
    for entry in fs::read_dir(project_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join(RESULTS_FILE_NAME).is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                models.push(name.to_string());
            }
        }
    }
    models.sort();
    Ok(models)
}
