//! Input schemas
//!
//! This module defines the two artifacts a keypoint-MoSeq project hands us:
//! the project configuration (`config.yml`) and a model's results artifact
//! (`results.json`, one group of arrays per session).

pub mod config;
pub mod results;

pub use config::{ProjectConfig, SourceContext, DEFAULT_FPS};
pub use results::{ModelResults, SessionResults};
