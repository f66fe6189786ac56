//! moseq-bridge - Import keypoint-MoSeq behavioral syllables into
//! standardized behavior files
//!
//! The crate walks a keypoint-MoSeq project directory (config + model folders
//! + per-model results artifact), enumerates the sessions a model analyzed,
//! and converts each session into one schema-versioned behavior file:
//! layout resolution → config/results ingestion → subject interface →
//! document encoding → file write.
//!
//! ## Modules
//!
//! - **schema**: the project config and results artifacts this crate ingests
//! - **converter**: session enumeration and the sequential conversion loop
//! - **interface**: data interfaces that populate the output document

pub mod converter;
pub mod encoder;
pub mod error;
pub mod events;
pub mod interface;
pub mod metadata;
pub mod project;
pub mod schema;
pub mod timestamps;
pub mod types;

pub use converter::{convert_project, list_sessions, ConvertOptions, ProjectConverter};
pub use error::ConvertError;

// Schema exports
pub use schema::{ModelResults, ProjectConfig, SessionResults, SourceContext};

// Interface exports
pub use interface::{DataInterface, SubjectInterface};
pub use metadata::ConversionMetadata;

/// Converter version embedded in all output files
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for output files
pub const PRODUCER_NAME: &str = "moseq-bridge";
