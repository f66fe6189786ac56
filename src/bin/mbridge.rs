//! mbridge CLI - Command-line interface for moseq-bridge
//!
//! Commands:
//! - sessions: List the sessions analyzed by a model
//! - convert: Convert sessions into standardized behavior files
//! - validate: Validate a project's config and results artifact
//! - doctor: Diagnose project layout and configuration

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use moseq_bridge::converter::{ConvertOptions, ProjectConverter};
use moseq_bridge::error::ConvertError;
use moseq_bridge::metadata::ConversionMetadata;
use moseq_bridge::project::{self, CONFIG_FILE_NAME};
use moseq_bridge::schema::config::ProjectConfig;
use moseq_bridge::{BRIDGE_VERSION, PRODUCER_NAME};

/// mbridge - Import keypoint-MoSeq syllable results into behavior files
#[derive(Parser)]
#[command(name = "mbridge")]
#[command(version = BRIDGE_VERSION)]
#[command(about = "Convert keypoint-MoSeq results into standardized behavior files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sessions analyzed by a model
    Sessions {
        /// Project directory
        project_dir: PathBuf,

        /// Model folder name inside the project directory
        #[arg(short, long)]
        model: String,

        /// Output the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert sessions into standardized behavior files
    Convert {
        /// Project directory
        project_dir: PathBuf,

        /// Model folder name inside the project directory
        #[arg(short, long)]
        model: String,

        /// Directory for the converted files (one per session)
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Convert only this session instead of all sessions
        #[arg(long)]
        session: Option<String>,

        /// Session description (single-session mode only)
        #[arg(long, requires = "session")]
        description: Option<String>,

        /// File identifier (single-session mode only)
        #[arg(long, requires = "session")]
        identifier: Option<String>,

        /// Session start time, RFC 3339 (single-session mode only)
        #[arg(long, requires = "session")]
        session_start_time: Option<String>,

        /// Segmentation tool version to stamp into provenance
        #[arg(long)]
        kpms_version: Option<String>,

        /// Replace existing output files
        #[arg(long)]
        force: bool,
    },

    /// Validate a project's config and results artifact
    Validate {
        /// Project directory
        project_dir: PathBuf,

        /// Model folder name inside the project directory
        #[arg(short, long)]
        model: String,

        /// Output the validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose project layout and configuration
    Doctor {
        /// Project directory to check
        project_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), BridgeCliError> {
    match cli.command {
        Commands::Sessions {
            project_dir,
            model,
            json,
        } => cmd_sessions(&project_dir, &model, json),

        Commands::Convert {
            project_dir,
            model,
            out_dir,
            session,
            description,
            identifier,
            session_start_time,
            kpms_version,
            force,
        } => cmd_convert(
            &project_dir,
            &model,
            &out_dir,
            session.as_deref(),
            description,
            identifier,
            session_start_time.as_deref(),
            kpms_version,
            force,
        ),

        Commands::Validate {
            project_dir,
            model,
            json,
        } => cmd_validate(&project_dir, &model, json),

        Commands::Doctor { project_dir, json } => cmd_doctor(project_dir.as_deref(), json),
    }
}

fn cmd_sessions(project_dir: &PathBuf, model: &str, json: bool) -> Result<(), BridgeCliError> {
    let sessions = moseq_bridge::list_sessions(project_dir, model)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else {
        for session in &sessions {
            println!("{session}");
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    project_dir: &PathBuf,
    model: &str,
    out_dir: &PathBuf,
    session: Option<&str>,
    description: Option<String>,
    identifier: Option<String>,
    session_start_time: Option<&str>,
    kpms_version: Option<String>,
    force: bool,
) -> Result<(), BridgeCliError> {
    let converter = ProjectConverter::open(project_dir, model)?;
    let options = ConvertOptions {
        overwrite: force,
        kpms_version,
    };

    match session {
        Some(session_name) => {
            let mut metadata = ConversionMetadata::for_session(session_name);
            if let Some(description) = description {
                metadata = metadata.with_description(description);
            }
            if let Some(identifier) = identifier {
                metadata = metadata.with_identifier(identifier);
            }
            if let Some(start) = session_start_time {
                let start = start.parse().map_err(|_| {
                    BridgeCliError::BadArgument(format!(
                        "--session-start-time must be RFC 3339, got {start:?}"
                    ))
                })?;
                metadata = metadata.with_start_time(start);
            }
            if let Some(version) = &options.kpms_version {
                metadata = metadata.with_kpms_version(version.clone());
            }

            let out_path = converter.output_path(out_dir, session_name);
            converter.convert_session(session_name, &metadata, &out_path, &options)?;
            println!("{}", out_path.display());
        }
        None => {
            let written = converter.convert_all(out_dir, &options)?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_validate(project_dir: &PathBuf, model: &str, json: bool) -> Result<(), BridgeCliError> {
    let converter = ProjectConverter::open(project_dir, model)?;
    let use_bodyparts = converter.config().use_bodyparts.clone();
    let sessions = converter.sessions();

    let mut errors: Vec<SessionErrorDetail> = Vec::new();
    for session_name in &sessions {
        if let Err(e) = validate_session(&converter, session_name, &use_bodyparts) {
            errors.push(SessionErrorDetail {
                session: session_name.clone(),
                error: e.to_string(),
            });
        }
    }

    let report = ValidationReport {
        total_sessions: sessions.len(),
        valid_sessions: sessions.len() - errors.len(),
        invalid_sessions: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total sessions:   {}", report.total_sessions);
        println!("Valid sessions:   {}", report.valid_sessions);
        println!("Invalid sessions: {}", report.invalid_sessions);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {}: {}", err.session, err.error);
            }
        }
    }

    if report.invalid_sessions > 0 {
        Err(BridgeCliError::ValidationFailed(report.invalid_sessions))
    } else {
        Ok(())
    }
}

fn validate_session(
    converter: &ProjectConverter,
    session_name: &str,
    use_bodyparts: &[String],
) -> Result<(), ConvertError> {
    converter
        .results_for(session_name)?
        .validate_against_bodyparts(session_name, use_bodyparts)
}

fn cmd_doctor(project_dir: Option<&std::path::Path>, json: bool) -> Result<(), BridgeCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "bridge_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("moseq-bridge version {BRIDGE_VERSION}"),
    });

    if let Some(project_dir) = project_dir {
        if project_dir.is_dir() {
            checks.push(DoctorCheck {
                name: "project_dir".to_string(),
                status: CheckStatus::Ok,
                message: format!("Project directory found: {}", project_dir.display()),
            });

            let config_path = project_dir.join(CONFIG_FILE_NAME);
            match ProjectConfig::load(&config_path) {
                Ok(config) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid ({} bodyparts, {} fps)",
                        config.use_bodyparts.len(),
                        config.fps
                    ),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot load {}: {e}", config_path.display()),
                }),
            }

            match project::list_models(project_dir) {
                Ok(models) if models.is_empty() => checks.push(DoctorCheck {
                    name: "models".to_string(),
                    status: CheckStatus::Warning,
                    message: "No model folders with a results artifact found".to_string(),
                }),
                Ok(models) => checks.push(DoctorCheck {
                    name: "models".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} model folder(s): {}", models.len(), models.join(", ")),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "models".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot scan for models: {e}"),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "project_dir".to_string(),
                status: CheckStatus::Error,
                message: format!("Project directory does not exist: {}", project_dir.display()),
            });
        }
    }

    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (human-readable mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (machine-readable mode ready)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: BRIDGE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("mbridge Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BridgeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum BridgeCliError {
    Io(io::Error),
    Convert(ConvertError),
    Json(serde_json::Error),
    BadArgument(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for BridgeCliError {
    fn from(e: io::Error) -> Self {
        BridgeCliError::Io(e)
    }
}

impl From<ConvertError> for BridgeCliError {
    fn from(e: ConvertError) -> Self {
        BridgeCliError::Convert(e)
    }
}

impl From<serde_json::Error> for BridgeCliError {
    fn from(e: serde_json::Error) -> Self {
        BridgeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BridgeCliError> for CliError {
    fn from(e: BridgeCliError) -> Self {
        match e {
            BridgeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BridgeCliError::Convert(e) => {
                let (code, hint) = match &e {
                    ConvertError::ProjectNotFound(_) | ConvertError::ModelNotFound(_) => (
                        "LAYOUT_ERROR",
                        "Run 'mbridge doctor <project_dir>' to inspect the layout",
                    ),
                    ConvertError::ResultsNotFound(_) | ConvertError::SessionNotFound(_) => (
                        "RESULTS_ERROR",
                        "Run 'mbridge sessions' to list what the model analyzed",
                    ),
                    ConvertError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Check the project config.yml")
                    }
                    ConvertError::InvalidResults { .. } | ConvertError::InvalidTimestamps(_) => {
                        ("VALIDATION_ERROR", "Run 'mbridge validate' for details")
                    }
                    ConvertError::OutputExists(_) => {
                        ("OUTPUT_EXISTS", "Pass --force to replace existing files")
                    }
                    _ => ("CONVERT_ERROR", "Check the project inputs"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            BridgeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BridgeCliError::BadArgument(msg) => CliError {
                code: "BAD_ARGUMENT".to_string(),
                message: msg,
                hint: None,
            },
            BridgeCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} sessions failed validation"),
                hint: Some("Fix the reported sessions and retry".to_string()),
            },
            BridgeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_sessions: usize,
    valid_sessions: usize,
    invalid_sessions: usize,
    errors: Vec<SessionErrorDetail>,
}

#[derive(serde::Serialize)]
struct SessionErrorDetail {
    session: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
