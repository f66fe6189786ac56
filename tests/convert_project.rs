//! End-to-end conversion tests against a synthesized project directory

use moseq_bridge::converter::{ConvertOptions, ProjectConverter};
use moseq_bridge::error::ConvertError;
use moseq_bridge::metadata::ConversionMetadata;
use moseq_bridge::project::{CONFIG_FILE_NAME, RESULTS_FILE_NAME};
use moseq_bridge::schema::results::{ModelResults, SessionResults};
use moseq_bridge::{convert_project, list_sessions};
use std::fs;
use tempfile::TempDir;

const CONFIG_YAML: &str = "\
video_dir: /data/videos
bodyparts: [nose, left_ear, right_ear, tail_base]
use_bodyparts: [nose, left_ear, right_ear]
skeleton:
  - [nose, left_ear]
  - [nose, right_ear]
  - [left_ear, tail_base]
fps: 20.0
latent_dim: 4
";

fn make_session(n_frames: usize, syllables: Vec<u32>) -> SessionResults {
    assert_eq!(syllables.len(), n_frames);
    SessionResults {
        estimated_coordinates: (0..n_frames)
            .map(|f| (0..3).map(|k| [f as f64 + k as f64, k as f64]).collect())
            .collect(),
        centroid: (0..n_frames).map(|f| [f as f64 * 2.0, 100.0]).collect(),
        heading: (0..n_frames).map(|f| f as f64 * 0.01).collect(),
        latent_state: (0..n_frames).map(|f| vec![f as f64; 4]).collect(),
        syllables,
    }
}

fn make_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), CONFIG_YAML).unwrap();

    let model_dir = dir.path().join("2024_03_01-10_05_00");
    fs::create_dir(&model_dir).unwrap();

    let mut results = ModelResults::default();
    results.insert(
        "subj01_day1".to_string(),
        make_session(8, vec![0, 0, 4, 4, 4, 1, 1, 1]),
    );
    results.insert("subj02_day1".to_string(), make_session(6, vec![2; 6]));
    fs::write(
        model_dir.join(RESULTS_FILE_NAME),
        serde_json::to_string(&results).unwrap(),
    )
    .unwrap();
    dir
}

#[test]
fn test_list_sessions_matches_artifact() {
    let project = make_project();
    let sessions = list_sessions(project.path(), "2024_03_01-10_05_00").unwrap();
    assert_eq!(sessions, vec!["subj01_day1", "subj02_day1"]);
}

#[test]
fn test_convert_project_end_to_end() {
    let project = make_project();
    let out = TempDir::new().unwrap();

    let written =
        convert_project(project.path(), "2024_03_01-10_05_00", out.path()).unwrap();
    assert_eq!(written.len(), 2);

    let content = fs::read_to_string(out.path().join("subj01_day1.nwb.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();

    // Header blocks
    assert_eq!(doc["schema_version"], "nwb-behavior.v1");
    assert_eq!(doc["producer"]["name"], "moseq-bridge");
    assert_eq!(doc["provenance"]["model_name"], "2024_03_01-10_05_00");
    assert_eq!(doc["provenance"]["session_name"], "subj01_day1");
    assert_eq!(doc["provenance"]["source_software"], "keypoint-moseq");
    assert!(doc["metadata"]["identifier"].as_str().is_some());

    // Shared frame timestamps at 20 fps
    let timestamps = doc["frame_timestamps"].as_array().unwrap();
    assert_eq!(timestamps.len(), 8);
    assert_eq!(timestamps[1], 0.05);

    // One behavior module holding the five containers
    let modules = doc["processing"].as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["name"], "behavior");
    let containers = modules[0]["containers"].as_array().unwrap();
    let names: Vec<&str> = containers
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["centroid", "heading", "pose_estimation", "pose_latents", "syllable"]
    );

    // Pose container carries the modeled bodyparts and the mapped skeleton;
    // the bone touching the unmodeled tail_base is dropped
    let pose = &containers[2];
    assert_eq!(pose["neurodata_type"], "PoseEstimation");
    assert_eq!(
        pose["nodes"].as_array().unwrap().len(),
        3
    );
    assert_eq!(pose["edges"], serde_json::json!([[0, 1], [0, 2]]));

    // Syllable events: onsets at frames 0, 2, 5
    let events = &containers[4];
    assert_eq!(events["data"], serde_json::json!([0, 4, 1]));
    assert_eq!(events["timestamps"], serde_json::json!([0.0, 0.1, 0.25]));
    assert_eq!(events["labels"].as_array().unwrap().len(), 5);
}

#[test]
fn test_second_run_respects_write_once() {
    let project = make_project();
    let out = TempDir::new().unwrap();

    convert_project(project.path(), "2024_03_01-10_05_00", out.path()).unwrap();
    let err = convert_project(project.path(), "2024_03_01-10_05_00", out.path()).unwrap_err();
    assert!(matches!(err, ConvertError::OutputExists(_)));
}

#[test]
fn test_single_session_with_explicit_metadata() {
    let project = make_project();
    let out = TempDir::new().unwrap();
    let converter = ProjectConverter::open(project.path(), "2024_03_01-10_05_00").unwrap();

    let start = "2024-03-01T09:00:00Z".parse().unwrap();
    let metadata = ConversionMetadata::for_session("subj02_day1")
        .with_description("open field, subject 2")
        .with_identifier("subj02-day1")
        .with_start_time(start)
        .with_kpms_version("0.4.5");

    let out_path = converter.output_path(out.path(), "subj02_day1");
    converter
        .convert_session("subj02_day1", &metadata, &out_path, &ConvertOptions::default())
        .unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(doc["metadata"]["identifier"], "subj02-day1");
    assert_eq!(doc["metadata"]["session_description"], "open field, subject 2");
    assert_eq!(doc["metadata"]["session_start_time"], "2024-03-01T09:00:00Z");
    assert_eq!(doc["provenance"]["source_software_version"], "0.4.5");

    // Only the requested session was written
    assert!(!out.path().join("subj01_day1.nwb.json").exists());
}

#[test]
fn test_corrupt_results_named_in_error() {
    let project = make_project();
    let model_dir = project.path().join("2024_03_01-10_05_00");

    // Truncate one array of one session
    let content = fs::read_to_string(model_dir.join(RESULTS_FILE_NAME)).unwrap();
    let mut results: ModelResults = serde_json::from_str(&content).unwrap();
    let mut broken = results.session("subj01_day1").unwrap().clone();
    broken.heading.pop();
    results.insert("subj01_day1".to_string(), broken);
    fs::write(
        model_dir.join(RESULTS_FILE_NAME),
        serde_json::to_string(&results).unwrap(),
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let err = convert_project(project.path(), "2024_03_01-10_05_00", out.path()).unwrap_err();
    match err {
        ConvertError::InvalidResults { session, .. } => assert_eq!(session, "subj01_day1"),
        other => panic!("unexpected error: {other}"),
    }
}
