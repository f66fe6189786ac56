//! Frame timestamp derivation
//!
//! Sessions are sampled at the fixed frame rate recorded in the project
//! config, so timestamps are synthesized as `frame / fps` rather than probed
//! from the source videos.

use crate::error::ConvertError;

/// Timestamps in seconds for `n_frames` frames sampled at `fps`.
pub fn frame_timestamps(n_frames: usize, fps: f64) -> Result<Vec<f64>, ConvertError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(ConvertError::InvalidTimestamps(format!(
            "fps must be finite and positive, got {fps}"
        )));
    }
    let period = 1.0 / fps;
    Ok((0..n_frames).map(|frame| frame as f64 * period).collect())
}
