use std::path::PathBuf;

use serde::Serialize;

/// What the decoder learned about a source before reading frames.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    /// Seconds. Container duration when known, else `total_frames / fps`.
    pub duration: f64,
    pub codec: String,
    pub has_audio: bool,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Frames the source yields once resampled to `target_fps`.
    pub fn frames_at(&self, target_fps: f64) -> usize {
        (self.duration * target_fps).ceil().max(0.0) as usize
    }
}
