use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::editing::domain::edit_error::EditError;
use crate::editing::domain::segment::EditPlan;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Configuration for one render run.
pub struct PipelineConfig {
    /// Output frame rate; the source is resampled to it before routing.
    pub target_fps: f64,
    /// Called with `(frames_written, total_frames)`; returning false cancels.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

/// Frame counts from a finished render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Slots produced by the frame-rate normalizer.
    pub frames_read: usize,
    pub frames_written: usize,
    pub frames_blurred: usize,
    /// Slots that fell in removed spans.
    pub frames_dropped: usize,
}

/// Abstracts how the read → route → transform → write pipeline is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded, single-threaded).
pub trait PipelineExecutor: Send {
    /// Renders the kept segments of `plan` as one video-only file.
    ///
    /// `metadata` describes the source; the output uses `config.target_fps`.
    /// One blurrer is used per worker, so `blurrers` sets the parallelism.
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        blurrers: Vec<Box<dyn FrameBlurrer>>,
        plan: &EditPlan,
        metadata: &VideoMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<RenderStats, EditError>;
}
