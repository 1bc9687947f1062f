use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::domain::audio_splicer::AudioSplicer;
use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::editing::domain::edit_config::EditConfig;
use crate::editing::domain::edit_error::EditError;
use crate::editing::domain::edit_planner::plan_edit;
use crate::editing::domain::operation::RawOperation;
use crate::editing::domain::segment::{EditPlan, Timeline};
use crate::shared::constants::SCRATCH_DIR_PREFIX;
use crate::video::domain::audio_reader::AudioReader;
use crate::video::domain::audio_writer::AudioWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_executor::{PipelineConfig, PipelineExecutor, RenderStats};

/// What a successful edit produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
    pub plan: EditPlan,
    pub stats: RenderStats,
    /// Entries the normalizer skipped.
    pub rejected: Vec<EditError>,
    /// Seconds of audio muxed into the output, if any.
    pub audio_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Edited(EditReport),
    /// Every part of the source was removed; no output file was written.
    FullyRemoved,
}

/// Orchestrates one editing run: plan, render, splice audio, publish.
///
/// Rendering happens inside a scratch directory next to the output, so
/// the output path only ever sees a finished file. This is a single-use
/// struct: `execute` consumes the owned components, so calling it twice
/// will fail.
pub struct EditVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    audio_reader: Option<Box<dyn AudioReader>>,
    audio_writer: Option<Box<dyn AudioWriter>>,
    blurrers: Option<Vec<Box<dyn FrameBlurrer>>>,
    executor: Box<dyn PipelineExecutor>,
    config: EditConfig,
    replacement_audio: Option<PathBuf>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl EditVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        audio_reader: Box<dyn AudioReader>,
        audio_writer: Box<dyn AudioWriter>,
        blurrers: Vec<Box<dyn FrameBlurrer>>,
        executor: Box<dyn PipelineExecutor>,
        config: EditConfig,
        replacement_audio: Option<PathBuf>,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            audio_reader: Some(audio_reader),
            audio_writer: Some(audio_writer),
            blurrers: Some(blurrers),
            executor,
            config,
            replacement_audio,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        operations: &[RawOperation],
    ) -> Result<EditOutcome, EditError> {
        let mut reader = self.reader.take().ok_or(EditError::AlreadyExecuted)?;
        let writer = self.writer.take().ok_or(EditError::AlreadyExecuted)?;
        let audio_reader = self.audio_reader.take().ok_or(EditError::AlreadyExecuted)?;
        let audio_writer = self.audio_writer.take().ok_or(EditError::AlreadyExecuted)?;
        let blurrers = self.blurrers.take().ok_or(EditError::AlreadyExecuted)?;

        let metadata = reader
            .open(input_path)
            .map_err(|e| EditError::Source(e.to_string()))?;
        let timeline = Timeline::from(&metadata);
        log::info!(
            "Source {}: {}x{} @ {:.3}fps, {:.3}s, audio: {}",
            input_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.duration,
            metadata.has_audio
        );

        let planned = plan_edit(operations, &timeline, &self.config)?;
        if planned.plan.is_fully_removed() {
            reader.close();
            log::info!("Nothing left to render; no output written");
            return Ok(EditOutcome::FullyRemoved);
        }

        let scratch = create_scratch_dir(output_path)?;
        let scratch_output = scratch.path().join(scratch_file_name(output_path));

        let pipeline_config = PipelineConfig {
            target_fps: self.config.target_fps,
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };
        let stats = self.executor.execute(
            reader,
            writer,
            blurrers,
            &planned.plan,
            &metadata,
            &scratch_output,
            pipeline_config,
        )?;

        if self.cancelled.load(Ordering::Relaxed) {
            return Err(EditError::Cancelled);
        }

        let audio_source = match &self.replacement_audio {
            Some(path) => Some(path.as_path()),
            None if timeline.has_audio => Some(input_path),
            None => None,
        };
        let audio_duration = match audio_source {
            Some(path) => self.mux_audio(
                audio_reader.as_ref(),
                audio_writer.as_ref(),
                path,
                &planned.plan,
                stats.frames_written,
                &scratch_output,
            )?,
            None => None,
        };

        std::fs::rename(&scratch_output, output_path).map_err(|e| {
            EditError::Assembly(format!("cannot move output to {}: {e}", output_path.display()))
        })?;
        log::info!("Wrote {}", output_path.display());

        Ok(EditOutcome::Edited(EditReport {
            plan: planned.plan,
            stats,
            rejected: planned.normalized.rejected,
            audio_duration,
        }))
    }

    /// Cuts the audio track at `source` along `plan` and muxes it into the
    /// rendered file, ending where the `frames_written` video frames end.
    /// Returns the muxed duration, or None when there was nothing to mux.
    fn mux_audio(
        &self,
        audio_reader: &dyn AudioReader,
        audio_writer: &dyn AudioWriter,
        source: &Path,
        plan: &EditPlan,
        frames_written: usize,
        rendered: &Path,
    ) -> Result<Option<f64>, EditError> {
        let audio = audio_reader
            .read_audio(source)
            .map_err(|e| EditError::Source(format!("{}: {e}", source.display())))?;

        let Some(audio) = audio else {
            if self.replacement_audio.is_some() {
                return Err(EditError::Source(format!(
                    "{} has no audio track",
                    source.display()
                )));
            }
            log::warn!("Source reported audio but none could be decoded");
            return Ok(None);
        };

        let fps = self.config.target_fps;
        let mut spliced = AudioSplicer::splice(&audio, plan, fps);
        if frames_written < plan.kept_frame_count(fps) {
            spliced.truncate_at(frames_written as f64 / fps);
        }
        if spliced.frame_count() == 0 {
            return Ok(None);
        }

        audio_writer
            .write_audio(rendered, &spliced)
            .map_err(|e| EditError::Assembly(e.to_string()))?;
        Ok(Some(spliced.duration()))
    }
}

/// The scratch directory lives beside the output so the final rename
/// stays on one filesystem. It is removed on drop, on every exit path.
fn create_scratch_dir(output_path: &Path) -> Result<tempfile::TempDir, EditError> {
    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(SCRATCH_DIR_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| {
            EditError::Assembly(format!(
                "cannot create scratch directory in {}: {e}",
                parent.display()
            ))
        })
}

/// Keeps the output's extension so the encoder picks the same container.
fn scratch_file_name(output_path: &Path) -> String {
    let extension = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    format!("render.{extension}")
}
