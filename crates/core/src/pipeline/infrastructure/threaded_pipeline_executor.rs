use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::editing::domain::edit_error::EditError;
use crate::editing::domain::frame_rate::FrameRateNormalizer;
use crate::editing::domain::segment::{EditPlan, Segment, SegmentKind};
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor, RenderStats};
use crate::pipeline::segment_schedule::{SegmentSchedule, SlotRoute};
use crate::shared::constants::PIPELINE_QUEUE_DEPTH;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// A kept frame on its way to a worker. The frame is already renumbered
/// with its output position.
struct Job {
    segment: usize,
    kind: SegmentKind,
    frame: Frame,
}

#[derive(Default)]
struct ReadCounts {
    read: usize,
    dropped: usize,
}

/// Executes a render with dedicated threads for I/O and a pool of
/// transform workers.
///
/// Layout: `reader → workers[n] → main [reorder] → writer`
///
/// The reader resamples to the output rate and drops removed frames, so
/// workers only see kept frames. Workers finish out of order; the main
/// thread restores output order before handing frames to the writer.
pub struct ThreadedPipelineExecutor {
    channel_capacity: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: PIPELINE_QUEUE_DEPTH,
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        mut writer: Box<dyn VideoWriter>,
        blurrers: Vec<Box<dyn FrameBlurrer>>,
        plan: &EditPlan,
        metadata: &VideoMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<RenderStats, EditError> {
        if blurrers.is_empty() {
            return Err(EditError::InvalidConfig(
                "at least one render worker is required".to_string(),
            ));
        }

        let schedule = SegmentSchedule::new(plan, config.target_fps);
        let total_frames = schedule.total_frames();
        let output_metadata = VideoMetadata {
            fps: config.target_fps,
            total_frames,
            duration: plan.kept_duration(),
            ..metadata.clone()
        };

        writer
            .open(output_path, &output_metadata)
            .map_err(|e| EditError::Assembly(e.to_string()))?;

        log::info!(
            "Rendering {} frames from {} segments with {} workers",
            total_frames,
            plan.segments.len(),
            blurrers.len()
        );

        let cap = self.channel_capacity;
        let segments: Arc<[Segment]> = plan.segments.as_slice().into();

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Result<Job, EditError>>(cap);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<Result<Frame, EditError>>(cap);
        let (write_tx, write_rx) = crossbeam_channel::bounded::<Frame>(cap);

        let reader_handle = spawn_reader(
            reader,
            metadata.fps,
            config.target_fps,
            schedule,
            segments.clone(),
            job_tx,
            config.cancelled.clone(),
        );
        let worker_handles: Vec<_> = blurrers
            .into_iter()
            .map(|blurrer| {
                spawn_worker(
                    blurrer,
                    job_rx.clone(),
                    done_tx.clone(),
                    segments.clone(),
                    config.cancelled.clone(),
                )
            })
            .collect();
        drop(job_rx);
        drop(done_tx);
        let writer_handle = spawn_writer(writer, write_rx);

        let main_result = run_main_loop(done_rx, &write_tx, total_frames, &config);
        if main_result.is_err() {
            config.cancelled.store(true, Ordering::Relaxed);
        }
        drop(write_tx);

        join_threads(reader_handle, worker_handles, writer_handle, main_result)
    }
}

fn spawn_reader(
    mut reader: Box<dyn VideoReader>,
    source_fps: f64,
    target_fps: f64,
    mut schedule: SegmentSchedule,
    segments: Arc<[Segment]>,
    job_tx: Sender<Result<Job, EditError>>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<ReadCounts> {
    std::thread::spawn(move || {
        let mut counts = ReadCounts::default();
        let slots = FrameRateNormalizer::new(reader.frames(), source_fps, target_fps);

        for slot_result in slots {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let frame = match slot_result {
                Ok(frame) => frame,
                Err(e) => {
                    let _ = job_tx.send(Err(EditError::Source(e.to_string())));
                    break;
                }
            };
            counts.read += 1;

            match schedule.route(frame.index()) {
                SlotRoute::Done => break,
                SlotRoute::Drop => counts.dropped += 1,
                SlotRoute::Keep { segment, position } => {
                    let job = Job {
                        segment,
                        kind: segments[segment].kind,
                        frame: frame.with_index(position),
                    };
                    if job_tx.send(Ok(job)).is_err() {
                        break;
                    }
                }
            }
        }

        reader.close();
        counts
    })
}

fn spawn_worker(
    blurrer: Box<dyn FrameBlurrer>,
    job_rx: Receiver<Result<Job, EditError>>,
    done_tx: Sender<Result<Frame, EditError>>,
    segments: Arc<[Segment]>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<usize> {
    std::thread::spawn(move || {
        let mut blurred = 0;
        for job_result in job_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let result = job_result.and_then(|mut job| {
                if job.kind == SegmentKind::Transform {
                    blurrer.blur(&mut job.frame).map_err(|e| {
                        let segment = &segments[job.segment];
                        EditError::Render {
                            kind: segment.kind,
                            start: segment.start_time,
                            end: segment.end_time,
                            message: e.to_string(),
                        }
                    })?;
                    blurred += 1;
                }
                Ok(job.frame)
            });

            if done_tx.send(result).is_err() {
                break;
            }
        }
        blurred
    })
}

fn spawn_writer(
    mut writer: Box<dyn VideoWriter>,
    write_rx: Receiver<Frame>,
) -> JoinHandle<Result<Box<dyn VideoWriter>, String>> {
    std::thread::spawn(move || {
        for frame in write_rx {
            writer.write(&frame).map_err(|e| e.to_string())?;
        }
        Ok(writer)
    })
}

/// Receives rendered frames in completion order and forwards them to the
/// writer in output order. Returns the number of frames forwarded.
fn run_main_loop(
    done_rx: Receiver<Result<Frame, EditError>>,
    write_tx: &Sender<Frame>,
    total_frames: usize,
    config: &PipelineConfig,
) -> Result<usize, EditError> {
    let mut pending: BTreeMap<usize, Frame> = BTreeMap::new();
    let mut next_position = 0;

    for done in done_rx {
        if config.cancelled.load(Ordering::Relaxed) {
            return Err(EditError::Cancelled);
        }

        let frame = done?;
        pending.insert(frame.index(), frame);

        while let Some(frame) = pending.remove(&next_position) {
            if write_tx.send(frame).is_err() {
                // The writer failed; its error surfaces on join.
                return Ok(next_position);
            }
            next_position += 1;

            if let Some(ref callback) = config.on_progress {
                if !callback(next_position, total_frames) {
                    return Err(EditError::Cancelled);
                }
            }
        }
    }

    if config.cancelled.load(Ordering::Relaxed) {
        return Err(EditError::Cancelled);
    }
    if !pending.is_empty() {
        return Err(EditError::Assembly(format!(
            "{} rendered frames never became writable after frame {}",
            pending.len(),
            next_position
        )));
    }
    if next_position < total_frames {
        log::warn!(
            "Source ended early: wrote {} of {} planned frames",
            next_position,
            total_frames
        );
    }
    Ok(next_position)
}

/// Joins all pipeline threads, keeping the first error encountered.
fn join_threads(
    reader_handle: JoinHandle<ReadCounts>,
    worker_handles: Vec<JoinHandle<usize>>,
    writer_handle: JoinHandle<Result<Box<dyn VideoWriter>, String>>,
    main_result: Result<usize, EditError>,
) -> Result<RenderStats, EditError> {
    let mut first_error = main_result.as_ref().err().cloned();
    let mut set_if_none = |err: EditError| {
        if first_error.is_none() {
            first_error = Some(err);
        }
    };

    let counts = reader_handle.join().unwrap_or_else(|_| {
        set_if_none(EditError::Source("reader thread panicked".to_string()));
        ReadCounts::default()
    });

    let mut frames_blurred = 0;
    for handle in worker_handles {
        match handle.join() {
            Ok(blurred) => frames_blurred += blurred,
            Err(_) => set_if_none(EditError::Assembly("render worker panicked".to_string())),
        }
    }

    match writer_handle.join() {
        Ok(Ok(mut w)) => {
            if let Err(e) = w.close() {
                set_if_none(EditError::Assembly(e.to_string()));
            }
        }
        Ok(Err(message)) => set_if_none(EditError::Assembly(message)),
        Err(_) => set_if_none(EditError::Assembly("writer thread panicked".to_string())),
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let stats = RenderStats {
        frames_read: counts.read,
        frames_written: main_result.unwrap_or_default(),
        frames_blurred,
        frames_dropped: counts.dropped,
    };
    log::info!(
        "Rendered {} frames ({} blurred, {} dropped)",
        stats.frames_written,
        stats.frames_blurred,
        stats.frames_dropped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::domain::segment::TimeSpan;
    use crate::pipeline::test_stubs::{
        make_frames, metadata, FailingBlurrer, FailingReader, FailingWriter, MarkingBlurrer,
        StubReader, StubWriter,
    };
    use std::sync::Mutex;

    fn config(target_fps: f64) -> PipelineConfig {
        PipelineConfig {
            target_fps,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn blurrers(n: usize) -> Vec<Box<dyn FrameBlurrer>> {
        (0..n)
            .map(|_| Box::new(MarkingBlurrer) as Box<dyn FrameBlurrer>)
            .collect()
    }

    /// 1s at 10fps: keep 0.0-0.3, cut 0.3-0.5, blur 0.5-0.7, keep 0.7-1.0.
    fn plan() -> EditPlan {
        EditPlan {
            duration: 1.0,
            segments: vec![
                Segment::new(SegmentKind::PassThrough, 0.0, 0.3),
                Segment::new(SegmentKind::Transform, 0.5, 0.7),
                Segment::new(SegmentKind::PassThrough, 0.7, 1.0),
            ],
            removed: vec![TimeSpan::new(0.3, 0.5)],
        }
    }

    fn run(
        plan: &EditPlan,
        frames: usize,
        source_fps: f64,
        workers: usize,
        config: PipelineConfig,
    ) -> (Result<RenderStats, EditError>, StubWriter) {
        let writer = StubWriter::new();
        let handle = writer.handle();
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(frames))),
            Box::new(writer),
            blurrers(workers),
            plan,
            &metadata(source_fps, frames),
            Path::new("/tmp/out.mp4"),
            config,
        );
        (result, handle)
    }

    #[test]
    fn test_removed_frames_are_dropped_and_order_kept() {
        let (result, writer) = run(&plan(), 10, 10.0, 3, config(10.0));
        let stats = result.unwrap();

        let written = writer.written();
        // Source frames 3 and 4 fall in the cut.
        assert_eq!(writer.origins(), vec![0, 1, 2, 5, 6, 7, 8, 9]);
        let indices: Vec<usize> = written.iter().map(Frame::index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(stats.frames_written, 8);
        assert_eq!(stats.frames_dropped, 2);
        assert_eq!(stats.frames_read, 10);
    }

    #[test]
    fn test_only_transform_frames_are_blurred() {
        let (result, writer) = run(&plan(), 10, 10.0, 2, config(10.0));
        assert_eq!(result.unwrap().frames_blurred, 2);

        let blurred: Vec<bool> = writer
            .written()
            .iter()
            .map(MarkingBlurrer::is_marked)
            .collect();
        assert_eq!(
            blurred,
            vec![false, false, false, true, true, false, false, false]
        );
    }

    #[test]
    fn test_output_is_resampled_to_target_rate() {
        // 20 source frames at 20fps = 1s; output at 10fps keeps every other.
        let (result, writer) = run(&plan(), 20, 20.0, 2, config(10.0));
        result.unwrap();
        assert_eq!(writer.origins(), vec![0, 2, 4, 10, 12, 14, 16, 18]);
        let opened = writer.opened_with().unwrap();
        assert!((opened.fps - 10.0).abs() < 1e-9);
        assert_eq!(opened.total_frames, 8);
    }

    #[test]
    fn test_many_workers_keep_order() {
        let plan = EditPlan {
            duration: 10.0,
            segments: vec![Segment::new(SegmentKind::Transform, 0.0, 10.0)],
            removed: vec![],
        };
        let (result, writer) = run(&plan, 100, 10.0, 8, config(10.0));
        assert_eq!(result.unwrap().frames_blurred, 100);
        assert_eq!(writer.origins(), (0..100).map(|i| i as u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_writer_is_closed() {
        let (result, writer) = run(&plan(), 10, 10.0, 1, config(10.0));
        result.unwrap();
        assert!(writer.is_closed());
    }

    #[test]
    fn test_progress_reports_every_frame() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_clone = calls.clone();
        let mut cfg = config(10.0);
        cfg.on_progress = Some(Box::new(move |current, total| {
            calls_clone.lock().unwrap().push((current, total));
            true
        }));

        let (result, _) = run(&plan(), 10, 10.0, 2, cfg);
        result.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 8);
        assert_eq!(calls[7], (8, 8));
    }

    #[test]
    fn test_cancel_via_on_progress() {
        let mut cfg = config(10.0);
        cfg.on_progress = Some(Box::new(|current, _total| current < 3));

        let (result, writer) = run(&plan(), 10, 10.0, 2, cfg);
        assert_eq!(result.unwrap_err(), EditError::Cancelled);
        assert!(writer.written().len() <= 3);
    }

    #[test]
    fn test_cancel_via_flag() {
        let cfg = config(10.0);
        cfg.cancelled.store(true, Ordering::Relaxed);
        let (result, _) = run(&plan(), 10, 10.0, 2, cfg);
        assert_eq!(result.unwrap_err(), EditError::Cancelled);
    }

    #[test]
    fn test_blur_failure_names_segment() {
        let writer = StubWriter::new();
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(10))),
            Box::new(writer),
            vec![Box::new(FailingBlurrer)],
            &plan(),
            &metadata(10.0, 10),
            Path::new("/tmp/out.mp4"),
            config(10.0),
        );

        match result.unwrap_err() {
            EditError::Render {
                kind, start, end, ..
            } => {
                assert_eq!(kind, SegmentKind::Transform);
                assert!((start - 0.5).abs() < 1e-9);
                assert!((end - 0.7).abs() < 1e-9);
            }
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_failure_is_source_error() {
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(FailingReader::after(2)),
            Box::new(StubWriter::new()),
            blurrers(2),
            &plan(),
            &metadata(10.0, 10),
            Path::new("/tmp/out.mp4"),
            config(10.0),
        );
        assert!(matches!(result, Err(EditError::Source(_))));
    }

    #[test]
    fn test_writer_failure_is_assembly_error() {
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(10))),
            Box::new(FailingWriter),
            blurrers(2),
            &plan(),
            &metadata(10.0, 10),
            Path::new("/tmp/out.mp4"),
            config(10.0),
        );
        assert!(matches!(result, Err(EditError::Assembly(_))));
    }

    #[test]
    fn test_no_workers_is_rejected() {
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(StubReader::new(make_frames(1))),
            Box::new(StubWriter::new()),
            Vec::new(),
            &plan(),
            &metadata(10.0, 1),
            Path::new("/tmp/out.mp4"),
            config(10.0),
        );
        assert!(matches!(result, Err(EditError::InvalidConfig(_))));
    }
}
