//! In-memory ports for pipeline tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::audio_reader::AudioReader;
use crate::video::domain::audio_writer::AudioWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// 2x1 RGB frames whose first byte records the source position.
pub(crate) fn make_frames(count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| Frame::new(vec![i as u8, 0, 0, 0, 0, 0], 2, 1, 3, i))
        .collect()
}

pub(crate) fn metadata(fps: f64, frames: usize) -> VideoMetadata {
    VideoMetadata {
        width: 2,
        height: 1,
        fps,
        total_frames: frames,
        duration: frames as f64 / fps,
        codec: "stub".to_string(),
        has_audio: false,
        source_path: None,
    }
}

pub(crate) struct StubReader {
    frames: Vec<Frame>,
    metadata: Option<VideoMetadata>,
    closed: Arc<Mutex<bool>>,
}

impl StubReader {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            metadata: None,
            closed: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_metadata(mut self, metadata: VideoMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        self.closed.clone()
    }
}

impl VideoReader for StubReader {
    fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        self.metadata
            .clone()
            .ok_or_else(|| "stub reader has no metadata".into())
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        Box::new(self.frames.drain(..).map(Ok))
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

/// Yields `good` frames, then a decode error.
pub(crate) struct FailingReader {
    good: usize,
}

impl FailingReader {
    pub fn after(good: usize) -> Self {
        Self { good }
    }
}

impl VideoReader for FailingReader {
    fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        Ok(metadata(10.0, 10))
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let good = make_frames(self.good).into_iter().map(Ok);
        let bad = std::iter::once(Err("corrupt packet".into()));
        Box::new(good.chain(bad))
    }

    fn close(&mut self) {}
}

/// Records everything it is given. Clones share state, so keep a
/// `handle()` to inspect a writer after boxing it.
#[derive(Clone, Default)]
pub(crate) struct StubWriter {
    written: Arc<Mutex<Vec<Frame>>>,
    opened: Arc<Mutex<Option<VideoMetadata>>>,
    closed: Arc<Mutex<bool>>,
    touch: bool,
}

impl StubWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also creates an empty file at the opened path.
    pub fn touching() -> Self {
        Self {
            touch: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> Self {
        self.clone()
    }

    pub fn written(&self) -> Vec<Frame> {
        self.written.lock().unwrap().clone()
    }

    pub fn origins(&self) -> Vec<u8> {
        self.written().iter().map(|f| f.data()[0]).collect()
    }

    pub fn opened_with(&self) -> Option<VideoMetadata> {
        self.opened.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl VideoWriter for StubWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.touch {
            std::fs::write(path, b"")?;
        }
        *self.opened.lock().unwrap() = Some(metadata.clone());
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.written.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

pub(crate) struct FailingWriter;

impl VideoWriter for FailingWriter {
    fn open(
        &mut self,
        _path: &Path,
        _metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn write(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Err("disk full".into())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Marks a frame as blurred by setting its second byte.
pub(crate) struct MarkingBlurrer;

impl MarkingBlurrer {
    pub fn is_marked(frame: &Frame) -> bool {
        frame.data()[1] == 255
    }
}

impl FrameBlurrer for MarkingBlurrer {
    fn blur(&self, frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>> {
        frame.data_mut()[1] = 255;
        Ok(())
    }
}

pub(crate) struct FailingBlurrer;

impl FrameBlurrer for FailingBlurrer {
    fn blur(&self, _frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>> {
        Err("out of memory".into())
    }
}

pub(crate) struct StubAudioReader {
    pub audio: Option<AudioSegment>,
    pub requested: Arc<Mutex<Vec<std::path::PathBuf>>>,
}

impl StubAudioReader {
    pub fn new(audio: Option<AudioSegment>) -> Self {
        Self {
            audio,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl AudioReader for StubAudioReader {
    fn read_audio(
        &self,
        path: &Path,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        self.requested.lock().unwrap().push(path.to_path_buf());
        Ok(self.audio.clone())
    }

    fn audio_metadata(
        &self,
        _path: &Path,
    ) -> Result<Option<(u32, u16)>, Box<dyn std::error::Error>> {
        Ok(self
            .audio
            .as_ref()
            .map(|a| (a.sample_rate(), a.channels())))
    }
}

#[derive(Clone, Default)]
pub(crate) struct StubAudioWriter {
    pub written: Arc<Mutex<Option<AudioSegment>>>,
}

impl AudioWriter for StubAudioWriter {
    fn write_audio(
        &self,
        _video_path: &Path,
        audio: &AudioSegment,
    ) -> Result<(), Box<dyn std::error::Error>> {
        *self.written.lock().unwrap() = Some(audio.clone());
        Ok(())
    }
}
