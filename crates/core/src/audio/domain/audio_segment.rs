/// Decoded audio: interleaved PCM samples normalized to [-1.0, 1.0] at the
/// track's native rate and channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        debug_assert!(channels > 0, "audio must have at least one channel");
        debug_assert_eq!(
            samples.len() % channels.max(1) as usize,
            0,
            "samples must hold whole interleaved frames"
        );
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Empty audio with the same layout as `self`.
    pub fn empty_like(&self) -> Self {
        Self::new(Vec::new(), self.sample_rate, self.channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Interleaved sample offset of `time`, rounded to the nearest audio
    /// frame. Not clamped to the buffer length.
    pub fn offset_at(&self, time: f64) -> usize {
        let frame = (time.max(0.0) * self.sample_rate as f64).round() as usize;
        frame * self.channels as usize
    }

    /// Interleaved samples between two offsets, clamped to what exists.
    pub fn slice(&self, start: usize, end: usize) -> &[f32] {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        &self.samples[start..end]
    }

    pub fn extend_from_slice(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Drops everything after `time`. Shorter audio is left as is.
    pub fn truncate_at(&mut self, time: f64) {
        let end = self.offset_at(time);
        self.samples.truncate(end);
    }

    /// Appends `count` interleaved zero samples.
    pub fn pad_silence(&mut self, count: usize) {
        self.samples.resize(self.samples.len() + count, 0.0);
    }
}
