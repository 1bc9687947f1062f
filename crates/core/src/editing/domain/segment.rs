use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::shared::video_metadata::VideoMetadata;

/// Tolerance for comparing interval bounds derived from float arithmetic.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// Immutable metadata of the source media being edited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timeline {
    pub duration: f64,
    pub frame_rate: f64,
    pub has_audio: bool,
}

impl Timeline {
    pub fn new(duration: f64, frame_rate: f64, has_audio: bool) -> Self {
        Self {
            duration,
            frame_rate,
            has_audio,
        }
    }
}

impl From<&VideoMetadata> for Timeline {
    fn from(metadata: &VideoMetadata) -> Self {
        Self {
            duration: metadata.duration,
            frame_rate: metadata.fps,
            has_audio: metadata.has_audio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Copied from the source unchanged.
    PassThrough,
    /// Every frame blurred; audio kept.
    Transform,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::PassThrough => write!(f, "pass-through"),
            SegmentKind::Transform => write!(f, "transform"),
        }
    }
}

/// A half-open interval `[start, end)` of the source timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Output frame indices whose presentation time falls in this span.
    ///
    /// Frame `n` is shown at `n / fps`; it belongs to the span when
    /// `start <= n / fps < end`.
    pub fn frame_range(&self, fps: f64) -> Range<usize> {
        first_frame_at_or_after(self.start, fps)..first_frame_at_or_after(self.end, fps)
    }
}

fn first_frame_at_or_after(time: f64, fps: f64) -> usize {
    (time * fps - TIME_EPSILON).ceil().max(0.0) as usize
}

/// A contiguous slice of the output, drawn from one source interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start_time: f64,
    pub end_time: f64,
}

impl Segment {
    pub fn new(kind: SegmentKind, start_time: f64, end_time: f64) -> Self {
        Self {
            kind,
            start_time,
            end_time,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn frame_range(&self, fps: f64) -> Range<usize> {
        self.span().frame_range(fps)
    }
}

/// The full edit of one source: kept segments plus the intervals cut out.
///
/// Segments and removed spans together tile `[0, duration]` exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditPlan {
    pub duration: f64,
    pub segments: Vec<Segment>,
    pub removed: Vec<TimeSpan>,
}

impl EditPlan {
    /// True when nothing of the source survives the edit.
    pub fn is_fully_removed(&self) -> bool {
        self.segments.is_empty()
    }

    /// Length of the edited output in seconds.
    pub fn kept_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    pub fn removed_duration(&self) -> f64 {
        self.removed.iter().map(TimeSpan::duration).sum()
    }

    pub fn transform_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Transform)
            .count()
    }

    /// Number of output frames the plan keeps at `fps`.
    pub fn kept_frame_count(&self, fps: f64) -> usize {
        self.segments.iter().map(|s| s.frame_range(fps).len()).sum()
    }
}
