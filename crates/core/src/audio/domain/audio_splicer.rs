use crate::editing::domain::segment::EditPlan;

use super::audio_segment::AudioSegment;

/// Cuts the source audio the same way the video is cut.
///
/// Each kept segment contributes exactly the audio that plays under its
/// output frames: frames `[a, b)` at `fps` map to `[a / fps, b / fps)`.
/// Short source audio is padded with silence so every segment's audio
/// lasts as long as its video.
pub struct AudioSplicer;

impl AudioSplicer {
    pub fn splice(audio: &AudioSegment, plan: &EditPlan, fps: f64) -> AudioSegment {
        let mut out = audio.empty_like();

        for segment in &plan.segments {
            let frames = segment.frame_range(fps);
            if frames.is_empty() {
                continue;
            }
            let start = audio.offset_at(frames.start as f64 / fps);
            let end = audio.offset_at(frames.end as f64 / fps);

            let available = audio.slice(start, end);
            out.extend_from_slice(available);
            let missing = (end - start) - available.len();
            if missing > 0 {
                log::debug!(
                    "Padding {} samples of silence after {:.3}s",
                    missing,
                    segment.end_time
                );
                out.pad_silence(missing);
            }
        }

        log::info!(
            "Spliced audio: {:.3}s of {:.3}s kept",
            out.duration(),
            audio.duration()
        );
        out
    }
}
