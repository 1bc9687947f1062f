use crate::audio::domain::audio_segment::AudioSegment;
use std::path::Path;

/// Domain interface for decoding the audio track of a media file.
pub trait AudioReader: Send {
    /// Decode the best audio track to interleaved PCM at its native sample
    /// rate and channel count. Returns None if the file has no audio track.
    fn read_audio(&self, path: &Path) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;

    /// Return the audio sample rate and channel count without decoding.
    fn audio_metadata(&self, path: &Path)
        -> Result<Option<(u32, u16)>, Box<dyn std::error::Error>>;
}
