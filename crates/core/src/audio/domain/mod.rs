pub mod audio_segment;
pub mod audio_splicer;
