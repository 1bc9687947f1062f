use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::ChannelLayout;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::video::domain::audio_reader::AudioReader;

/// Decodes the best audio track of a file using ffmpeg-next, converting to
/// interleaved f32 at the track's own rate and channel count.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(&self, path: &Path) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let audio_stream_index = audio_stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let channels = (decoder.channels() as u16).max(1);
        let layout = input_layout(decoder.channel_layout(), channels);
        let sample_rate = decoder.rate();

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            layout,
            sample_rate,
            Sample::F32(SampleType::Packed),
            layout,
            sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut converted = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            if let Err(e) = decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable audio packet: {e}");
                continue;
            }

            while decoder.receive_frame(&mut decoded).is_ok() {
                fill_layout(&mut decoded, layout);
                resampler.run(&decoded, &mut converted)?;
                extract_interleaved(&converted, channels as usize, &mut samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            fill_layout(&mut decoded, layout);
            resampler.run(&decoded, &mut converted)?;
            extract_interleaved(&converted, channels as usize, &mut samples);
        }

        if let Ok(Some(delay)) = resampler.flush(&mut converted) {
            if delay.output > 0 {
                extract_interleaved(&converted, channels as usize, &mut samples);
            }
        }

        log::debug!(
            "Decoded {} samples of audio ({} Hz, {} ch) from {}",
            samples.len(),
            sample_rate,
            channels,
            path.display()
        );

        Ok(Some(AudioSegment::new(samples, sample_rate, channels)))
    }

    fn audio_metadata(
        &self,
        path: &Path,
    ) -> Result<Option<(u32, u16)>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let decoder = codec_ctx.decoder().audio()?;

        Ok(Some((decoder.rate(), (decoder.channels() as u16).max(1))))
    }
}

fn input_layout(layout: ChannelLayout, channels: u16) -> ChannelLayout {
    if layout.is_empty() {
        ChannelLayout::default(i32::from(channels))
    } else {
        layout
    }
}

/// Some decoders leave the layout unset on frames; the resampler rejects
/// frames whose layout differs from the one it was built with.
fn fill_layout(frame: &mut ffmpeg_next::util::frame::audio::Audio, layout: ChannelLayout) {
    if frame.channel_layout().is_empty() {
        frame.set_channel_layout(layout);
    }
}

/// Copies the samples of a packed f32 frame.
fn extract_interleaved(
    frame: &ffmpeg_next::util::frame::audio::Audio,
    channels: usize,
    out: &mut Vec<f32>,
) {
    let count = frame.samples() * channels;
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}
