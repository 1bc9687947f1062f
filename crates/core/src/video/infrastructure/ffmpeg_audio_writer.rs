use std::path::Path;

use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::{ChannelLayout, Rational};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::constants::DEFAULT_AUDIO_BIT_RATE;
use crate::video::domain::audio_writer::AudioWriter;

/// Muxes audio into an existing video-only file using ffmpeg-next.
///
/// Copies the video stream untouched into a sibling temp file alongside
/// newly encoded AAC audio, then renames it over the original.
pub struct FfmpegAudioWriter;

impl AudioWriter for FfmpegAudioWriter {
    fn write_audio(
        &self,
        video_path: &Path,
        audio: &AudioSegment,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let temp_path = video_path.with_extension("mux.mp4");

        let mut ictx = ffmpeg_next::format::input(video_path)?;
        let mut octx = ffmpeg_next::format::output(&temp_path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let video_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream in source file")?;
        let video_src_idx = video_stream.index();
        let video_in_tb = video_stream.time_base();

        let mut ost_video =
            octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
        ost_video.set_parameters(video_stream.parameters());
        unsafe {
            (*ost_video.parameters().as_mut_ptr()).codec_tag = 0;
        }
        let video_ost_idx = ost_video.index();

        let aac_codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC)
            .ok_or("AAC encoder not found")?;
        let mut ost_audio = octx.add_stream(Some(aac_codec))?;
        let audio_ost_idx = ost_audio.index();

        let layout = ChannelLayout::default(i32::from(audio.channels()));
        let enc_time_base = Rational(1, audio.sample_rate() as i32);

        let mut audio_encoder = ffmpeg_next::codec::context::Context::new_with_codec(aac_codec)
            .encoder()
            .audio()?;
        audio_encoder.set_rate(audio.sample_rate() as i32);
        audio_encoder.set_channel_layout(layout);
        audio_encoder.set_format(Sample::F32(SampleType::Planar));
        audio_encoder.set_bit_rate(DEFAULT_AUDIO_BIT_RATE);
        audio_encoder.set_time_base(enc_time_base);
        if global_header {
            audio_encoder.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut audio_encoder = audio_encoder.open_as(aac_codec)?;
        ost_audio.set_parameters(&audio_encoder);
        ost_audio.set_time_base(enc_time_base);

        let frame_size = audio_encoder.frame_size() as usize;

        octx.write_header()?;

        let ost_video_tb = octx
            .stream(video_ost_idx)
            .ok_or("output video stream missing")?
            .time_base();
        let ost_audio_tb = octx
            .stream(audio_ost_idx)
            .ok_or("output audio stream missing")?
            .time_base();

        for (stream, mut packet) in ictx.packets() {
            if stream.index() != video_src_idx {
                continue;
            }
            packet.rescale_ts(video_in_tb, ost_video_tb);
            packet.set_position(-1);
            packet.set_stream(video_ost_idx);
            packet.write_interleaved(&mut octx)?;
        }

        let mut sink = PacketSink {
            octx: &mut octx,
            stream_idx: audio_ost_idx,
            enc_time_base,
            ost_time_base: ost_audio_tb,
        };
        encode_audio(&mut audio_encoder, audio, layout, frame_size, &mut sink)?;

        octx.write_trailer()?;

        drop(octx);
        drop(ictx);

        std::fs::rename(&temp_path, video_path)?;
        log::debug!(
            "Muxed {:.3}s of audio into {}",
            audio.duration(),
            video_path.display()
        );
        Ok(())
    }
}

/// Where encoded audio packets go.
struct PacketSink<'a> {
    octx: &'a mut Output,
    stream_idx: usize,
    enc_time_base: Rational,
    ost_time_base: Rational,
}

impl PacketSink<'_> {
    fn drain(
        &mut self,
        encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.stream_idx);
            encoded.rescale_ts(self.enc_time_base, self.ost_time_base);
            encoded.write_interleaved(&mut *self.octx)?;
        }
        Ok(())
    }
}

/// Splits interleaved samples into encoder-sized planar frames.
fn encode_audio(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    audio: &AudioSegment,
    layout: ChannelLayout,
    frame_size: usize,
    sink: &mut PacketSink<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let channels = audio.channels() as usize;
    let frame_size = if frame_size == 0 { 1024 } else { frame_size };
    let mut pts: i64 = 0;

    for chunk in audio.samples().chunks(frame_size * channels) {
        let frames_in_chunk = chunk.len() / channels;
        let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
            Sample::F32(SampleType::Planar),
            frames_in_chunk,
            layout,
        );
        frame.set_rate(audio.sample_rate());
        frame.set_pts(Some(pts));

        for ch in 0..channels {
            let plane = frame.plane_mut::<f32>(ch);
            for (dst, src) in plane
                .iter_mut()
                .zip(chunk.iter().skip(ch).step_by(channels))
            {
                *dst = *src;
            }
        }

        encoder.send_frame(&frame)?;
        sink.drain(encoder)?;

        pts += frames_in_chunk as i64;
    }

    encoder.send_eof()?;
    sink.drain(encoder)?;

    Ok(())
}
