//! Synthesized media files for adapter and pipeline tests.

use std::path::Path;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::video::domain::audio_writer::AudioWriter;

use super::ffmpeg_audio_writer::FfmpegAudioWriter;

pub(crate) struct TestVideo {
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub fps: i32,
    pub audio_rate: Option<u32>,
}

impl TestVideo {
    pub fn new(frames: usize, width: u32, height: u32, fps: i32) -> Self {
        Self {
            frames,
            width,
            height,
            fps,
            audio_rate: None,
        }
    }

    /// Adds a mono sine track as long as the video.
    pub fn with_audio(mut self, sample_rate: u32) -> Self {
        self.audio_rate = Some(sample_rate);
        self
    }
}

/// Frame `i` is a flat gray of value `(i * 40) % 256`.
pub(crate) fn create_test_video(path: &Path, video: &TestVideo) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();

    let time_base = ffmpeg_next::Rational(1, video.fps);
    encoder_ctx.set_width(video.width);
    encoder_ctx.set_height(video.height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(time_base);
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(video.fps, 1)));
    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder_ctx
        .open_with(ffmpeg_next::Dictionary::new())
        .unwrap();
    ost.set_parameters(&encoder);
    ost.set_time_base(time_base);

    octx.write_header().unwrap();
    let ost_time_base = octx.stream(0).unwrap().time_base();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        video.width,
        video.height,
        ffmpeg_next::format::Pixel::YUV420P,
        video.width,
        video.height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .unwrap();

    let write_packets = |encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
                         octx: &mut ffmpeg_next::format::context::Output| {
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(time_base, ost_time_base);
            encoded.write_interleaved(octx).unwrap();
        }
    };

    for i in 0..video.frames {
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            video.width,
            video.height,
        );
        let value = ((i * 40) % 256) as u8;
        rgb_frame.data_mut(0).fill(value);

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
        yuv_frame.set_pts(Some(i as i64));

        encoder.send_frame(&yuv_frame).unwrap();
        write_packets(&mut encoder, &mut octx);
    }

    encoder.send_eof().unwrap();
    write_packets(&mut encoder, &mut octx);
    octx.write_trailer().unwrap();
    drop(octx);

    if let Some(rate) = video.audio_rate {
        let seconds = video.frames as f64 / video.fps as f64;
        let count = (seconds * rate as f64).round() as usize;
        let samples = (0..count)
            .map(|n| (n as f32 * 440.0 * std::f32::consts::TAU / rate as f32).sin() * 0.3)
            .collect();
        FfmpegAudioWriter
            .write_audio(path, &AudioSegment::new(samples, rate, 1))
            .unwrap();
    }
}
