use std::path::Path;

use ffmpeg_next::format::context::Output;
use ffmpeg_next::software::scaling;
use ffmpeg_next::Rational;

use crate::shared::constants::{DEFAULT_CRF, DEFAULT_PRESET};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes video frames via ffmpeg-next into a video-only file.
///
/// Prefers libx264 at a constant rate factor; falls back to the built-in
/// MPEG4 encoder when ffmpeg was built without x264. YUV420P needs even
/// dimensions, so odd sizes lose their last row or column.
pub struct FfmpegWriter {
    crf: u8,
    preset: String,
    octx: Option<Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<scaling::Context>,
    width: u32,
    height: u32,
    time_base: Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: Rational(1, 25),
            frame_count: 0,
        }
    }

    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    pub fn with_preset(mut self, preset: &str) -> Self {
        self.preset = preset.to_string();
        self
    }

    pub fn frames_written(&self) -> usize {
        self.frame_count
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };
        let ost_time_base = octx
            .stream(0)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Output frame rate as a rational; 30 fps when the metadata has none.
fn frame_rate(fps: f64) -> Rational {
    if fps.is_finite() && fps > 0.0 {
        Rational::from(fps)
    } else {
        Rational(30, 1)
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let out_w = metadata.width & !1;
        let out_h = metadata.height & !1;
        if out_w == 0 || out_h == 0 {
            return Err(format!(
                "cannot encode {}x{} video",
                metadata.width, metadata.height
            )
            .into());
        }

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let (codec, options) = match ffmpeg_next::encoder::find_by_name("libx264") {
            Some(codec) => {
                let mut options = ffmpeg_next::Dictionary::new();
                options.set("crf", &self.crf.to_string());
                options.set("preset", &self.preset);
                (codec, options)
            }
            None => {
                log::warn!("libx264 not available, falling back to MPEG4");
                let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
                    .ok_or("no H.264 or MPEG4 encoder found")?;
                (codec, ffmpeg_next::Dictionary::new())
            }
        };

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let rate = frame_rate(metadata.fps);
        let time_base = rate.invert();

        encoder_ctx.set_width(out_w);
        encoder_ctx.set_height(out_h);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(rate));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(options)?;
        ost.set_parameters(&encoder);
        ost.set_time_base(time_base);

        octx.write_header()?;

        let scaler = scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            out_w,
            out_h,
            scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {}x{} @ {}/{} fps with {}",
            out_w,
            out_h,
            rate.numerator(),
            rate.denominator(),
            codec.name()
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.time_base = time_base;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler)) = (self.encoder.as_mut(), self.scaler.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "frame {} is {}x{}, writer expects {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = frame.stride();
        let dst = rgb_frame.data_mut(0);
        for (row, src_row) in frame.data().chunks(row_bytes).enumerate() {
            let dst_start = row * stride;
            dst[dst_start..dst_start + row_bytes].copy_from_slice(src_row);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
            log::debug!("Encoder closed after {} frames", self.frame_count);
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::domain::video_reader::VideoReader;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

    fn metadata(w: u32, h: u32, fps: f64) -> VideoMetadata {
        VideoMetadata {
            width: w,
            height: h,
            fps,
            total_frames: 0,
            duration: 0.0,
            codec: String::new(),
            has_audio: false,
            source_path: None,
        }
    }

    fn solid_frame(index: usize, w: u32, h: u32, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * 3) as usize], w, h, 3, index)
    }

    fn write_frames(path: &Path, meta: &VideoMetadata, count: usize) {
        let mut writer = FfmpegWriter::new();
        writer.open(path, meta).unwrap();
        for i in 0..count {
            writer
                .write(&solid_frame(i, meta.width, meta.height, 128))
                .unwrap();
        }
        assert_eq!(writer.frames_written(), count);
        writer.close().unwrap();
    }

    #[test]
    fn test_roundtrip_preserves_frames_and_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.mp4");
        write_frames(&path, &metadata(160, 120, 25.0), 10);

        let mut reader = FfmpegReader::new();
        let read_meta = reader.open(&path).unwrap();
        assert_eq!(read_meta.width, 160);
        assert_eq!(read_meta.height, 120);
        assert!((read_meta.fps - 25.0).abs() < 0.01);

        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 10);

        // Lossy codec: brightness should stay close.
        let first = &frames[0];
        let avg: f64 =
            first.data().iter().map(|&b| b as f64).sum::<f64>() / first.data().len() as f64;
        assert!(
            (avg - 128.0).abs() < 40.0,
            "Average pixel value {avg} should be close to 128"
        );
    }

    #[test]
    fn test_odd_dimensions_are_rounded_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.mp4");
        write_frames(&path, &metadata(161, 121, 25.0), 2);

        let meta = FfmpegReader::new().open(&path).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.write(&solid_frame(0, 160, 120, 128)).is_err());
    }

    #[test]
    fn test_mismatched_frame_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 25.0)).unwrap();
        assert!(writer.write(&solid_frame(0, 80, 60, 0)).is_err());
        writer.close().unwrap();
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        write_frames(&path, &metadata(160, 120, 30.0), 1);

        let mut writer = FfmpegWriter::new().with_crf(23).with_preset("fast");
        writer.open(&path, &metadata(160, 120, 30.0)).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }
}
