//! FFmpeg-backed implementation of the writer collaborators.
//! All unsafe FFmpeg code is isolated in this module.

pub mod encoder;
pub mod muxer;
pub mod scaler;

use std::path::Path;

use ffmpeg_next::codec;
use ffmpeg_next::util::log;
use tracing::debug;

use crate::core::config::{PixelFormat, StreamConfig};
use crate::core::error::WriterError;
use crate::core::time::Rational;
use crate::export::muxer::Backend;
use crate::export::writer::VideoWriter;
use crate::frame::buffers::AlignedDimensions;

pub use encoder::FfmpegEncoder;
pub use muxer::FfmpegMuxer;
pub use scaler::ScalerConverter;

impl From<Rational> for ffmpeg_next::Rational {
    fn from(value: Rational) -> Self {
        ffmpeg_next::Rational::new(value.num, value.den)
    }
}

impl From<ffmpeg_next::Rational> for Rational {
    fn from(value: ffmpeg_next::Rational) -> Self {
        Rational::new(value.numerator(), value.denominator())
    }
}

/// Container format and codec used for new writers
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    format: String,
    codec: codec::Id,
}

impl FfmpegBackend {
    /// Initialize FFmpeg and select MP4 with H.264.
    pub fn new() -> Result<Self, WriterError> {
        ffmpeg_next::init().map_err(|e| WriterError::resource("ffmpeg", e))?;
        log::set_level(log::Level::Warning);

        Ok(Self {
            format: "mp4".to_string(),
            codec: codec::Id::H264,
        })
    }

    /// Container short name as known to libavformat, e.g. `"mp4"` or `"matroska"`
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_codec(mut self, codec: codec::Id) -> Self {
        self.codec = codec;
        self
    }
}

impl Backend for FfmpegBackend {
    type Muxer = FfmpegMuxer;
    type Encoder = FfmpegEncoder;
    type Converter = ScalerConverter;

    fn create_muxer(&mut self, path: &Path, config: &StreamConfig) -> Result<FfmpegMuxer, WriterError> {
        debug!("creating {} container with {:?} stream", self.format, self.codec);
        FfmpegMuxer::create(path, &self.format, self.codec, config)
    }

    fn open_encoder(&mut self, config: &StreamConfig, time_base: Rational) -> Result<FfmpegEncoder, WriterError> {
        FfmpegEncoder::open(self.codec, config, time_base)
    }

    fn create_converter(
        &mut self,
        config: &StreamConfig,
        _aligned: AlignedDimensions,
    ) -> Result<ScalerConverter, WriterError> {
        Ok(ScalerConverter::new(config.pixel_format, config.width, config.height)?)
    }
}

impl VideoWriter<FfmpegBackend> {
    /// Open an H.264 MP4 writer at `path`.
    ///
    /// Settings are validated before FFmpeg is touched, so an invalid
    /// configuration never creates the output file.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        frame_rate: u32,
        bit_rate: u64,
        pixel_format: PixelFormat,
    ) -> Result<Self, WriterError> {
        let config = StreamConfig::new(width, height, frame_rate, bit_rate, pixel_format);
        config.validate()?;

        let mut backend = FfmpegBackend::new()?;
        VideoWriter::open(&mut backend, path, config)
    }
}
