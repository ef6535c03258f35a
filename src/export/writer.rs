//! Frame-by-frame writer producing a single-stream video file.
//!
//! Per submitted frame:
//! 1. Copy the caller's rows into the interleaved buffer (each side keeps its own stride)
//! 2. Convert to planar YUV 4:2:0 in place
//! 3. Stamp the frame with `pts(frame_count)`
//! 4. Feed the encoder and forward everything it emits to the muxer
//!
//! Closing sends the end-of-stream marker, drains the encoder until it is
//! exhausted, and writes the container trailer.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::config::StreamConfig;
use crate::core::error::WriterError;
use crate::core::time::{self, Rational, TimestampAllocator};
use crate::export::drain::{encode_and_drain, finish_stream};
use crate::export::encoder::{Encoder, EncoderInput, VideoFrame};
use crate::export::muxer::{Backend, Muxer};
use crate::frame::buffers::{AlignedDimensions, FrameBuffers};
use crate::frame::convert::FrameConverter;

/// Writer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Finalized,
}

/// Encodes raw RGB frames into a container file.
///
/// All resources are owned here. Fields drop in declaration order, which
/// releases the converter and buffers first, then the encoder, and the muxer
/// (and with it the output file) last.
pub struct VideoWriter<B: Backend> {
    converter: B::Converter,
    buffers: FrameBuffers,
    encoder: B::Encoder,
    muxer: B::Muxer,
    config: StreamConfig,
    timestamps: TimestampAllocator,
    frame_count: u64,
    lifecycle: Lifecycle,
    end_of_stream_sent: bool,
    encoder_drained: bool,
}

impl<B: Backend> VideoWriter<B> {
    /// Open `path` for writing and prepare every resource the stream needs.
    ///
    /// The configuration is validated before the backend is touched. If a
    /// later step fails, whatever was already acquired is released on return.
    pub fn open<P: AsRef<Path>>(backend: &mut B, path: P, config: StreamConfig) -> Result<Self, WriterError> {
        let path = path.as_ref();
        config.validate()?;

        info!(
            "opening {:?}: {}x{} @ {} fps, {} bit/s",
            path, config.width, config.height, config.frame_rate, config.bit_rate
        );

        let mut muxer = backend.create_muxer(path, &config)?;
        let time_base = muxer.write_header()?;
        if time_base != Rational::frame_duration(config.frame_rate) {
            debug!("muxer set stream time base to {}", time_base);
        }
        let timestamps = TimestampAllocator::new(config.frame_rate, time_base)?;

        let encoder = backend.open_encoder(&config, time_base)?;

        let aligned = encoder.align_dimensions(config.width, config.height);
        if !aligned.covers(config.width, config.height) {
            return Err(WriterError::resource(
                "encoder alignment",
                format!(
                    "aligned size {}x{} is smaller than {}x{}",
                    aligned.width, aligned.height, config.width, config.height
                ),
            ));
        }
        if aligned.width != config.width || aligned.height != config.height {
            debug!("codec aligned frame size to {}x{}", aligned.width, aligned.height);
        }
        let buffers = FrameBuffers::allocate(aligned);

        let converter = backend.create_converter(&config, aligned)?;

        Ok(Self {
            converter,
            buffers,
            encoder,
            muxer,
            config,
            timestamps,
            frame_count: 0,
            lifecycle: Lifecycle::Open,
            end_of_stream_sent: false,
            encoder_drained: false,
        })
    }

    /// Encode one frame of `height` rows, each `line_stride` bytes apart.
    ///
    /// On error the writer stays open but the file should be treated as
    /// incomplete.
    pub fn submit_frame(&mut self, pixels: &[u8], line_stride: usize) -> Result<(), WriterError> {
        if self.lifecycle == Lifecycle::Finalized {
            return Err(WriterError::Finalized);
        }
        self.check_frame(pixels, line_stride)?;

        let StreamConfig { width, height, .. } = self.config;
        self.buffers.load_interleaved(pixels, line_stride, width, height);

        let (source, targets) = self.buffers.split_mut();
        self.converter.convert(source, targets)?;

        let index = self.frame_count;
        let pts = self.timestamps.pts(index);
        let input = EncoderInput::Frame(VideoFrame {
            index,
            pts,
            width,
            height,
            planes: self.buffers.planes(),
        });
        let report = encode_and_drain(&mut self.encoder, &mut self.muxer, &input, &mut self.frame_count)?;

        debug!(
            "frame {} (pts {}, {:.3}s): {} unit(s) written, {} rejection(s)",
            index,
            pts,
            time::to_seconds(pts, self.timestamps.time_base()),
            report.units_written,
            report.rejections
        );
        Ok(())
    }

    /// Flush the encoder and finalize the container.
    ///
    /// Calling this on a finalized writer does nothing. If it fails the
    /// writer stays open, and a later call resumes where this one stopped:
    /// the end-of-stream marker is sent at most once and the trailer is
    /// written after the encoder is exhausted.
    pub fn close(&mut self) -> Result<(), WriterError> {
        if self.lifecycle == Lifecycle::Finalized {
            return Ok(());
        }

        if !self.encoder_drained {
            let report = finish_stream(&mut self.encoder, &mut self.muxer, &mut self.end_of_stream_sent)?;
            self.encoder_drained = true;
            debug!("flushed {} buffered unit(s)", report.units_written);
        }

        self.muxer.write_trailer()?;
        self.lifecycle = Lifecycle::Finalized;

        info!("finalized after {} frame(s)", self.frame_count);
        Ok(())
    }

    fn check_frame(&self, pixels: &[u8], line_stride: usize) -> Result<(), WriterError> {
        let row_bytes = self.config.min_line_stride();
        if line_stride < row_bytes {
            return Err(WriterError::InvalidFrame(format!(
                "line stride {} is smaller than {} bytes per row",
                line_stride, row_bytes
            )));
        }
        let required = line_stride
            .checked_mul(self.config.height as usize - 1)
            .and_then(|bytes| bytes.checked_add(row_bytes))
            .ok_or_else(|| {
                WriterError::InvalidFrame(format!("line stride {} overflows the frame size", line_stride))
            })?;
        if pixels.len() < required {
            return Err(WriterError::InvalidFrame(format!(
                "{} bytes supplied, {} required",
                pixels.len(),
                required
            )));
        }
        Ok(())
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Frames accepted by the encoder so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn aligned_dimensions(&self) -> AlignedDimensions {
        self.buffers.aligned()
    }

    /// Stream time base chosen by the container
    pub fn time_base(&self) -> Rational {
        self.timestamps.time_base()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_finalized(&self) -> bool {
        self.lifecycle == Lifecycle::Finalized
    }
}

impl<B: Backend> Drop for VideoWriter<B> {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Open {
            if let Err(e) = self.close() {
                warn!("implicit close on drop failed: {}", e);
            }
        }
    }
}
