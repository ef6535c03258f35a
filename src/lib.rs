//! Frame-by-frame video file writer.
//!
//! Raw RGB frames go in, are converted to planar YUV 4:2:0, compressed and
//! muxed into a single-stream container. The pipeline is generic over a
//! [`Backend`](export::Backend); the `ffmpeg` feature provides the real one.

pub mod core;
pub mod demo;
pub mod export;
pub mod frame;

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;

pub use crate::core::{ConfigError, ConversionError, PixelFormat, Rational, StreamConfig, WriterError};
pub use crate::export::{Backend, VideoWriter};

#[cfg(feature = "ffmpeg")]
pub use crate::ffmpeg::FfmpegBackend;
