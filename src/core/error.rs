//! Error types shared by the whole pipeline.

use crate::core::config::PixelFormat;
use crate::core::time::Rational;

/// Rejected configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(u32),
    #[error("Bit rate must be positive")]
    InvalidBitRate,
    #[error("Unsupported pixel format: {0:?}")]
    UnsupportedPixelFormat(PixelFormat),
    #[error("Invalid stream time base: {0}")]
    InvalidTimeBase(Rational),
    #[error("Stream time base {time_base} is too coarse for {frame_rate} fps")]
    TimeBaseTooCoarse { time_base: Rational, frame_rate: u32 },
}

/// Error type for pixel format conversion
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Unsupported conversion: {0}")]
    Unsupported(String),
    #[error("Buffer does not match {width}x{height}: {detail}")]
    DimensionMismatch { width: u32, height: u32, detail: String },
    #[error("Conversion backend error: {0}")]
    Backend(String),
}

/// Error type for every writer operation
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to acquire {resource}: {reason}")]
    Resource { resource: &'static str, reason: String },
    #[error("Container write failed: {0}")]
    Io(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Encoder made no progress after {attempts} attempts")]
    EncoderStalled { attempts: u32 },
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Writer already finalized")]
    Finalized,
}

impl WriterError {
    pub fn resource(resource: &'static str, reason: impl ToString) -> Self {
        WriterError::Resource {
            resource,
            reason: reason.to_string(),
        }
    }
}
