//! Core types for the writer.
//!
//! This module provides the stream configuration, the time base and
//! timestamp arithmetic, and the error types used across the pipeline.

pub mod config;
pub mod error;
pub mod time;

// Re-export core data structures for easier access.
pub use config::{PixelFormat, StreamConfig};
pub use error::{ConfigError, ConversionError, WriterError};
pub use time::{Pts, Rational, TimestampAllocator};
