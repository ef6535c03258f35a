//! Container side of the pipeline.

use std::path::Path;

use crate::core::config::StreamConfig;
use crate::core::error::WriterError;
use crate::core::time::Rational;
use crate::export::encoder::{EncodedUnit, Encoder};
use crate::frame::buffers::AlignedDimensions;
use crate::frame::convert::FrameConverter;

/// Container with a single video stream
pub trait Muxer {
    /// Write the container header and return the time base the container
    /// settled on for the stream, which may differ from the one requested.
    fn write_header(&mut self) -> Result<Rational, WriterError>;

    /// Write one unit; units are stored in the order they are written.
    fn write_unit(&mut self, unit: EncodedUnit) -> Result<(), WriterError>;

    fn write_trailer(&mut self) -> Result<(), WriterError>;
}

/// Factory for the collaborators a writer drives.
///
/// The writer asks for the muxer first, then the encoder (with the time base
/// the muxer reported), then the converter.
pub trait Backend {
    type Muxer: Muxer;
    type Encoder: Encoder;
    type Converter: FrameConverter;

    /// Create the output container and its video stream at `path`.
    fn create_muxer(&mut self, path: &Path, config: &StreamConfig) -> Result<Self::Muxer, WriterError>;

    fn open_encoder(&mut self, config: &StreamConfig, time_base: Rational) -> Result<Self::Encoder, WriterError>;

    fn create_converter(
        &mut self,
        config: &StreamConfig,
        aligned: AlignedDimensions,
    ) -> Result<Self::Converter, WriterError>;
}
