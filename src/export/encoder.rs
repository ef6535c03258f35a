//! Encoder protocol driven by the writer.
//!
//! An encoder buffers frames internally: it may take a frame without emitting
//! anything yet, and it may refuse a frame until its pending output has been
//! collected. Both sides of that exchange are modelled as tagged outcomes.

use crate::core::time::Pts;
use crate::frame::buffers::{AlignedDimensions, Plane};

/// A converted frame ready for compression.
///
/// `planes` are the writer's reusable YUV 4:2:0 buffers; encoders copy what
/// they need before `accept` returns.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub index: u64,   // 0-based position in the stream
    pub pts: Pts,
    pub width: u32,
    pub height: u32,
    pub planes: &'a [Plane; 3],
}

/// What can be offered to [`Encoder::accept`]
#[derive(Debug, Clone, Copy)]
pub enum EncoderInput<'a> {
    Frame(VideoFrame<'a>),
    /// No frame will follow; the encoder should release everything it holds.
    EndOfStream,
}

impl EncoderInput<'_> {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, EncoderInput::EndOfStream)
    }
}

/// Compressed payload for one frame, in stream time-base ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedUnit {
    pub data: Vec<u8>,
    pub pts: Option<Pts>,
    pub dts: Option<Pts>,
    pub keyframe: bool,
}

/// Result of offering input to the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The input now belongs to the encoder.
    Accepted,
    /// Pending output must be collected before this input can be taken.
    Full,
    Fatal(String),
}

/// Result of asking the encoder for output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProduceOutcome {
    Unit(EncodedUnit),
    /// Nothing more until another input (or the end-of-stream marker) arrives.
    NeedInput,
    /// End of stream reached and every unit has been handed out.
    Exhausted,
    Fatal(String),
}

/// Video encoder capability
pub trait Encoder {
    /// Frame size rounded up to the encoder's memory alignment
    fn align_dimensions(&self, width: u32, height: u32) -> AlignedDimensions;

    fn accept(&mut self, input: &EncoderInput<'_>) -> AcceptOutcome;

    fn produce(&mut self) -> ProduceOutcome;
}
