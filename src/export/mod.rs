pub mod drain;
pub mod encoder;
pub mod muxer;
pub mod writer;

#[cfg(test)]
pub(crate) mod mock;

pub use drain::{encode_and_drain, DrainReport};
pub use encoder::{AcceptOutcome, EncodedUnit, Encoder, EncoderInput, ProduceOutcome, VideoFrame};
pub use muxer::{Backend, Muxer};
pub use writer::{Lifecycle, VideoWriter};
