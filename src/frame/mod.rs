pub mod buffers;
pub mod convert;

pub use buffers::{AlignedDimensions, FrameBuffers, Plane};
pub use convert::{FrameConverter, SoftwareConverter};
