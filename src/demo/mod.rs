//! Synthetic input used by the demo binary and the FFmpeg tests.

pub mod pattern;

pub use pattern::fill_frame_rgb;
