//! Per-stream configuration, fixed once a writer is opened.

use crate::core::error::ConfigError;

/// Layout of the pixel buffers handed to `submit_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Interleaved 8-bit red, green, blue.
    Rgb24,
    /// Single 8-bit luminance channel. Declared but not accepted by any writer.
    Mono8,
}

impl PixelFormat {
    /// Bytes occupied by one pixel in the caller's buffer.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24 => 3,
            PixelFormat::Mono8 => 1,
        }
    }
}

/// Stream settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,    // frames per second
    pub bit_rate: u64,      // bits per second
    pub pixel_format: PixelFormat,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 60,
            bit_rate: 1_000_000,  // 1 Mbps
            pixel_format: PixelFormat::Rgb24,
        }
    }
}

impl StreamConfig {
    pub fn new(width: u32, height: u32, frame_rate: u32, bit_rate: u64, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            frame_rate,
            bit_rate,
            pixel_format,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Check the settings before any resource is acquired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        // the frame rate becomes the denominator of a signed 32-bit time base
        if self.frame_rate == 0 || i32::try_from(self.frame_rate).is_err() {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        if self.bit_rate == 0 {
            return Err(ConfigError::InvalidBitRate);
        }
        if self.pixel_format != PixelFormat::Rgb24 {
            return Err(ConfigError::UnsupportedPixelFormat(self.pixel_format));
        }
        Ok(())
    }

    /// Minimum caller line stride in bytes.
    pub fn min_line_stride(&self) -> usize {
        self.width as usize * self.pixel_format.bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = StreamConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_line_stride(), 640 * 3);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = StreamConfig::default().with_size(0, 48);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, height: 48 })
        ));

        let config = StreamConfig::default().with_size(64, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mono8_rejected() {
        let config = StreamConfig::default().with_pixel_format(PixelFormat::Mono8);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedPixelFormat(PixelFormat::Mono8))
        );
    }

    #[test]
    fn test_zero_rates_rejected() {
        assert_eq!(
            StreamConfig::default().with_frame_rate(0).validate(),
            Err(ConfigError::InvalidFrameRate(0))
        );
        assert_eq!(
            StreamConfig::default().with_frame_rate(u32::MAX).validate(),
            Err(ConfigError::InvalidFrameRate(u32::MAX))
        );
        assert!(StreamConfig::default().with_frame_rate(i32::MAX as u32).validate().is_ok());
        assert_eq!(
            StreamConfig::default().with_bit_rate(0).validate(),
            Err(ConfigError::InvalidBitRate)
        );
    }
}
