//! Stream time bases and presentation timestamp allocation.
//! Timestamps are tick counts (i64) in the stream's time base.

use std::fmt;

use crate::core::error::ConfigError;

/// Presentation timestamp in stream time-base ticks
pub type Pts = i64;

/// Rational number of seconds per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Time base of one tick per frame at `frame_rate`
    pub fn frame_duration(frame_rate: u32) -> Self {
        Self::new(1, frame_rate as i32)
    }

    pub fn is_positive(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Convert a pts in `time_base` ticks to seconds
#[inline]
pub fn to_seconds(pts: Pts, time_base: Rational) -> f64 {
    pts as f64 * time_base.to_f64()
}

/// Derives frame timestamps from a frame counter.
///
/// `pts(n) = n * round((1 / frame_rate) / time_base)`. The tick count per
/// frame is rounded once, at construction, so consecutive frames are always
/// spaced by the same amount even when the container picked a time base that
/// does not divide the frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampAllocator {
    time_base: Rational,
    frame_rate: u32,
    ticks_per_frame: i64,
}

impl TimestampAllocator {
    pub fn new(frame_rate: u32, time_base: Rational) -> Result<Self, ConfigError> {
        if frame_rate == 0 {
            return Err(ConfigError::InvalidFrameRate(frame_rate));
        }
        if !time_base.is_positive() {
            return Err(ConfigError::InvalidTimeBase(time_base));
        }

        // round(den / (frame_rate * num)), half away from zero
        let divisor = i64::from(frame_rate) * i64::from(time_base.num);
        let ticks_per_frame = (2 * i64::from(time_base.den) + divisor) / (2 * divisor);
        if ticks_per_frame == 0 {
            return Err(ConfigError::TimeBaseTooCoarse { time_base, frame_rate });
        }

        Ok(Self {
            time_base,
            frame_rate,
            ticks_per_frame,
        })
    }

    /// Timestamp of the frame with 0-based index `frame_index`
    #[inline]
    pub fn pts(&self, frame_index: u64) -> Pts {
        frame_index as i64 * self.ticks_per_frame
    }

    pub fn ticks_per_frame(&self) -> i64 {
        self.ticks_per_frame
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }
}
