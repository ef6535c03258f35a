//! RGB24 to planar YUV 4:2:0 conversion.

use crate::core::config::PixelFormat;
use crate::core::error::ConversionError;
use crate::frame::buffers::{chroma_extent, Plane};

/// Converts the interleaved source plane into the three planar targets in place.
///
/// Implementations are built once for a fixed source format and frame size.
pub trait FrameConverter {
    fn convert(&mut self, source: &Plane, targets: &mut [Plane; 3]) -> Result<(), ConversionError>;
}

/// Check that `source` and `targets` can hold a `width` x `height` frame.
pub fn check_buffers(
    source: &Plane,
    targets: &[Plane; 3],
    width: u32,
    height: u32,
) -> Result<(), ConversionError> {
    let mismatch = |detail: String| ConversionError::DimensionMismatch { width, height, detail };

    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (chroma_extent(width) as usize, chroma_extent(height) as usize);

    if source.stride() < 3 * w || source.rows() < h {
        return Err(mismatch(format!(
            "source plane is {} bytes x {} rows",
            source.stride(),
            source.rows()
        )));
    }
    if targets[0].stride() < w || targets[0].rows() < h {
        return Err(mismatch(format!(
            "luma plane is {} bytes x {} rows",
            targets[0].stride(),
            targets[0].rows()
        )));
    }
    for (index, plane) in targets[1..].iter().enumerate() {
        if plane.stride() < cw || plane.rows() < ch {
            return Err(mismatch(format!(
                "chroma plane {} is {} bytes x {} rows",
                index + 1,
                plane.stride(),
                plane.rows()
            )));
        }
    }
    Ok(())
}

/// Integer BT.601 (limited range) converter.
///
/// Each chroma sample is computed from the average colour of its 2x2 block;
/// blocks on the right and bottom edges of odd-sized frames use only the
/// pixels that exist.
#[derive(Debug, Clone)]
pub struct SoftwareConverter {
    width: u32,
    height: u32,
}

impl SoftwareConverter {
    pub fn new(source: PixelFormat, width: u32, height: u32) -> Result<Self, ConversionError> {
        if source != PixelFormat::Rgb24 {
            return Err(ConversionError::Unsupported(format!("{:?} to YUV420P", source)));
        }
        if width == 0 || height == 0 {
            return Err(ConversionError::DimensionMismatch {
                width,
                height,
                detail: "frame size must be positive".to_string(),
            });
        }
        Ok(Self { width, height })
    }
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[inline]
fn luma(r: i32, g: i32, b: i32) -> u8 {
    clamp_u8(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

#[inline]
fn chroma(r: i32, g: i32, b: i32) -> (u8, u8) {
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (clamp_u8(u), clamp_u8(v))
}

impl FrameConverter for SoftwareConverter {
    fn convert(&mut self, source: &Plane, targets: &mut [Plane; 3]) -> Result<(), ConversionError> {
        check_buffers(source, targets, self.width, self.height)?;

        let width = self.width as usize;
        let height = self.height as usize;
        let row_bytes = 3 * width;

        let [y_plane, u_plane, v_plane] = targets;

        for y in 0..height {
            let src = source.row(y, row_bytes);
            let dst = y_plane.row_mut(y, width);
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *out = luma(i32::from(px[0]), i32::from(px[1]), i32::from(px[2]));
            }
        }

        let chroma_width = chroma_extent(self.width) as usize;
        let chroma_height = chroma_extent(self.height) as usize;
        for cy in 0..chroma_height {
            let rows = (2 * cy)..(2 * cy + 2).min(height);
            for cx in 0..chroma_width {
                let cols = (2 * cx)..(2 * cx + 2).min(width);
                let (mut r, mut g, mut b, mut count) = (0i32, 0i32, 0i32, 0i32);
                for y in rows.clone() {
                    let src = source.row(y, row_bytes);
                    for x in cols.clone() {
                        r += i32::from(src[3 * x]);
                        g += i32::from(src[3 * x + 1]);
                        b += i32::from(src[3 * x + 2]);
                        count += 1;
                    }
                }
                let half = count / 2;
                let (u, v) = chroma((r + half) / count, (g + half) / count, (b + half) / count);
                u_plane.row_mut(cy, chroma_width)[cx] = u;
                v_plane.row_mut(cy, chroma_width)[cx] = v;
            }
        }

        Ok(())
    }
}
