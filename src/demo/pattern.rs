//! Moving-disks test pattern.

use std::f64::consts::PI;

const BACKGROUND: u8 = 0x80;
const DISK_RADIUS: i32 = 15;
const DISKS_PER_ROW: i32 = 10;
const PERIOD: f64 = 120.0;  // frames per full oscillation

const RED: [u8; 3] = [0xFF, 0x00, 0x00];
const GREEN: [u8; 3] = [0x00, 0x80, 0x00];
const BLUE: [u8; 3] = [0x10, 0x10, 0xFF];

/// Draw frame `index` of the pattern into an RGB24 buffer.
///
/// A mid-gray background with three interleaved rows of ten disks; each disk
/// moves vertically on a sine whose phase depends on its column and row, so
/// consecutive frames differ everywhere. Bytes past `3 * width` in each row
/// are left untouched.
pub fn fill_frame_rgb(pixels: &mut [u8], line_stride: usize, width: u32, height: u32, index: u64) {
    let row_bytes = 3 * width as usize;
    for y in 0..height as usize {
        let start = y * line_stride;
        pixels[start..start + row_bytes].fill(BACKGROUND);
    }

    let t = 2.0 * PI * index as f64 / PERIOD;
    let center_y = |phase: f64| (height as f64 * (0.5 + 0.5 * (t + phase).sin())) as i32;

    for i in 0..DISKS_PER_ROW {
        let phase = f64::from(i) * PI / 10.0;
        let x = 20 + i * 50;
        let mut canvas = Canvas { pixels: &mut *pixels, line_stride, width, height };
        canvas.disk(x, center_y(phase), RED);
        canvas.disk(x + 10, center_y(phase + PI / 3.0), GREEN);
        canvas.disk(x + 20, center_y(phase + 2.0 * PI / 3.0), BLUE);
    }
}

struct Canvas<'a> {
    pixels: &'a mut [u8],
    line_stride: usize,
    width: u32,
    height: u32,
}

impl Canvas<'_> {
    /// Filled disk clipped to the frame
    fn disk(&mut self, cx: i32, cy: i32, color: [u8; 3]) {
        let r = DISK_RADIUS;
        let y_range = (cy - r).max(0)..=(cy + r).min(self.height as i32 - 1);
        let x_range = (cx - r).max(0)..=(cx + r).min(self.width as i32 - 1);

        for y in y_range {
            for x in x_range.clone() {
                if (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r {
                    let offset = y as usize * self.line_stride + 3 * x as usize;
                    self.pixels[offset..offset + 3].copy_from_slice(&color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 480;

    fn pixel(pixels: &[u8], stride: usize, x: usize, y: usize) -> [u8; 3] {
        let offset = y * stride + 3 * x;
        [pixels[offset], pixels[offset + 1], pixels[offset + 2]]
    }

    #[test]
    fn test_first_frame_layout() {
        let stride = 3 * WIDTH as usize;
        let mut pixels = vec![0; stride * HEIGHT as usize];
        fill_frame_rgb(&mut pixels, stride, WIDTH, HEIGHT, 0);

        // first red disk sits on the vertical middle at frame 0
        assert_eq!(pixel(&pixels, stride, 20, 240), RED);
        assert_eq!(pixel(&pixels, stride, 0, 0), [BACKGROUND; 3]);
        assert_eq!(pixel(&pixels, stride, 639, 479), [BACKGROUND; 3]);
    }

    #[test]
    fn test_frames_differ() {
        let stride = 3 * WIDTH as usize;
        let mut first = vec![0; stride * HEIGHT as usize];
        let mut second = first.clone();
        fill_frame_rgb(&mut first, stride, WIDTH, HEIGHT, 0);
        fill_frame_rgb(&mut second, stride, WIDTH, HEIGHT, 30);
        assert_ne!(first, second);
    }

    #[test]
    fn test_padding_untouched() {
        let stride = 3 * 64 + 5;
        let mut pixels = vec![0xEE; stride * 48];
        fill_frame_rgb(&mut pixels, stride, 64, 48, 7);

        for y in 0..48 {
            assert!(pixels[y * stride + 192..(y + 1) * stride].iter().all(|&b| b == 0xEE));
        }
    }

    #[test]
    fn test_small_frame_clips_disks() {
        // the nearest disk starts at x = 5
        let stride = 3 * 4;
        let mut pixels = vec![0; stride * 4];
        fill_frame_rgb(&mut pixels, stride, 4, 4, 0);
        assert!(pixels.iter().all(|&b| b == BACKGROUND));
    }
}
