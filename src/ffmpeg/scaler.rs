//! libswscale RGB24 to YUV420P conversion.

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame;

use crate::core::config::PixelFormat;
use crate::core::error::ConversionError;
use crate::frame::buffers::{chroma_extent, copy_rows, Plane};
use crate::frame::convert::{check_buffers, FrameConverter};

/// Converter backed by a bilinear swscale context.
///
/// Rows are staged through FFmpeg-owned frames so libswscale always sees
/// its own alignment, whatever the writer's plane strides are.
pub struct ScalerConverter {
    scaler: Scaler,
    source: frame::Video,
    target: frame::Video,
    width: u32,
    height: u32,
}

impl ScalerConverter {
    pub fn new(source: PixelFormat, width: u32, height: u32) -> Result<Self, ConversionError> {
        if source != PixelFormat::Rgb24 {
            return Err(ConversionError::Unsupported(format!("{:?} to YUV420P", source)));
        }

        let scaler = Scaler::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(|e| ConversionError::Backend(e.to_string()))?;

        Ok(Self {
            scaler,
            source: frame::Video::new(Pixel::RGB24, width, height),
            target: frame::Video::new(Pixel::YUV420P, width, height),
            width,
            height,
        })
    }
}

impl FrameConverter for ScalerConverter {
    fn convert(&mut self, source: &Plane, targets: &mut [Plane; 3]) -> Result<(), ConversionError> {
        check_buffers(source, targets, self.width, self.height)?;

        let width = self.width as usize;
        let height = self.height as usize;

        let stride = self.source.stride(0);
        copy_rows(source.data(), source.stride(), self.source.data_mut(0), stride, 3 * width, height);

        self.scaler
            .run(&self.source, &mut self.target)
            .map_err(|e| ConversionError::Backend(e.to_string()))?;

        let luma = (width, height);
        let chroma = (chroma_extent(self.width) as usize, chroma_extent(self.height) as usize);
        for (index, (row_bytes, rows)) in [luma, chroma, chroma].into_iter().enumerate() {
            let plane = &mut targets[index];
            let plane_stride = plane.stride();
            copy_rows(
                self.target.data(index),
                self.target.stride(index),
                plane.data_mut(),
                plane_stride,
                row_bytes,
                rows,
            );
        }
        Ok(())
    }
}
