//! libavcodec video encoder.

use std::ffi::c_int;

use ffmpeg_next::codec::{self, encoder};
use ffmpeg_next::format::Pixel;
use ffmpeg_next::util::error::EAGAIN;
use ffmpeg_next::util::frame;
use ffmpeg_next::{ffi, Dictionary, Error as AvError, Packet};
use tracing::debug;

use crate::core::config::StreamConfig;
use crate::core::error::WriterError;
use crate::core::time::Rational;
use crate::export::encoder::{AcceptOutcome, EncodedUnit, Encoder, EncoderInput, ProduceOutcome, VideoFrame};
use crate::frame::buffers::{chroma_extent, copy_rows, AlignedDimensions};

/// Opened encoder plus the frame it reads planar input from
pub struct FfmpegEncoder {
    encoder: encoder::video::Encoder,
    frame: frame::Video,
    width: u32,
    height: u32,
}

impl FfmpegEncoder {
    /// Open `codec` for YUV 4:2:0 input timed in `time_base`.
    ///
    /// `time_base` is the stream's, so encoded timestamps need no rescaling.
    pub fn open(codec: codec::Id, config: &StreamConfig, time_base: Rational) -> Result<Self, WriterError> {
        let codec = encoder::find(codec)
            .ok_or_else(|| WriterError::resource("encoder", format!("no encoder for {:?}", codec)))?;

        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| WriterError::resource("encoder", e))?;
        video.set_width(config.width);
        video.set_height(config.height);
        video.set_format(Pixel::YUV420P);
        video.set_time_base(time_base);
        video.set_frame_rate(Some(ffmpeg_next::Rational::new(config.frame_rate as i32, 1)));

        let mut options = Dictionary::new();
        options.set("b", &config.bit_rate.to_string());

        let encoder = video
            .open_with(options)
            .map_err(|e| WriterError::resource("encoder", format!("cannot open {}: {}", codec.name(), e)))?;
        debug!("opened encoder {} with time base {}", codec.name(), time_base);

        Ok(Self {
            encoder,
            frame: frame::Video::new(Pixel::YUV420P, config.width, config.height),
            width: config.width,
            height: config.height,
        })
    }

    /// Copy the converted planes into the encoder's frame.
    fn load(&mut self, input: &VideoFrame<'_>) -> Result<(), String> {
        if input.width != self.width || input.height != self.height {
            return Err(format!(
                "frame is {}x{}, encoder expects {}x{}",
                input.width, input.height, self.width, self.height
            ));
        }

        // The encoder may still reference the previous frame's buffers.
        let ret = unsafe { ffi::av_frame_make_writable(self.frame.as_mut_ptr()) };
        if ret < 0 {
            return Err(AvError::from(ret).to_string());
        }

        let luma = (self.width as usize, self.height as usize);
        let chroma = (chroma_extent(self.width) as usize, chroma_extent(self.height) as usize);
        for (index, (row_bytes, rows)) in [luma, chroma, chroma].into_iter().enumerate() {
            let plane = &input.planes[index];
            let stride = self.frame.stride(index);
            copy_rows(plane.data(), plane.stride(), self.frame.data_mut(index), stride, row_bytes, rows);
        }
        self.frame.set_pts(Some(input.pts));
        Ok(())
    }
}

impl Encoder for FfmpegEncoder {
    fn align_dimensions(&self, width: u32, height: u32) -> AlignedDimensions {
        let mut aligned_width = width as c_int;
        let mut aligned_height = height as c_int;
        // Only reads the codec and pixel format from the context.
        unsafe {
            ffi::avcodec_align_dimensions(
                self.encoder.as_ptr() as *mut ffi::AVCodecContext,
                &mut aligned_width,
                &mut aligned_height,
            );
        }
        AlignedDimensions::new(aligned_width.max(0) as u32, aligned_height.max(0) as u32)
    }

    fn accept(&mut self, input: &EncoderInput<'_>) -> AcceptOutcome {
        let result = match input {
            EncoderInput::Frame(frame) => {
                if let Err(reason) = self.load(frame) {
                    return AcceptOutcome::Fatal(reason);
                }
                self.encoder.send_frame(&self.frame)
            }
            EncoderInput::EndOfStream => self.encoder.send_eof(),
        };

        match result {
            Ok(()) => AcceptOutcome::Accepted,
            Err(AvError::Other { errno }) if errno == EAGAIN => AcceptOutcome::Full,
            Err(e) => AcceptOutcome::Fatal(e.to_string()),
        }
    }

    fn produce(&mut self) -> ProduceOutcome {
        let mut packet = Packet::empty();
        match self.encoder.receive_packet(&mut packet) {
            Ok(()) => ProduceOutcome::Unit(EncodedUnit {
                data: packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
                pts: packet.pts(),
                dts: packet.dts(),
                keyframe: packet.is_key(),
            }),
            Err(AvError::Other { errno }) if errno == EAGAIN => ProduceOutcome::NeedInput,
            Err(AvError::Eof) => ProduceOutcome::Exhausted,
            Err(e) => ProduceOutcome::Fatal(e.to_string()),
        }
    }
}
