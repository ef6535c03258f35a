//! libavformat output with a single video stream.

use std::ffi::c_int;
use std::path::Path;

use ffmpeg_next::codec::{self, packet};
use ffmpeg_next::ffi::{AVMediaType, AVPixelFormat, AVRational};
use ffmpeg_next::format::{self, context::Output};
use ffmpeg_next::Packet;

use crate::core::config::StreamConfig;
use crate::core::error::WriterError;
use crate::core::time::Rational;
use crate::export::encoder::EncodedUnit;
use crate::export::muxer::Muxer;

/// Output file plus the index of its video stream
pub struct FfmpegMuxer {
    output: Output,
    stream_index: usize,
}

impl FfmpegMuxer {
    /// Open `path` and declare the video stream.
    ///
    /// The stream asks for one tick per frame; the container may pick a finer
    /// time base when the header is written.
    pub fn create(path: &Path, container: &str, codec: codec::Id, config: &StreamConfig) -> Result<Self, WriterError> {
        let mut output = format::output_as(path, container)
            .map_err(|e| WriterError::resource("output file", format!("{}: {}", path.display(), e)))?;

        let mut stream = output
            .add_stream(ffmpeg_next::encoder::find(codec))
            .map_err(|e| WriterError::resource("video stream", e))?;
        let stream_index = stream.index();
        stream.set_time_base(Rational::frame_duration(config.frame_rate));

        // Declare what the encoder will produce; the encoder is opened only
        // after the header, with whatever time base the container settles on.
        unsafe {
            let square = AVRational { num: 1, den: 1 };
            (*stream.as_mut_ptr()).sample_aspect_ratio = square;

            let parameters = stream.parameters().as_mut_ptr();
            (*parameters).codec_type = AVMediaType::AVMEDIA_TYPE_VIDEO;
            (*parameters).codec_id = codec.into();
            (*parameters).format = AVPixelFormat::AV_PIX_FMT_YUV420P as c_int;
            (*parameters).width = config.width as c_int;
            (*parameters).height = config.height as c_int;
            (*parameters).bit_rate = config.bit_rate as i64;
            (*parameters).sample_aspect_ratio = square;
        }

        Ok(Self { output, stream_index })
    }
}

impl Muxer for FfmpegMuxer {
    fn write_header(&mut self) -> Result<Rational, WriterError> {
        self.output
            .write_header()
            .map_err(|e| WriterError::Io(format!("cannot write header: {}", e)))?;

        // Only valid after the header: muxers adjust the time base there.
        self.output
            .stream(self.stream_index)
            .map(|stream| Rational::from(stream.time_base()))
            .ok_or_else(|| WriterError::Io("video stream disappeared from the container".to_string()))
    }

    fn write_unit(&mut self, unit: EncodedUnit) -> Result<(), WriterError> {
        let mut packet = Packet::copy(&unit.data);
        packet.set_stream(self.stream_index);
        packet.set_position(-1);
        packet.set_pts(unit.pts);
        packet.set_dts(unit.dts);
        if unit.keyframe {
            packet.set_flags(packet::Flags::KEY);
        }

        packet
            .write_interleaved(&mut self.output)
            .map_err(|e| WriterError::Io(format!("cannot write packet: {}", e)))
    }

    fn write_trailer(&mut self) -> Result<(), WriterError> {
        self.output
            .write_trailer()
            .map_err(|e| WriterError::Io(format!("cannot write trailer: {}", e)))
    }
}
