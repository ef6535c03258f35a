//! Feed/drain loop between the encoder and the muxer.

use tracing::{error, trace};

use crate::core::error::WriterError;
use crate::export::encoder::{AcceptOutcome, Encoder, EncoderInput, ProduceOutcome};
use crate::export::muxer::Muxer;

/// Consecutive `Full` answers, each after a drain pass that yielded nothing,
/// before the encoder is declared stuck.
pub const MAX_STALLED_ACCEPTS: u32 = 16;

/// Consecutive empty drain passes tolerated after the end-of-stream marker.
pub const MAX_IDLE_FLUSH_PASSES: u32 = 100;

/// Summary of one `encode_and_drain` call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub units_written: u64,
    pub rejections: u32,
    pub exhausted: bool,
}

enum Pass {
    NeedInput { units: u64 },
    Exhausted,
}

/// Forward every unit the encoder is willing to emit right now.
fn drain_pass<E, M>(encoder: &mut E, muxer: &mut M, report: &mut DrainReport) -> Result<Pass, WriterError>
where
    E: Encoder + ?Sized,
    M: Muxer + ?Sized,
{
    let mut units = 0;
    loop {
        match encoder.produce() {
            ProduceOutcome::Unit(unit) => {
                trace!(pts = ?unit.pts, bytes = unit.data.len(), keyframe = unit.keyframe, "writing unit");
                muxer.write_unit(unit)?;
                units += 1;
                report.units_written += 1;
            }
            ProduceOutcome::NeedInput => return Ok(Pass::NeedInput { units }),
            ProduceOutcome::Exhausted => return Ok(Pass::Exhausted),
            ProduceOutcome::Fatal(reason) => {
                error!("encoder failed while producing output: {}", reason);
                return Err(WriterError::Encode(reason));
            }
        }
    }
}

/// Offer `input` until the encoder takes it, draining pending output
/// whenever it is refused.
fn offer<E, M>(
    encoder: &mut E,
    muxer: &mut M,
    input: &EncoderInput<'_>,
    report: &mut DrainReport,
) -> Result<(), WriterError>
where
    E: Encoder + ?Sized,
    M: Muxer + ?Sized,
{
    let mut stalled = 0;
    loop {
        match encoder.accept(input) {
            AcceptOutcome::Accepted => return Ok(()),
            AcceptOutcome::Full => {
                report.rejections += 1;
                match drain_pass(encoder, muxer, report)? {
                    Pass::Exhausted => {
                        return Err(WriterError::Encode(
                            "encoder exhausted while input was still pending".to_string(),
                        ));
                    }
                    Pass::NeedInput { units: 0 } => {
                        stalled += 1;
                        if stalled >= MAX_STALLED_ACCEPTS {
                            return Err(WriterError::EncoderStalled { attempts: stalled });
                        }
                    }
                    Pass::NeedInput { .. } => stalled = 0,
                }
            }
            AcceptOutcome::Fatal(reason) => {
                error!("encoder refused input: {}", reason);
                return Err(WriterError::Encode(reason));
            }
        }
    }
}

/// Hand `input` to the encoder and forward the resulting output to the muxer.
///
/// A refused input is retried after collecting the encoder's pending output,
/// so a frame is never dropped. `frames_accepted` is advanced when a frame
/// (not the end-of-stream marker) is taken. With [`EncoderInput::EndOfStream`]
/// this behaves like [`finish_stream`] on a stream that was never ended.
///
/// Every unit is written in production order before this function returns.
pub fn encode_and_drain<E, M>(
    encoder: &mut E,
    muxer: &mut M,
    input: &EncoderInput<'_>,
    frames_accepted: &mut u64,
) -> Result<DrainReport, WriterError>
where
    E: Encoder + ?Sized,
    M: Muxer + ?Sized,
{
    if input.is_end_of_stream() {
        let mut end_of_stream_sent = false;
        return finish_stream(encoder, muxer, &mut end_of_stream_sent);
    }

    let mut report = DrainReport::default();
    offer(encoder, muxer, input, &mut report)?;
    *frames_accepted += 1;

    match drain_pass(encoder, muxer, &mut report)? {
        Pass::NeedInput { .. } => Ok(report),
        Pass::Exhausted => Err(WriterError::Encode(
            "encoder reported end of stream before it was signalled".to_string(),
        )),
    }
}

/// Send the end-of-stream marker, unless `end_of_stream_sent` says it already
/// went through, and drain the encoder until it is exhausted.
///
/// The flag is set as soon as the marker is accepted, so a call that fails
/// while draining can be repeated and picks up with the remaining output.
pub fn finish_stream<E, M>(
    encoder: &mut E,
    muxer: &mut M,
    end_of_stream_sent: &mut bool,
) -> Result<DrainReport, WriterError>
where
    E: Encoder + ?Sized,
    M: Muxer + ?Sized,
{
    let mut report = DrainReport::default();
    if !*end_of_stream_sent {
        offer(encoder, muxer, &EncoderInput::EndOfStream, &mut report)?;
        *end_of_stream_sent = true;
    }

    let mut idle = 0;
    loop {
        match drain_pass(encoder, muxer, &mut report)? {
            Pass::Exhausted => {
                report.exhausted = true;
                return Ok(report);
            }
            Pass::NeedInput { units: 0 } => {
                idle += 1;
                if idle >= MAX_IDLE_FLUSH_PASSES {
                    return Err(WriterError::EncoderStalled { attempts: idle });
                }
            }
            Pass::NeedInput { .. } => idle = 0,
        }
    }
}
