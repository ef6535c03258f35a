//! In-memory encoder, muxer and backend used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::rc::Rc;

use crate::core::config::StreamConfig;
use crate::core::error::WriterError;
use crate::core::time::{Pts, Rational};
use crate::export::encoder::{AcceptOutcome, EncodedUnit, Encoder, EncoderInput, ProduceOutcome};
use crate::export::muxer::{Backend, Muxer};
use crate::frame::buffers::{AlignedDimensions, Plane};
use crate::frame::convert::SoftwareConverter;

/// Frame as seen by the mock encoder when it accepted it
#[derive(Debug, Clone)]
pub struct AcceptedFrame {
    pub index: u64,
    pub pts: Pts,
    pub planes: [Plane; 3],
}

/// Look-ahead encoder model.
///
/// Accepted frames wait in a queue of `delay` entries before their unit
/// becomes available. Frames listed in `full_once` are refused the first time
/// they are offered, and the refusal pushes the whole queue out as ready units.
#[derive(Debug, Default)]
pub struct MockEncoderState {
    pub delay: usize,
    pub alignment: u32,
    pub full_once: HashSet<u64>,
    pub always_full: bool,
    pub fatal_on: Option<u64>,
    pub accept_calls: u64,
    pub produced: u64,
    pub accepted: Vec<AcceptedFrame>,
    lookahead: VecDeque<EncodedUnit>,
    ready: VecDeque<EncodedUnit>,
    end_of_stream: bool,
}

impl MockEncoderState {
    pub fn with_delay(delay: usize) -> Self {
        Self {
            delay,
            alignment: 1,
            ..Default::default()
        }
    }

    pub fn accept(&mut self, input: &EncoderInput<'_>) -> AcceptOutcome {
        self.accept_calls += 1;
        if self.end_of_stream {
            return AcceptOutcome::Fatal("input after end of stream".to_string());
        }
        if self.always_full {
            return AcceptOutcome::Full;
        }

        match input {
            EncoderInput::Frame(frame) => {
                if self.fatal_on == Some(frame.index) {
                    return AcceptOutcome::Fatal(format!("cannot encode frame {}", frame.index));
                }
                if self.full_once.remove(&frame.index) {
                    self.ready.extend(self.lookahead.drain(..));
                    return AcceptOutcome::Full;
                }
                self.accepted.push(AcceptedFrame {
                    index: frame.index,
                    pts: frame.pts,
                    planes: frame.planes.clone(),
                });
                self.lookahead.push_back(EncodedUnit {
                    data: frame.index.to_le_bytes().to_vec(),
                    pts: Some(frame.pts),
                    dts: Some(frame.pts),
                    keyframe: frame.index % 10 == 0,
                });
                while self.lookahead.len() > self.delay {
                    if let Some(unit) = self.lookahead.pop_front() {
                        self.ready.push_back(unit);
                    }
                }
            }
            EncoderInput::EndOfStream => {
                self.end_of_stream = true;
            }
        }
        AcceptOutcome::Accepted
    }

    pub fn produce(&mut self) -> ProduceOutcome {
        if self.ready.is_empty() && self.end_of_stream {
            self.ready.extend(self.lookahead.drain(..));
        }
        match self.ready.pop_front() {
            Some(unit) => {
                self.produced += 1;
                ProduceOutcome::Unit(unit)
            }
            None if self.end_of_stream => ProduceOutcome::Exhausted,
            None => ProduceOutcome::NeedInput,
        }
    }

    /// Units accepted but not yet handed out
    pub fn pending(&self) -> usize {
        self.lookahead.len() + self.ready.len()
    }
}

#[derive(Debug, Default)]
pub struct MockMuxerState {
    pub time_base: Option<Rational>,
    pub headers: u32,
    pub units: Vec<EncodedUnit>,
    pub trailers: u32,
    pub failing_trailers: u32,
    pub fail_units: bool,
}

impl MockMuxerState {
    /// Frame indices of the written units, in write order
    pub fn unit_indices(&self) -> Vec<u64> {
        self.units
            .iter()
            .map(|unit| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&unit.data);
                u64::from_le_bytes(bytes)
            })
            .collect()
    }
}

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

pub struct MockEncoder {
    state: Shared<MockEncoderState>,
    drops: Shared<Vec<&'static str>>,
}

impl MockEncoder {
    pub fn new(state: Shared<MockEncoderState>) -> Self {
        Self {
            state,
            drops: shared(Vec::new()),
        }
    }
}

impl Encoder for MockEncoder {
    fn align_dimensions(&self, width: u32, height: u32) -> AlignedDimensions {
        let alignment = self.state.borrow().alignment.max(1);
        AlignedDimensions::new(width.div_ceil(alignment) * alignment, height.div_ceil(alignment) * alignment)
    }

    fn accept(&mut self, input: &EncoderInput<'_>) -> AcceptOutcome {
        self.state.borrow_mut().accept(input)
    }

    fn produce(&mut self) -> ProduceOutcome {
        self.state.borrow_mut().produce()
    }
}

impl Drop for MockEncoder {
    fn drop(&mut self) {
        self.drops.borrow_mut().push("encoder");
    }
}

pub struct MockMuxer {
    state: Shared<MockMuxerState>,
    requested: Rational,
    drops: Shared<Vec<&'static str>>,
}

impl MockMuxer {
    pub fn new(state: Shared<MockMuxerState>, requested: Rational) -> Self {
        Self {
            state,
            requested,
            drops: shared(Vec::new()),
        }
    }
}

impl Muxer for MockMuxer {
    fn write_header(&mut self) -> Result<Rational, WriterError> {
        let mut state = self.state.borrow_mut();
        state.headers += 1;
        Ok(state.time_base.unwrap_or(self.requested))
    }

    fn write_unit(&mut self, unit: EncodedUnit) -> Result<(), WriterError> {
        let mut state = self.state.borrow_mut();
        if state.fail_units {
            return Err(WriterError::Io("disk full".to_string()));
        }
        state.units.push(unit);
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), WriterError> {
        let mut state = self.state.borrow_mut();
        if state.failing_trailers > 0 {
            state.failing_trailers -= 1;
            return Err(WriterError::Io("trailer write failed".to_string()));
        }
        state.trailers += 1;
        Ok(())
    }
}

impl Drop for MockMuxer {
    fn drop(&mut self) {
        self.drops.borrow_mut().push("muxer");
    }
}

/// Number of times each factory method ran
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackendCalls {
    pub muxers: u32,
    pub encoders: u32,
    pub converters: u32,
}

pub struct MockBackend {
    pub encoder: Shared<MockEncoderState>,
    pub muxer: Shared<MockMuxerState>,
    pub drops: Shared<Vec<&'static str>>,
    pub calls: BackendCalls,
    pub fail_encoder: bool,
}

impl MockBackend {
    pub fn new(delay: usize) -> Self {
        Self {
            encoder: shared(MockEncoderState::with_delay(delay)),
            muxer: shared(MockMuxerState::default()),
            drops: shared(Vec::new()),
            calls: BackendCalls::default(),
            fail_encoder: false,
        }
    }
}

impl Backend for MockBackend {
    type Muxer = MockMuxer;
    type Encoder = MockEncoder;
    type Converter = SoftwareConverter;

    fn create_muxer(&mut self, _path: &Path, config: &StreamConfig) -> Result<MockMuxer, WriterError> {
        self.calls.muxers += 1;
        Ok(MockMuxer {
            state: self.muxer.clone(),
            requested: Rational::frame_duration(config.frame_rate),
            drops: self.drops.clone(),
        })
    }

    fn open_encoder(&mut self, _config: &StreamConfig, _time_base: Rational) -> Result<MockEncoder, WriterError> {
        self.calls.encoders += 1;
        if self.fail_encoder {
            return Err(WriterError::resource("encoder", "codec not found"));
        }
        Ok(MockEncoder {
            state: self.encoder.clone(),
            drops: self.drops.clone(),
        })
    }

    fn create_converter(
        &mut self,
        config: &StreamConfig,
        _aligned: AlignedDimensions,
    ) -> Result<SoftwareConverter, WriterError> {
        self.calls.converters += 1;
        Ok(SoftwareConverter::new(config.pixel_format, config.width, config.height)?)
    }
}
