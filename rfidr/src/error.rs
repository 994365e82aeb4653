// rfidr-rs/rfidr/src/error.rs

use thiserror::Error;

use crate::transport::{HostField, PeripheralEvent};
use crate::types::MemorySpace;

/// Which half of a bridge exchange stopped answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BridgePhase {
    #[display(fmt = "write")]
    Write,
    #[display(fmt = "read-back")]
    ReadBack,
}

/// Faults raised by the reader core.
///
/// Every operation returns `Result<T, ReaderFault>`; only the state machine
/// turns a fault into a forced state change.
#[derive(Error, Debug)]
pub enum ReaderFault {
    #[error("write verify failed in {space} memory at {address:#05x}: wrote {written:#04x}, read {read:#04x}")]
    WriteVerify {
        space: MemorySpace,
        address: u16,
        written: u8,
        read: u8,
    },

    #[error("sdr bridge busy: status={status:#04x}")]
    BridgeBusy { status: u8 },

    #[error("sdr bridge timed out during {phase}")]
    BridgeTimeout { phase: BridgePhase },

    #[error("sdr register {address:#04x} read back {actual:#04x} on every attempt, expected {expected:#04x}")]
    BridgeReadBack {
        address: u8,
        expected: u8,
        actual: u8,
    },

    #[error("control register {address} verify failed: read {read:#04x}")]
    ControlRegister { address: u8, read: u8 },

    #[error("read-back check mismatch after programming")]
    ReadCheck,

    #[error("waveform memory error: {0}")]
    WaveformMemory(String),

    #[error("36MHz clock {0}")]
    Clock(&'static str),

    #[error("inventoried more than {max} tags")]
    TooManyTags { max: usize },

    #[error("calibration search failed on every attempt")]
    CalibrationExhausted,

    #[error("no tags inventoried for tracking")]
    NoTagsFound,

    #[error("no channel passed the search")]
    NoPassingChannel,

    #[error("programming reached an undefined condition")]
    ProgramUndefined,

    #[error("timed out waiting for {0}")]
    EventTimeout(EventKind),

    #[error("host link error on {field}: {reason}")]
    Link { field: HostField, reason: String },

    #[error("frame format error: {0}")]
    FrameFormat(String),

    #[error("reader built without a {0}")]
    MissingComponent(&'static str),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<ReaderFault>,
    },
}

/// What a timed-out wait was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum EventKind {
    #[display(fmt = "{}", _0)]
    Peripheral(PeripheralEvent),
    #[display(fmt = "host ack on {}", _0)]
    HostAck(HostField),
}

impl ReaderFault {
    /// Two-digit code reported at the end of every diagnostic string.
    pub fn code(&self) -> u8 {
        match self {
            ReaderFault::WriteVerify { .. } => 1,
            ReaderFault::BridgeBusy { .. } => 2,
            ReaderFault::BridgeTimeout {
                phase: BridgePhase::Write,
            } => 3,
            ReaderFault::BridgeTimeout {
                phase: BridgePhase::ReadBack,
            } => 4,
            ReaderFault::BridgeReadBack { .. } => 5,
            ReaderFault::ReadCheck => 9,
            ReaderFault::WaveformMemory(_) => 10,
            ReaderFault::ControlRegister { .. } => 12,
            ReaderFault::Step { source, .. } => source.code(),
            _ => 13,
        }
    }

    /// The innermost fault, looking through any step annotations.
    pub fn root(&self) -> &ReaderFault {
        match self {
            ReaderFault::Step { source, .. } => source.root(),
            other => other,
        }
    }

    /// The outermost step annotation, if any.
    pub fn step_name(&self) -> Option<&'static str> {
        match self {
            ReaderFault::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Annotate a fallible step with a short description for the diagnostic.
pub trait StepExt<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T> StepExt<T> for Result<T> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|source| ReaderFault::Step {
            step,
            source: Box::new(source),
        })
    }
}

pub type Result<T> = std::result::Result<T, ReaderFault>;
