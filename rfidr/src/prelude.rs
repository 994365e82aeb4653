// rfidr-rs/rfidr/src/prelude.rs

pub use crate::config::ReaderConfig;
pub use crate::device::{CalibrationStrategy, Radio, TxCalibrator};
pub use crate::reader::{Reader, ReaderBuilder, ReaderState};
pub use crate::transport::{Board, HostCommand, HostField, HostLink, RegisterBus};
pub use crate::{
    Channel, Epc, ProgramContent, ReadFields, ReaderFault, Result, SearchTarget, Session,
    TagReadResult,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms};
