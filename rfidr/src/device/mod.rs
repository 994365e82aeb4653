// rfidr-rs/rfidr/src/device/mod.rs
//! The radio peripheral as the reader core sees it: register access,
//! control bits, the SDR bridge, the frequency plan and TX offset
//! calibration.

pub mod calibration;
pub mod control;
pub mod frequency;
pub mod handle;
pub mod sdr;

pub use calibration::{create_calibrator, CalibrationOutcome, CalibrationStrategy, TxCalibrator};
pub use frequency::{next_channel, pdoa_candidates, skip_channel};
pub use handle::Radio;
pub use sdr::TxPower;
