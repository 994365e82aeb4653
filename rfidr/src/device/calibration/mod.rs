// rfidr-rs/rfidr/src/device/calibration/mod.rs
//! TX DC-offset calibration.
//!
//! A strategy picks the modulator offset pair (`sdm`, `zgn`) that minimises
//! the transmit leakage seen by the board's power detector. Strategies are
//! chosen through [`CalibrationStrategy`] and built by
//! [`create_calibrator`].

use crate::device::Radio;
use crate::Result;

mod brute;
mod gradient;

pub use brute::BruteForce;
pub use gradient::Gradient;

/// Offsets chosen by a calibration run and the leakage they produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOutcome {
    pub sdm: u8,
    pub zgn: u8,
    pub sample: u16,
    /// Search steps taken; the full sweep counts every pair.
    pub iterations: usize,
}

pub trait TxCalibrator {
    /// Search the offset space and leave the radio programmed with the
    /// chosen pair and the amplifier off.
    fn calibrate(&self, radio: &mut Radio) -> Result<CalibrationOutcome>;

    /// Diagnostic line reported to the host after a run.
    fn summary(&self, outcome: &CalibrationOutcome) -> String;
}

/// Selectable calibration strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationStrategy {
    /// Sweep all 16x16 pairs.
    #[default]
    #[display(fmt = "brute-force")]
    BruteForce,
    /// Four-neighbour descent from a fixed start.
    #[display(fmt = "gradient")]
    Gradient,
}

pub fn create_calibrator(strategy: CalibrationStrategy) -> Box<dyn TxCalibrator> {
    match strategy {
        CalibrationStrategy::BruteForce => Box::new(BruteForce::new()),
        CalibrationStrategy::Gradient => Box::new(Gradient::new()),
    }
}

/// One leakage measurement: program the offsets, key the amplifier just
/// long enough for a conversion.
pub(crate) fn measure(radio: &mut Radio, sdm: u8, zgn: u8) -> Result<u16> {
    radio.set_tx_offsets(sdm, zgn)?;
    radio.board().set_pa(true)?;
    let sample = radio.sample_leakage();
    radio.board().set_pa(false)?;
    sample
}
