// rfidr-rs/rfidr/src/device/calibration/brute.rs

use log::{info, trace};

use super::{measure, CalibrationOutcome, TxCalibrator};
use crate::constants::{BRUTE_FORCE_FALLBACK, NO_SAMPLE, OFFSET_STEPS};
use crate::device::Radio;
use crate::Result;

/// Exhaustive sweep of every offset pair, keeping the first strict minimum.
pub struct BruteForce;

impl BruteForce {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BruteForce {
    fn default() -> Self {
        Self::new()
    }
}

impl TxCalibrator for BruteForce {
    fn calibrate(&self, radio: &mut Radio) -> Result<CalibrationOutcome> {
        let (mut sdm, mut zgn) = BRUTE_FORCE_FALLBACK;
        let mut best = NO_SAMPLE;
        for s in 0..OFFSET_STEPS {
            for z in 0..OFFSET_STEPS {
                let sample = measure(radio, s, z)?;
                trace!("offsets ({:2}, {:2}) -> {}", s, z, sample);
                if sample < best {
                    best = sample;
                    sdm = s;
                    zgn = z;
                }
            }
        }
        radio.board().set_pa(false)?;
        radio.set_tx_offsets(sdm, zgn)?;
        info!("brute-force calibration: sdm={} zgn={} sample={}", sdm, zgn, best);
        Ok(CalibrationOutcome {
            sdm,
            zgn,
            sample: best,
            iterations: usize::from(OFFSET_STEPS) * usize::from(OFFSET_STEPS),
        })
    }

    fn summary(&self, outcome: &CalibrationOutcome) -> String {
        format!(
            "CAL S:{:02} Z:{:02} O:{:04}",
            outcome.sdm, outcome.zgn, outcome.sample
        )
    }
}
