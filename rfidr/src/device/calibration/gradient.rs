// rfidr-rs/rfidr/src/device/calibration/gradient.rs

use log::{debug, info};

use super::{measure, CalibrationOutcome, TxCalibrator};
use crate::constants::{GRADIENT_MAX_ITERATIONS, GRADIENT_START, NO_SAMPLE, OFFSET_STEPS};
use crate::device::Radio;
use crate::Result;

/// Four-neighbour descent. Keeps stepping in the current direction while
/// the leakage drops; when it stops dropping, probes the four neighbours
/// to pick a new direction and stops once none of them improves.
pub struct Gradient {
    max_iterations: usize,
}

impl Gradient {
    pub fn new() -> Self {
        Self {
            max_iterations: GRADIENT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new()
    }
}

/// Offsets wrap around the 4-bit range.
fn step(value: u8, delta: i8) -> u8 {
    (i16::from(value) + i16::from(delta)).rem_euclid(i16::from(OFFSET_STEPS)) as u8
}

/// Direction along one axis: up if `up` improves on `current`, else down if
/// `down` does, else stay.
fn direction(up: u16, down: u16, current: u16) -> i8 {
    if up < current {
        1
    } else if down < current {
        -1
    } else {
        0
    }
}

impl TxCalibrator for Gradient {
    fn calibrate(&self, radio: &mut Radio) -> Result<CalibrationOutcome> {
        let (mut sdm, mut zgn) = GRADIENT_START;
        let (mut dir_s, mut dir_z) = (1i8, 1i8);
        let mut result = NO_SAMPLE;
        let mut iterations = 0;

        while iterations <= self.max_iterations {
            iterations += 1;
            let (next_s, next_z) = (step(sdm, dir_s), step(zgn, dir_z));
            let sample = measure(radio, next_s, next_z)?;
            if sample < result {
                sdm = next_s;
                zgn = next_z;
                result = sample;
                debug!("gradient {:2}: ({:2}, {:2}) -> {}", iterations, sdm, zgn, result);
                continue;
            }

            let s_up = measure(radio, step(sdm, 1), zgn)?;
            let s_down = measure(radio, step(sdm, -1), zgn)?;
            let z_up = measure(radio, sdm, step(zgn, 1))?;
            let z_down = measure(radio, sdm, step(zgn, -1))?;
            dir_s = direction(s_up, s_down, result);
            dir_z = direction(z_up, z_down, result);
            if dir_s == 0 && dir_z == 0 {
                debug!("gradient {:2}: local minimum at ({}, {})", iterations, sdm, zgn);
                break;
            }

            sdm = step(sdm, dir_s);
            zgn = step(zgn, dir_z);
            result = measure(radio, sdm, zgn)?;
            debug!(
                "gradient {:2}: turned ({:+}, {:+}) to ({:2}, {:2}) -> {}",
                iterations, dir_s, dir_z, sdm, zgn, result
            );
        }

        radio.board().set_pa(false)?;
        radio.set_tx_offsets(sdm, zgn)?;
        info!(
            "gradient calibration: sdm={} zgn={} sample={} after {} iterations",
            sdm, zgn, result, iterations
        );
        Ok(CalibrationOutcome {
            sdm,
            zgn,
            sample: result,
            iterations,
        })
    }

    fn summary(&self, outcome: &CalibrationOutcome) -> String {
        format!(
            "S:{:02} Z:{:02} O:{:03} I:{:02}",
            outcome.sdm, outcome.zgn, outcome.sample, outcome.iterations
        )
    }
}
