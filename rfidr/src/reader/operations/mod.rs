// rfidr-rs/rfidr/src/reader/operations/mod.rs
//! Reader operations. Each submodule extends [`Reader`] with the work of
//! one or more states; the helpers here are shared between them.

mod dtc;
mod init;
mod inventory;
mod program;
mod reset;
mod search;
mod tracking;
mod waveform;

pub use program::{program_channel, ProgramOutcome};
pub use tracking::{tracking_schedule, TrackingSchedule};

use crate::error::StepExt;
use crate::reader::Reader;
use crate::types::{Channel, TagReadResult};
use crate::Result;

/// Query sizes of a round schedule: digits only, at most `limit` rounds,
/// each clamped to `max_q`.
pub fn query_sizes(schedule: &str, limit: usize, max_q: u8) -> impl Iterator<Item = u8> + '_ {
    schedule
        .chars()
        .filter_map(|c| c.to_digit(10))
        .take(limit)
        .map(move |d| (d as u8).min(max_q))
}

impl Reader {
    /// Hop to the next channel and bump the hop nonce.
    pub(crate) fn hop(&mut self) -> Result<u8> {
        let channel = self.radio.hop().step("hopping frequency")?;
        self.ctx.nonce = self.ctx.nonce.wrapping_add(1);
        Ok(channel)
    }

    /// A fresh result holding the EPC and magnitudes of the reply just
    /// received on `channel`.
    pub(crate) fn read_tag(&mut self, channel: Channel) -> Result<TagReadResult> {
        let mut result = TagReadResult::new();
        let read = result.channel_mut(channel);
        read.pass = true;
        read.epc = self.radio.read_reply_epc().step("reading epc")?;
        read.main_mag = self.radio.read_main_magnitude().step("reading magnitude")?;
        read.alt_mag = self.radio.read_alt_magnitude().step("reading magnitude")?;
        Ok(result)
    }

    /// Close the peripheral's inventory loop with one loop-ending run.
    pub(crate) fn end_inventory(&mut self) -> Result<()> {
        self.radio.board().set_pa(false).step("disabling amplifier")?;
        self.radio.set_end_loop().step("setting inventory end")?;
        self.radio.run_once().step("running inventory end")?;
        Ok(())
    }
}
