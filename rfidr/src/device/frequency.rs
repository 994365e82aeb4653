// rfidr-rs/rfidr/src/device/frequency.rs
//! Frequency agility: pseudo-random hops across the channel table and the
//! fixed-offset skips that give the second observation of a PDOA pair.

use log::debug;

use crate::constants::{CHANNEL_COUNT, HOP_STEP};
use crate::device::Radio;
use crate::Result;

/// The channel a hop from `channel` lands on.
pub fn next_channel(channel: u8) -> u8 {
    (channel % CHANNEL_COUNT + HOP_STEP) % CHANNEL_COUNT
}

/// Second-observation channels for a PDOA search starting at `slot`, in
/// the order they are tried. Slots near a band edge only skip inwards.
pub fn pdoa_candidates(slot: u8, offset: u8) -> Vec<u8> {
    if slot < offset {
        vec![slot + offset]
    } else if slot + offset >= CHANNEL_COUNT {
        vec![slot - offset]
    } else {
        vec![slot + offset, slot - offset]
    }
}

/// Skip channel used by tracking after `outer` failed calibration retries.
/// Each retry moves one channel closer to `slot`.
pub fn skip_channel(slot: u8, offset: u8, outer: usize) -> u8 {
    let delta = offset.saturating_sub(outer.min(usize::from(u8::MAX)) as u8);
    if slot + offset >= CHANNEL_COUNT {
        slot - delta
    } else {
        slot + delta
    }
}

impl Radio {
    /// Advance to the next hop channel and tune the SDR to it.
    pub fn hop(&mut self) -> Result<u8> {
        let next = next_channel(self.channel);
        self.write_frequency_code(next)?;
        self.channel = next;
        debug!("hopped to channel {}", next);
        Ok(next)
    }

    /// Tune to `channel` without moving the hop sequence.
    pub fn set_frequency(&mut self, channel: u8) -> Result<()> {
        debug!("tuned to channel {} (hop at {})", channel, self.channel);
        self.write_frequency_code(channel)
    }

    /// Tune to `channel` and continue the hop sequence from there.
    pub fn tune_to(&mut self, channel: u8) -> Result<()> {
        let channel = channel % CHANNEL_COUNT;
        self.write_frequency_code(channel)?;
        self.channel = channel;
        Ok(())
    }
}
