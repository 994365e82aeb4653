// rfidr-rs/rfidr/src/config.rs
//! Reader tunables. Fixed protocol values live in `constants`.

use std::time::Duration;

use crate::constants::{
    DEFAULT_CHANNEL, INVENTORY_ROUND_LIMIT, LNA_GAIN_LOW, PROGRAM_RETRIES, SKIP_OFFSET,
    TRACK_CAL_INNER_RETRIES, TRACK_CAL_OUTER_RETRIES,
};
use crate::device::CalibrationStrategy;
use crate::types::{Epc, Session};
use crate::utils::{ms, DEFAULT_ACK_TIMEOUT_MS, DEFAULT_EVENT_TIMEOUT_MS};

/// Query-size schedule of a bulk inventory: one digit per round.
pub const INVENTORY_SCHEDULE: &str = "6666655555444444433333333322";

/// Secondary select mask of the inventory state.
pub const INVENTORY_FILTER: [u8; 12] = [
    0xA0, 0xB1, 0xC2, 0xD3, 0xE4, 0xF5, 0xA6, 0xB7, 0xC8, 0xD9, 0xE0, 0xF1,
];

/// EPC of the on-board reference tag.
pub const CALIBRATION_EPC: [u8; 12] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Bulk inventory run by the inventory state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryConfig {
    pub session: Session,
    /// Query-size digits, one round each. Non-digits are skipped.
    pub schedule: String,
    /// Finding more tags than this is a fault.
    pub max_tags: usize,
    /// Tags matching this EPC pass the selection along with the target.
    pub filter: Epc,
    pub round_limit: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            session: Session::S2,
            schedule: INVENTORY_SCHEDULE.to_string(),
            max_tags: 51,
            filter: Epc::from_bytes(INVENTORY_FILTER),
            round_limit: INVENTORY_ROUND_LIMIT,
        }
    }
}

/// Continuous tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingConfig {
    pub session: Session,
    /// Session of the sizing inventory run before tracking an
    /// application-specified population.
    pub inventory_session: Session,
    pub inventory_max_tags: usize,
    pub cal_outer_retries: usize,
    pub cal_inner_retries: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            session: Session::S2,
            inventory_session: Session::S3,
            inventory_max_tags: 32,
            cal_outer_retries: TRACK_CAL_OUTER_RETRIES,
            cal_inner_retries: TRACK_CAL_INNER_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    pub strategy: CalibrationStrategy,
    pub calibration_epc: Epc,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            strategy: CalibrationStrategy::default(),
            calibration_epc: Epc::from_bytes(CALIBRATION_EPC),
        }
    }
}

/// Everything a [`Reader`](crate::reader::Reader) can be tuned with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderConfig {
    pub inventory: InventoryConfig,
    pub tracking: TrackingConfig,
    pub calibration: CalibrationConfig,
    /// LNA gain restored before every receive attempt.
    pub lna_gain: u8,
    /// Channel tuned at initialisation; hops continue from here.
    pub start_channel: u8,
    /// Channel distance between the two observations of a PDOA pair.
    pub skip_offset: u8,
    pub program_retries: usize,
    /// Waveform capture start, in clock cycles after a radio run begins.
    pub waveform_offset: u8,
    pub event_timeout_ms: u64,
    pub ack_timeout_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            inventory: InventoryConfig::default(),
            tracking: TrackingConfig::default(),
            calibration: CalibrationConfig::default(),
            lna_gain: LNA_GAIN_LOW,
            start_channel: DEFAULT_CHANNEL,
            skip_offset: SKIP_OFFSET,
            program_retries: PROGRAM_RETRIES,
            waveform_offset: 0,
            event_timeout_ms: DEFAULT_EVENT_TIMEOUT_MS,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
        }
    }
}

impl ReaderConfig {
    pub fn event_timeout(&self) -> Duration {
        ms(self.event_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        ms(self.ack_timeout_ms)
    }
}
