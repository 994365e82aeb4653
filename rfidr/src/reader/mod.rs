// rfidr-rs/rfidr/src/reader/mod.rs
//! The reader: a state machine over one [`Radio`] and one [`HostLink`].
//!
//! Host commands stage a next state through the transition guard; each
//! [`Reader::run`] performs one state's work and announces the resulting
//! state to the host before returning. Faults from any operation surface
//! as `Err` and are turned into a forced state change in one place.

mod builder;
mod machine;
pub mod operations;
pub mod state;
mod telemetry;

pub use builder::ReaderBuilder;
pub use operations::{program_channel, query_sizes, tracking_schedule, ProgramOutcome, TrackingSchedule};
pub use state::{guard, ReaderState, Transition};

use crate::config::ReaderConfig;
use crate::constants::HOST_EPC_FILL;
use crate::device::{Radio, TxCalibrator};
use crate::transport::{EventLatch, HostField, HostLink};
use crate::types::Epc;
use crate::ReaderFault;

/// Everything the state machine and its operations mutate between runs.
#[derive(Debug, Default)]
pub struct ReaderContext {
    pub current: ReaderState,
    /// Staged by the guard, copied into `current` at the start of a run.
    pub next: ReaderState,
    /// Tracking keeps looping while set.
    pub tracking: bool,
    /// Set while the DTC test mode is engaged.
    pub dtc: bool,
    /// Counts hops; pairs hop and skip observations on the host.
    pub nonce: u8,
    pub app_epc: Epc,
    pub program_epc: Epc,
    pub kill_password: u32,
    pub last_inventoried: Epc,
    pub inventory_count: usize,
    /// Rolling id stamped on every report packet.
    pub data_id: u8,
    /// Log chunks lost since the last fully delivered message.
    pub link_failures: u32,
    pub last_fault: Option<ReaderFault>,
}

impl ReaderContext {
    pub fn new() -> Self {
        Self {
            app_epc: Epc::from_bytes(HOST_EPC_FILL),
            program_epc: Epc::from_bytes(HOST_EPC_FILL),
            last_inventoried: Epc::ZERO,
            ..Self::default()
        }
    }
}

pub struct Reader {
    pub(crate) radio: Radio,
    pub(crate) host: Box<dyn HostLink>,
    pub(crate) acks: EventLatch<HostField>,
    pub(crate) config: ReaderConfig,
    pub(crate) calibrator: Box<dyn TxCalibrator>,
    pub(crate) ctx: ReaderContext,
}

impl Reader {
    pub(crate) fn new(
        radio: Radio,
        host: Box<dyn HostLink>,
        config: ReaderConfig,
        calibrator: Box<dyn TxCalibrator>,
    ) -> Self {
        let acks = host.acks();
        Self {
            radio,
            host,
            acks,
            config,
            calibrator,
            ctx: ReaderContext::new(),
        }
    }

    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    pub fn context(&self) -> &ReaderContext {
        &self.ctx
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn state(&self) -> ReaderState {
        self.ctx.current
    }

    pub fn radio(&mut self) -> &mut Radio {
        &mut self.radio
    }
}
