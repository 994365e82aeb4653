// rfidr-rs/rfidr/src/transport/traits.rs

use log::warn;

use crate::constants::TRANSACTION_LEN;
use crate::transport::EventLatch;
use crate::{ReaderFault, Result};

/// One 4-byte full-duplex transaction with the radio peripheral.
pub trait RegisterBus {
    /// Clock `frame` out and return the bytes clocked back in.
    fn transfer(&mut self, frame: [u8; TRANSACTION_LEN]) -> Result<[u8; TRANSACTION_LEN]>;
}

/// Completion signals raised by the peripheral side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PeripheralEvent {
    #[display(fmt = "radio done")]
    RadioDone,
    #[display(fmt = "sample ready")]
    SampleReady,
}

/// Result of a blocking wait on an event flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Received,
    TimedOut,
}

/// Board pins and the analog power detector.
pub trait Board {
    /// Switch the transmit power amplifier.
    fn set_pa(&mut self, on: bool) -> Result<()>;

    fn enable_xo(&mut self) -> Result<()>;

    /// Pulse the peripheral's reset line.
    fn reset_peripheral(&mut self) -> Result<()>;

    /// Pulse the SDR transceiver's reset line.
    fn reset_sdr(&mut self) -> Result<()>;

    fn select_antenna(&mut self, antenna: u8) -> Result<()>;

    /// Start one conversion of the transmit leakage detector.
    fn trigger_sample(&mut self) -> Result<()>;

    /// The most recent completed conversion.
    fn read_sample(&mut self) -> Result<u16>;

    /// Latch raised by the board's interrupt handlers.
    fn events(&self) -> EventLatch<PeripheralEvent>;
}

/// Outbound characteristics of the host link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HostField {
    #[display(fmt = "read-state")]
    ReadState,
    #[display(fmt = "primary-data")]
    PrimaryData,
    #[display(fmt = "supplement-data")]
    SupplementData,
    #[display(fmt = "waveform-data")]
    WaveformData,
    #[display(fmt = "log-message")]
    LogMessage,
}

/// Why a push was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("no transmit buffers")]
    NoBuffers,
    #[error("link not ready")]
    NotReady,
    #[error("{0}")]
    Other(String),
}

/// Inbound writes from the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Requested next state, as its code.
    WriteState(u8),
    /// EPC of the app-specified target; longer values are truncated.
    TargetEpc(Vec<u8>),
    /// New EPC for the next program operation.
    ProgramEpc(Vec<u8>),
    KillPassword(u32),
}

/// Link to the controlling host application.
pub trait HostLink {
    /// Queue one notification on `field`.
    fn push(&mut self, field: HostField, bytes: &[u8]) -> std::result::Result<(), LinkError>;

    /// Latch raised when the host reads a field back.
    fn acks(&self) -> EventLatch<HostField>;

    /// Next pending host write, if any. Links that deliver commands
    /// out of band keep the default.
    fn poll_command(&mut self) -> Option<HostCommand> {
        None
    }

    /// Push, retrying while the link is out of buffers. A link that is not
    /// ready drops the payload without failing.
    fn push_retrying(&mut self, field: HostField, bytes: &[u8]) -> Result<()> {
        loop {
            match self.push(field, bytes) {
                Ok(()) => return Ok(()),
                Err(LinkError::NoBuffers) => continue,
                Err(LinkError::NotReady) => {
                    warn!("host link not ready, dropped {} bytes on {}", bytes.len(), field);
                    return Ok(());
                }
                Err(LinkError::Other(reason)) => return Err(ReaderFault::Link { field, reason }),
            }
        }
    }
}
