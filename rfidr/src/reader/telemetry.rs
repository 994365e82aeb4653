// rfidr-rs/rfidr/src/reader/telemetry.rs
//! Outbound host traffic: state announcements, log messages and tag
//! reports.

use log::{debug, info};

use crate::constants::WAVEFORM_CHUNK_LEN;
use crate::protocol::codec::{encode_primary, encode_supplement, log_chunks, recovery_notice};
use crate::reader::Reader;
use crate::transport::{EventOutcome, HostField, LinkError};
use crate::types::TagReadResult;
use crate::{EventKind, ReaderFault, Result};

impl Reader {
    /// Block until the host reads `field` back.
    pub(crate) fn wait_ack(&self, field: HostField) -> Result<()> {
        match self.acks.wait(field, self.config.ack_timeout()) {
            EventOutcome::Received => Ok(()),
            EventOutcome::TimedOut => Err(ReaderFault::EventTimeout(EventKind::HostAck(field))),
        }
    }

    /// Announce the current state and wait for the host to read it.
    pub(crate) fn bookend(&mut self) -> Result<()> {
        let state = self.ctx.current;
        info!("state {} ({})", state.code(), state);
        self.acks.clear(HostField::ReadState);
        self.host.push_retrying(HostField::ReadState, &[state.code()])?;
        self.wait_ack(HostField::ReadState)
    }

    fn push_chunk(&mut self, chunk: &[u8]) -> bool {
        loop {
            match self.host.push(HostField::LogMessage, chunk) {
                Ok(()) | Err(LinkError::NotReady) => return true,
                Err(LinkError::NoBuffers) => continue,
                Err(LinkError::Other(reason)) => {
                    debug!("log chunk dropped: {}", reason);
                    self.ctx.link_failures = self.ctx.link_failures.saturating_add(1);
                    return false;
                }
            }
        }
    }

    /// Best-effort diagnostic message. Lost chunks are counted; the first
    /// message delivered after a loss is followed by a recovery notice.
    pub fn send_message(&mut self, message: &str) {
        debug!("message: {}", message);
        let mut delivered = true;
        for chunk in log_chunks(message) {
            delivered &= self.push_chunk(&chunk);
        }
        if delivered && self.ctx.link_failures > 0 {
            let failures = self.ctx.link_failures;
            let notice = recovery_notice(failures);
            if notice.iter().all(|chunk| self.push_chunk(chunk)) {
                info!("host link recovered after {} lost chunks", failures);
                self.ctx.link_failures = 0;
            }
        }
    }

    /// Report one tag read. The supplement carries the calibration tag
    /// read, the failed-run count and the hop/skip nonce.
    pub(crate) fn push_report(
        &mut self,
        tag: &TagReadResult,
        cal: &TagReadResult,
        slot: u8,
        failed_runs: u8,
        supplement: bool,
    ) -> Result<()> {
        self.acks.clear(HostField::PrimaryData);
        let primary = encode_primary(tag, slot, supplement, self.ctx.data_id);
        self.host.push_retrying(HostField::PrimaryData, &primary)?;
        self.ctx.data_id = self.ctx.data_id.wrapping_add(1);
        if supplement {
            let extra = encode_supplement(tag, cal, failed_runs, self.ctx.nonce, self.ctx.data_id);
            self.host.push_retrying(HostField::SupplementData, &extra)?;
            self.ctx.data_id = self.ctx.data_id.wrapping_add(1);
        }
        self.wait_ack(HostField::PrimaryData)
    }

    /// Stream `data` to the host in link-sized pieces.
    pub(crate) fn push_waveform(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(WAVEFORM_CHUNK_LEN) {
            self.host.push_retrying(HostField::WaveformData, chunk)?;
        }
        Ok(())
    }
}
