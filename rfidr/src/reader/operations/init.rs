// rfidr-rs/rfidr/src/reader/operations/init.rs
//! Power-up bring-up of the radio chain.

use log::info;

use crate::error::StepExt;
use crate::protocol::default_image;
use crate::reader::Reader;
use crate::types::Epc;
use crate::{ReaderFault, Result};

impl Reader {
    /// Reset and configure the peripheral and SDR, start the 36MHz clock
    /// and calibrate the transmit offsets.
    pub(crate) fn initialize(&mut self) -> Result<()> {
        let board = self.radio.board();
        board.set_pa(false).step("disabling amplifier")?;
        board.enable_xo().step("enabling oscillator")?;
        board.reset_peripheral().step("resetting peripheral")?;
        board.reset_sdr().step("resetting sdr")?;
        self.ctx.app_epc = Epc::ZERO;
        self.ctx.program_epc = Epc::ZERO;

        self.radio.load_sdr_defaults().step("loading sdr defaults")?;
        self.radio.board().select_antenna(0).step("selecting antenna")?;
        self.radio.load_rx_defaults().step("loading rx defaults")?;
        for command in default_image() {
            self.radio.load_tx(&command).step("loading tx defaults")?;
        }
        self.radio
            .tune_to(self.config.start_channel)
            .step("tuning start channel")?;

        if !self.radio.clk36_valid().step("checking clock")? {
            return Err(ReaderFault::Clock("not valid"));
        }
        self.radio.start_clk36().step("starting clock")?;
        if !self.radio.clk36_running().step("checking clock")? {
            return Err(ReaderFault::Clock("not running"));
        }

        self.hop()?;
        self.radio
            .set_waveform_offset(self.config.waveform_offset)
            .step("setting waveform offset")?;

        let outcome = self
            .calibrator
            .calibrate(&mut self.radio)
            .step("calibrating tx offsets")?;
        let summary = self.calibrator.summary(&outcome);
        info!("{}", summary);
        self.send_message(&summary);
        self.send_message("Initialization function complete!");
        Ok(())
    }
}
