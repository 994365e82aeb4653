// rfidr-rs/rfidr/src/reader/operations/dtc.rs
//! Digitally tunable capacitor test mode. Each run of the DTC state
//! toggles the mode.

use log::info;

use crate::device::TxPower;
use crate::error::StepExt;
use crate::reader::{Reader, ReaderState};
use crate::Result;

impl Reader {
    pub(crate) fn toggle_dtc(&mut self) -> Result<()> {
        if self.ctx.dtc {
            self.ctx.dtc = false;
            self.send_message("Exit Test DTC State");
            self.radio.exit_dtc_mode().step("leaving dtc mode")?;
            self.radio.board().set_pa(false).step("disabling amplifier")?;
            self.ctx.current = ReaderState::IdleConfigured;
        } else {
            self.ctx.dtc = true;
            self.send_message("Enter Test DTC State");
            self.radio.set_tx_power(TxPower::High).step("raising tx power")?;
            self.radio.enter_dtc_mode().step("entering dtc mode")?;
            self.radio.board().set_pa(false).step("disabling amplifier")?;
            self.ctx.current = ReaderState::TestingDtc;
        }
        info!("dtc test mode {}", if self.ctx.dtc { "on" } else { "off" });
        self.ctx.next = self.ctx.current;
        Ok(())
    }
}
