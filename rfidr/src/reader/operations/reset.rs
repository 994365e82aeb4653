// rfidr-rs/rfidr/src/reader/operations/reset.rs

use log::warn;

use crate::constants::SDR_REG_PLL_LOCK;
use crate::error::StepExt;
use crate::reader::Reader;
use crate::Result;

impl Reader {
    /// Reset the peripheral and SDR and report the PLL lock status.
    pub(crate) fn reset_radio(&mut self) -> Result<()> {
        self.radio.board().reset_peripheral().step("resetting peripheral")?;
        self.radio.board().reset_sdr().step("resetting sdr")?;
        self.ctx.dtc = false;
        match self.radio.sdr_read(SDR_REG_PLL_LOCK) {
            Ok(status) => self.send_message(&format!("PLL Lock Status: {:02x}", status)),
            Err(e) => {
                warn!("pll lock status unreadable: {}", e);
                self.send_message("PLL Lock Status: Er");
            }
        }
        Ok(())
    }
}
