// rfidr-rs/rfidr/src/device/sdr.rs
//! SDR transceiver access through the peripheral's register bridge.

use log::{debug, warn};

use crate::constants::{
    BRIDGE_ADDR_MASK, BRIDGE_ATTEMPTS, BRIDGE_POLL_LIMIT, BRIDGE_WRITE_FLAG, DEFAULT_CHANNEL,
    FREQUENCY_TABLE, LNA_GAIN_LOW, SDR_REG_CLK_SELECT, SDR_REG_MODE, SDR_REG_RX_ANA_GAIN,
    SDR_REG_RX_BW, SDR_REG_RX_FREQ, SDR_REG_RX_PLL_BW, SDR_REG_TX_BW, SDR_REG_TX_DAC_BW,
    SDR_REG_TX_FREQ, SDR_REG_TX_GAIN, STATUS_BRIDGE_DONE, STATUS_BRIDGE_GO, TX_GAIN_HIGH,
    TX_GAIN_LOW, TX_GAIN_MEDIUM, USER_REG_BRIDGE_ADDR, USER_REG_BRIDGE_DATA, USER_REG_STATUS,
};
use crate::device::Radio;
use crate::error::BridgePhase;
use crate::types::MemorySpace;
use crate::{ReaderFault, Result};

/// Transmit power presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxPower {
    #[default]
    Low,
    Medium,
    High,
}

impl TxPower {
    fn gain(self) -> u8 {
        match self {
            TxPower::Low => TX_GAIN_LOW,
            TxPower::Medium => TX_GAIN_MEDIUM,
            TxPower::High => TX_GAIN_HIGH,
        }
    }
}

impl Radio {
    fn bridge_status(&mut self) -> Result<u8> {
        self.read(MemorySpace::User, u16::from(USER_REG_STATUS))
    }

    fn bridge_set(&mut self, reg: u8, data: u8) -> Result<()> {
        self.write(MemorySpace::User, u16::from(reg), data)
    }

    /// Hand one address/data pair to the bridge and poll until done.
    fn bridge_exchange(&mut self, addr: u8, data: u8, phase: BridgePhase) -> Result<()> {
        self.bridge_set(USER_REG_BRIDGE_ADDR, addr)?;
        self.bridge_set(USER_REG_BRIDGE_DATA, data)?;
        self.bridge_set(USER_REG_STATUS, STATUS_BRIDGE_GO)?;
        let mut polls = 0;
        while self.bridge_status()? & STATUS_BRIDGE_DONE == 0 {
            polls += 1;
            if polls > BRIDGE_POLL_LIMIT {
                return Err(ReaderFault::BridgeTimeout { phase });
            }
        }
        self.bridge_set(USER_REG_STATUS, 0)
    }

    fn bridge_idle_check(&mut self) -> Result<()> {
        let status = self.bridge_status()?;
        if (status >> 5) & 0x03 != 0 {
            return Err(ReaderFault::BridgeBusy { status });
        }
        Ok(())
    }

    /// Write an SDR register and read it back. A read-back mismatch is
    /// retried; every other failure aborts at once.
    pub fn sdr_write(&mut self, address: u8, data: u8) -> Result<()> {
        let reg = address & BRIDGE_ADDR_MASK;
        let mut actual = 0;
        for attempt in 0..BRIDGE_ATTEMPTS {
            self.bridge_idle_check()?;
            self.bridge_exchange(reg | BRIDGE_WRITE_FLAG, data, BridgePhase::Write)?;
            self.bridge_exchange(reg, data, BridgePhase::ReadBack)?;
            actual = self.read(MemorySpace::User, u16::from(USER_REG_BRIDGE_DATA))?;
            if actual == data {
                return Ok(());
            }
            warn!(
                "sdr {:#04x} read back {:#04x}, wanted {:#04x} (attempt {})",
                reg,
                actual,
                data,
                attempt + 1
            );
        }
        Err(ReaderFault::BridgeReadBack {
            address: reg,
            expected: data,
            actual,
        })
    }

    pub fn sdr_read(&mut self, address: u8) -> Result<u8> {
        let reg = address & BRIDGE_ADDR_MASK;
        self.bridge_idle_check()?;
        self.bridge_exchange(reg, 0, BridgePhase::ReadBack)?;
        self.read(MemorySpace::User, u16::from(USER_REG_BRIDGE_DATA))
    }

    pub fn set_lna_gain(&mut self, gain: u8) -> Result<()> {
        self.sdr_write(SDR_REG_RX_ANA_GAIN, gain)
    }

    pub fn lna_gain(&mut self) -> Result<u8> {
        self.sdr_read(SDR_REG_RX_ANA_GAIN)
    }

    pub fn set_tx_power(&mut self, power: TxPower) -> Result<()> {
        self.sdr_write(SDR_REG_TX_GAIN, power.gain())
    }

    /// Write the receive and transmit frequency codes of `channel`,
    /// most significant byte first.
    pub(crate) fn write_frequency_code(&mut self, channel: u8) -> Result<()> {
        let code = FREQUENCY_TABLE[usize::from(channel) % FREQUENCY_TABLE.len()];
        let bytes = code.to_be_bytes();
        for base in [SDR_REG_RX_FREQ, SDR_REG_TX_FREQ] {
            for (i, b) in bytes[1..].iter().enumerate() {
                self.sdr_write(base + i as u8, *b)?;
            }
        }
        Ok(())
    }

    /// Power-up register load: standby, gains and bandwidths, the default
    /// channel, then the receiver and transmitter enabled one at a time.
    pub fn load_sdr_defaults(&mut self) -> Result<()> {
        self.sdr_write(SDR_REG_MODE, 0x00)?;
        self.sdr_write(SDR_REG_MODE, 0x01)?;
        self.sdr_write(SDR_REG_TX_GAIN, 0x28)?;
        self.sdr_write(SDR_REG_TX_BW, 0x00)?;
        self.sdr_write(SDR_REG_TX_DAC_BW, 0x05)?;
        self.sdr_write(SDR_REG_RX_ANA_GAIN, LNA_GAIN_LOW)?;
        self.sdr_write(SDR_REG_RX_BW, 0xF5)?;
        self.sdr_write(SDR_REG_RX_PLL_BW, 0x06)?;
        self.sdr_write(SDR_REG_CLK_SELECT, 0x00)?;
        self.channel = DEFAULT_CHANNEL;
        self.write_frequency_code(DEFAULT_CHANNEL)?;
        self.sdr_write(SDR_REG_MODE, 0x03)?;
        self.sdr_write(SDR_REG_MODE, 0x07)?;
        self.sdr_write(SDR_REG_CLK_SELECT, 0x02)?;
        self.sdr_write(SDR_REG_MODE, 0x0F)?;
        debug!("sdr defaults loaded");
        Ok(())
    }
}
