// rfidr-rs/rfidr/src/device/control.rs
//! User (control) register helpers.
//!
//! One-shot bits are fired with a read-modify-write and not verified;
//! sticky configuration bits are verified by reading them back.

use crate::constants::{
    CTRL_CLK36_RUNNING, CTRL_CLK36_VALID, CTRL_EXIT_SHIFT, CTRL_GO_RADIO, CTRL_IRQ_ACK,
    CTRL_KEEP_MASK, CTRL_MODE_MASK, CTRL_MODE_SHIFT, CTRL_USE_I, LOOP_ALT_FSM, LOOP_END_FSM,
    LOOP_USE_SELECT, STATUS_CLK36_ONESHOT, STATUS_WRITE_COUNTER_MASK, TEST_DTC_MODE,
    TEST_PLL_CHECK, TEST_STICKY_MASK, TEST_USE_KILL, USER_REG_CONTROL,
    USER_REG_LOOP, USER_REG_STATUS, USER_REG_TEST, USER_REG_TX_OFFSET, USER_REG_WAVEFORM_OFFSET,
};
use crate::device::Radio;
use crate::types::{Channel, MemorySpace, RadioMode};
use crate::{ReaderFault, Result};

impl Radio {
    fn user_read(&mut self, reg: u8) -> Result<u8> {
        self.read(MemorySpace::User, u16::from(reg))
    }

    fn user_write(&mut self, reg: u8, data: u8) -> Result<()> {
        self.write(MemorySpace::User, u16::from(reg), data)
    }

    /// Read-modify-write `reg`, then check the read-back with `ok`.
    fn user_update_checked(
        &mut self,
        reg: u8,
        update: impl FnOnce(u8) -> u8,
        ok: impl FnOnce(u8) -> bool,
    ) -> Result<()> {
        let current = self.user_read(reg)?;
        self.user_write(reg, update(current))?;
        let read = self.user_read(reg)?;
        if ok(read) {
            Ok(())
        } else {
            Err(ReaderFault::ControlRegister { address: reg, read })
        }
    }

    fn control_oneshot(&mut self, bit: u8) -> Result<()> {
        let current = self.user_read(USER_REG_CONTROL)?;
        self.user_write(USER_REG_CONTROL, (current & CTRL_KEEP_MASK) | bit)
    }

    pub fn go_radio(&mut self) -> Result<()> {
        self.control_oneshot(CTRL_GO_RADIO)
    }

    pub fn irq_ack(&mut self) -> Result<()> {
        self.control_oneshot(CTRL_IRQ_ACK)
    }

    pub fn exit_code(&mut self) -> Result<u8> {
        Ok((self.user_read(USER_REG_CONTROL)? >> CTRL_EXIT_SHIFT) & 0x07)
    }

    /// Words written by the last program run.
    pub fn write_counter(&mut self) -> Result<u8> {
        Ok(self.user_read(USER_REG_STATUS)? & STATUS_WRITE_COUNTER_MASK)
    }

    pub fn clk36_valid(&mut self) -> Result<bool> {
        Ok(self.user_read(USER_REG_CONTROL)? & CTRL_CLK36_VALID != 0)
    }

    pub fn clk36_running(&mut self) -> Result<bool> {
        Ok(self.user_read(USER_REG_CONTROL)? & CTRL_CLK36_RUNNING != 0)
    }

    pub fn start_clk36(&mut self) -> Result<()> {
        self.user_write(USER_REG_STATUS, STATUS_CLK36_ONESHOT)
    }

    /// Route clock and data recovery through `channel`.
    pub fn use_channel(&mut self, channel: Channel) -> Result<()> {
        match channel {
            Channel::I => self.user_update_checked(
                USER_REG_CONTROL,
                |b| (b & CTRL_MODE_MASK) | CTRL_USE_I,
                |b| b & CTRL_USE_I != 0,
            ),
            Channel::Q => self.user_update_checked(
                USER_REG_CONTROL,
                |b| b & CTRL_MODE_MASK,
                |b| b & CTRL_USE_I == 0,
            ),
        }
    }

    pub fn set_mode(&mut self, mode: RadioMode) -> Result<()> {
        let bits = (mode as u8) << CTRL_MODE_SHIFT;
        self.user_update_checked(
            USER_REG_CONTROL,
            |b| (b & CTRL_USE_I) | bits,
            |b| b & CTRL_MODE_MASK == bits,
        )
    }

    fn set_loop_flag(&mut self, flag: u8) -> Result<()> {
        self.user_update_checked(USER_REG_LOOP, |b| b | flag, |b| b & flag != 0)
    }

    /// Send the select packets ahead of the next query.
    pub fn set_use_select(&mut self) -> Result<()> {
        self.set_loop_flag(LOOP_USE_SELECT)
    }

    /// Start a fresh query on the next run instead of a query-rep.
    pub fn set_alt_loop(&mut self) -> Result<()> {
        self.set_loop_flag(LOOP_ALT_FSM)
    }

    /// End the peripheral's inventory loop on the next run.
    pub fn set_end_loop(&mut self) -> Result<()> {
        self.set_loop_flag(LOOP_END_FSM)
    }

    /// Send the kill command in place of the write packet.
    pub fn set_use_kill(&mut self, on: bool) -> Result<()> {
        if on {
            self.user_update_checked(USER_REG_TEST, |b| b | TEST_USE_KILL, |b| b & TEST_USE_KILL != 0)
        } else {
            self.user_update_checked(USER_REG_TEST, |b| b & !TEST_USE_KILL, |b| b & TEST_USE_KILL == 0)
        }
    }

    pub fn set_pll_check(&mut self, on: bool) -> Result<()> {
        if on {
            self.user_update_checked(USER_REG_TEST, |b| b | TEST_PLL_CHECK, |b| b & TEST_PLL_CHECK != 0)
        } else {
            self.user_update_checked(USER_REG_TEST, |b| b & !TEST_PLL_CHECK, |b| b & TEST_PLL_CHECK == 0)
        }
    }

    pub fn enter_dtc_mode(&mut self) -> Result<()> {
        let b = self.user_read(USER_REG_TEST)?;
        self.user_write(USER_REG_TEST, (b & TEST_STICKY_MASK) | TEST_DTC_MODE)
    }

    pub fn exit_dtc_mode(&mut self) -> Result<()> {
        let b = self.user_read(USER_REG_TEST)?;
        self.user_write(USER_REG_TEST, b & TEST_STICKY_MASK)
    }

    /// Modulator DC offsets: `sdm` in the high nibble, `zgn` in the low.
    pub fn set_tx_offsets(&mut self, sdm: u8, zgn: u8) -> Result<()> {
        let value = ((sdm & 0x0F) << 4) | (zgn & 0x0F);
        self.write_verified(MemorySpace::User, u16::from(USER_REG_TX_OFFSET), value)
    }

    /// Capture start, in clock cycles after the radio run begins.
    pub fn set_waveform_offset(&mut self, offset: u8) -> Result<()> {
        self.write_verified(MemorySpace::User, u16::from(USER_REG_WAVEFORM_OFFSET), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockRadio;
    use crate::utils::ms;

    fn radio() -> (MockRadio, Radio) {
        let mock = MockRadio::new();
        let radio = Radio::new(Box::new(mock.clone()), Box::new(mock.clone()), ms(50));
        (mock, radio)
    }

    #[test]
    fn channel_and_mode_are_independent() {
        let (mock, mut radio) = radio();
        radio.set_mode(RadioMode::Program).unwrap();
        radio.use_channel(Channel::I).unwrap();
        assert_eq!(mock.model().user[0], 0x0C | 0x10);
        radio.set_mode(RadioMode::Inventory).unwrap();
        assert_eq!(mock.model().user[0], 0x04 | 0x10);
        radio.use_channel(Channel::Q).unwrap();
        assert_eq!(mock.model().user[0], 0x04);
    }

    #[test]
    fn loop_flags_accumulate() {
        let (mock, mut radio) = radio();
        radio.set_use_select().unwrap();
        radio.set_alt_loop().unwrap();
        assert_eq!(mock.model().user[1], 0x60);
    }

    #[test]
    fn dropped_flag_write_is_a_control_fault() {
        let (mock, mut radio) = radio();
        mock.model().dropped_writes = 1;
        let err = radio.set_end_loop().unwrap_err();
        assert!(matches!(err, ReaderFault::ControlRegister { address: 1, .. }));
        assert_eq!(err.code(), 12);
    }

    #[test]
    fn dtc_mode_keeps_sticky_bits() {
        let (mock, mut radio) = radio();
        radio.set_use_kill(true).unwrap();
        radio.enter_dtc_mode().unwrap();
        assert_eq!(mock.model().user[6], 0x28);
        radio.exit_dtc_mode().unwrap();
        assert_eq!(mock.model().user[6], 0x20);
        radio.set_use_kill(false).unwrap();
        assert_eq!(mock.model().user[6], 0);
    }

    #[test]
    fn tx_offsets_pack_nibbles() {
        let (mock, mut radio) = radio();
        radio.set_tx_offsets(0x3, 0xA).unwrap();
        assert_eq!(mock.model().user[7], 0x3A);
    }

    #[test]
    fn clock_status_bits() {
        let (mock, mut radio) = radio();
        assert!(radio.clk36_valid().unwrap());
        assert!(!radio.clk36_running().unwrap());
        radio.start_clk36().unwrap();
        assert!(radio.clk36_running().unwrap());
        mock.model().clk36_valid = false;
        assert!(!radio.clk36_valid().unwrap());
    }

    #[test]
    fn waveform_offset_is_verified() {
        let (mock, mut radio) = radio();
        radio.set_waveform_offset(40).unwrap();
        assert_eq!(mock.model().user[3], 40);
    }
}
