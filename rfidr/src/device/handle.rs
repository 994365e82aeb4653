// rfidr-rs/rfidr/src/device/handle.rs

use std::time::Duration;

use log::{debug, trace};

use crate::constants::{
    DEFAULT_CHANNEL, MAX_EPC_LEN, PCEPC_ALT_MAG_OFFSET, PCEPC_MAIN_MAG_OFFSET, READ_DATA_OFFSET,
    WRITE_VERIFY_ATTEMPTS,
};
use crate::protocol::{
    decode_magnitude, decode_read_epc, pcepc_epc_address, RxRegion, Transaction, TxCommand,
    READ_EPC_SPAN,
};
use crate::transport::{Board, EventLatch, EventOutcome, PeripheralEvent, RegisterBus};
use crate::types::MemorySpace;
use crate::utils::bytes_to_hex_spaced;
use crate::{EventKind, ReaderFault, Result};

/// Handle to the radio peripheral and the board around it.
///
/// Register-level access lives here; control register helpers, the SDR
/// bridge and the frequency plan extend it in sibling modules.
pub struct Radio {
    bus: Box<dyn RegisterBus>,
    board: Box<dyn Board>,
    events: EventLatch<PeripheralEvent>,
    event_timeout: Duration,
    pub(crate) channel: u8,
}

impl Radio {
    pub fn new(bus: Box<dyn RegisterBus>, board: Box<dyn Board>, event_timeout: Duration) -> Self {
        let events = board.events();
        Self {
            bus,
            board,
            events,
            event_timeout,
            channel: DEFAULT_CHANNEL,
        }
    }

    pub fn board(&mut self) -> &mut dyn Board {
        &mut *self.board
    }

    /// Current hop channel.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    fn transact(&mut self, t: Transaction) -> Result<u8> {
        let frame = t.encode();
        let reply = self.bus.transfer(frame)?;
        trace!(
            "{} {:?} {:#05x}: [{}] -> [{}]",
            t.space,
            t.access,
            t.address,
            bytes_to_hex_spaced(&frame),
            bytes_to_hex_spaced(&reply)
        );
        Ok(Transaction::reply_value(&reply))
    }

    pub fn read(&mut self, space: MemorySpace, address: u16) -> Result<u8> {
        self.transact(Transaction::read(space, address))
    }

    pub fn write(&mut self, space: MemorySpace, address: u16, data: u8) -> Result<()> {
        self.transact(Transaction::write(space, address, data))
            .map(|_| ())
    }

    /// Write and read back, retrying a bounded number of times until the
    /// read-back matches.
    pub fn write_verified(&mut self, space: MemorySpace, address: u16, data: u8) -> Result<()> {
        let mut read = 0;
        for attempt in 0..WRITE_VERIFY_ATTEMPTS {
            self.write(space, address, data)?;
            read = self.read(space, address)?;
            if read == data {
                return Ok(());
            }
            debug!(
                "write verify miss {}/{} at {} {:#05x}",
                attempt + 1,
                WRITE_VERIFY_ATTEMPTS,
                space,
                address
            );
        }
        Err(ReaderFault::WriteVerify {
            space,
            address,
            written: data,
            read,
        })
    }

    pub fn write_block_verified(&mut self, space: MemorySpace, start: u16, data: &[u8]) -> Result<()> {
        for (i, b) in data.iter().enumerate() {
            self.write_verified(space, start + i as u16, *b)?;
        }
        Ok(())
    }

    pub fn read_block(&mut self, space: MemorySpace, start: u16, out: &mut [u8]) -> Result<()> {
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.read(space, start + i as u16)?;
        }
        Ok(())
    }

    /// Encode `cmd` and store it in its TX RAM region.
    pub fn load_tx(&mut self, cmd: &TxCommand) -> Result<()> {
        let pkt = cmd.encode()?;
        debug!(
            "loading {} bits at tx {:#05x}: {}",
            pkt.bits,
            pkt.base_address(),
            bytes_to_hex_spaced(&pkt.payload)
        );
        self.write_block_verified(MemorySpace::RadioTx, pkt.base_address(), &pkt.to_region_bytes())
    }

    /// Store the expected reply length at the head of every RX RAM region.
    pub fn load_rx_defaults(&mut self) -> Result<()> {
        for region in RxRegion::ALL {
            self.write_verified(MemorySpace::RadioRx, region.base_address(), region.expected_bits())?;
        }
        Ok(())
    }

    /// Block until `event` is raised or the configured budget runs out.
    pub fn wait_event(&self, event: PeripheralEvent) -> Result<()> {
        match self.events.wait(event, self.event_timeout) {
            EventOutcome::Received => Ok(()),
            EventOutcome::TimedOut => Err(ReaderFault::EventTimeout(EventKind::Peripheral(event))),
        }
    }

    /// One radio run: clear the done flag, go, wait, acknowledge. Returns
    /// the exit code.
    pub fn run_once(&mut self) -> Result<u8> {
        self.events.clear(PeripheralEvent::RadioDone);
        self.go_radio()?;
        self.wait_event(PeripheralEvent::RadioDone)?;
        self.irq_ack()?;
        self.exit_code()
    }

    /// One conversion of the leakage detector.
    pub fn sample_leakage(&mut self) -> Result<u16> {
        self.events.clear(PeripheralEvent::SampleReady);
        self.board.trigger_sample()?;
        self.wait_event(PeripheralEvent::SampleReady)?;
        self.board.read_sample()
    }

    /// EPC from the PC+EPC reply region.
    pub fn read_reply_epc(&mut self) -> Result<[u8; MAX_EPC_LEN]> {
        let mut epc = [0u8; MAX_EPC_LEN];
        self.read_block(MemorySpace::RadioRx, pcepc_epc_address(0), &mut epc)?;
        Ok(epc)
    }

    fn read_magnitude(&mut self, offset: u16) -> Result<i32> {
        let mut raw = [0u8; 4];
        let start = RxRegion::PcEpc.base_address() + offset;
        self.read_block(MemorySpace::RadioRx, start, &mut raw)?;
        Ok(decode_magnitude(raw))
    }

    pub fn read_main_magnitude(&mut self) -> Result<i32> {
        self.read_magnitude(PCEPC_MAIN_MAG_OFFSET)
    }

    pub fn read_alt_magnitude(&mut self) -> Result<i32> {
        self.read_magnitude(PCEPC_ALT_MAG_OFFSET)
    }

    /// EPC returned by a read command, realigned past its header bit.
    pub fn read_back_epc(&mut self) -> Result<[u8; MAX_EPC_LEN]> {
        let mut raw = [0u8; READ_EPC_SPAN];
        let start = RxRegion::Read.base_address() + READ_DATA_OFFSET;
        self.read_block(MemorySpace::RadioRx, start, &mut raw)?;
        Ok(decode_read_epc(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockRadio, RadioReply};
    use crate::types::{Epc, PacketParams, Session};
    use crate::utils::ms;

    fn radio() -> (MockRadio, Radio) {
        let mock = MockRadio::new();
        let radio = Radio::new(Box::new(mock.clone()), Box::new(mock.clone()), ms(50));
        (mock, radio)
    }

    #[test]
    fn write_verified_survives_two_misses() {
        let (mock, mut radio) = radio();
        mock.model().dropped_writes = 2;
        radio.write_verified(MemorySpace::RadioTx, 0x22, 0x5A).unwrap();
        assert_eq!(mock.model().tx_ram[0x22], 0x5A);
    }

    #[test]
    fn write_verified_gives_up_after_three() {
        let (mock, mut radio) = radio();
        mock.model().dropped_writes = 3;
        let err = radio.write_verified(MemorySpace::RadioTx, 0x22, 0x5A).unwrap_err();
        match err {
            ReaderFault::WriteVerify {
                space,
                address,
                written,
                read,
            } => {
                assert_eq!(space, MemorySpace::RadioTx);
                assert_eq!(address, 0x22);
                assert_eq!(written, 0x5A);
                assert_eq!(read, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn load_tx_writes_header_and_payload() {
        let (mock, mut radio) = radio();
        let cmd = TxCommand::Query {
            params: PacketParams::single_tag(Session::S2),
            flag_swap: true,
        };
        radio.load_tx(&cmd).unwrap();
        let pkt = cmd.encode().unwrap();
        let m = mock.model();
        let region = m.tx_region(pkt.region);
        assert_eq!(region[0], 17);
        assert_eq!(&region[..pkt.to_region_bytes().len()], &pkt.to_region_bytes()[..]);
    }

    #[test]
    fn rx_defaults_land_at_region_heads() {
        let (mock, mut radio) = radio();
        radio.load_rx_defaults().unwrap();
        let m = mock.model();
        assert_eq!(m.rx_ram[0x70], 128);
        assert_eq!(m.rx_ram[0x50], 129);
        assert_eq!(m.rx_ram[0x10], 16);
    }

    #[test]
    fn run_once_reports_exit_and_reply_fields() {
        let (mock, mut radio) = radio();
        mock.push_reply(RadioReply::Tag {
            epc: *Epc::ZERO.padded(),
            main: -42,
            alt: 0x0102_0304,
        });
        mock.push_reply(RadioReply::Silent);
        assert_eq!(radio.run_once().unwrap(), 0);
        assert_eq!(radio.read_main_magnitude().unwrap(), -42);
        assert_eq!(radio.read_alt_magnitude().unwrap(), 0x0102_0304);
        assert_eq!(radio.run_once().unwrap(), 1);
    }

    #[test]
    fn read_back_epc_drops_header() {
        let (mock, mut radio) = radio();
        let epc = [0xC3; MAX_EPC_LEN];
        mock.push_reply(RadioReply::Written {
            read_back: epc,
            write_counter: 6,
        });
        radio.run_once().unwrap();
        assert_eq!(radio.read_back_epc().unwrap(), epc);
        assert_eq!(radio.write_counter().unwrap(), 6);
    }

    #[test]
    fn missing_done_signal_times_out() {
        let (_mock, radio) = radio();
        let err = radio.wait_event(PeripheralEvent::RadioDone).unwrap_err();
        assert!(matches!(
            err,
            ReaderFault::EventTimeout(EventKind::Peripheral(PeripheralEvent::RadioDone))
        ));
    }

    #[test]
    fn leakage_sample_uses_offsets() {
        let (_mock, mut radio) = radio();
        radio.set_tx_offsets(5, 11).unwrap();
        assert_eq!(radio.sample_leakage().unwrap(), 100);
    }
}
