// rfidr-rs/rfidr/src/transport/mock.rs

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::constants::{
    BRIDGE_ADDR_MASK, BRIDGE_WRITE_FLAG, CTRL_CLK36_RUNNING, CTRL_CLK36_VALID, CTRL_EXIT_SHIFT,
    CTRL_GO_RADIO, CTRL_MODE_MASK, CTRL_USE_I, LOOP_END_FSM, MAX_EPC_LEN, PCEPC_ALT_MAG_OFFSET,
    PCEPC_MAIN_MAG_OFFSET, READ_DATA_OFFSET, STATUS_BRIDGE_DONE, STATUS_BRIDGE_GO,
    STATUS_BRIDGE_PENDING, STATUS_CLK36_ONESHOT, STATUS_WRITE_COUNTER_MASK, TEST_PLL_CHECK,
    TRANSACTION_LEN, TX_REGION_LEN, TX_REGION_SHIFT, USER_REG_BRIDGE_ADDR, USER_REG_BRIDGE_DATA,
    USER_REG_CONTROL, USER_REG_LOOP, USER_REG_STATUS, USER_REG_TEST, USER_REG_TX_OFFSET,
    WAVEFORM_DEPTH,
};
use crate::protocol::{pcepc_epc_address, RxRegion, Transaction};
use crate::transport::traits::{
    Board, HostCommand, HostField, HostLink, LinkError, PeripheralEvent, RegisterBus,
};
use crate::transport::EventLatch;
use crate::types::{Access, MemorySpace};
use crate::Result;

const RADIO_RAM_LEN: usize = 512;

/// What the simulated radio reports for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioReply {
    /// No tag answered: exit code 1.
    Silent,
    /// A tag backscattered its PC+EPC; fills the PC+EPC reply region.
    Tag { epc: [u8; MAX_EPC_LEN], main: i32, alt: i32 },
    /// A write completed and the tag answered the read-back.
    Written {
        read_back: [u8; MAX_EPC_LEN],
        write_counter: u8,
    },
    /// An arbitrary exit code.
    Exit { code: u8, write_counter: u8 },
}

/// Leakage model used when none is supplied: a bowl centred on (5, 11).
pub fn default_leakage(sdm: u8, zgn: u8) -> u16 {
    (i32::from(sdm) - 5).unsigned_abs() as u16 * 40
        + (i32::from(zgn) - 11).unsigned_abs() as u16 * 25
        + 100
}

/// Simulated peripheral: register map, radio RAM, SDR bridge and board pins.
#[derive(Debug)]
pub struct RadioModel {
    /// Last value written to each user register.
    pub user: [u8; 8],
    pub tx_ram: Vec<u8>,
    pub rx_ram: Vec<u8>,
    pub waveform: Vec<u8>,
    /// SDR chip registers behind the bridge.
    pub sdr: [u8; 128],
    pub replies: VecDeque<RadioReply>,
    /// Reply used once `replies` runs dry.
    pub default_reply: RadioReply,
    pub exit_code: u8,
    pub write_counter: u8,
    pub clk36_valid: bool,
    /// Whether the clock one-shot actually starts the clock.
    pub clk36_starts: bool,
    pub clk36_running: bool,
    /// Report the bridge as pending on every status read.
    pub bridge_busy: bool,
    /// Never complete a bridge phase.
    pub bridge_stuck: bool,
    /// Corrupt the next N bridge read-backs.
    pub bridge_corrupt: usize,
    pub bridge_done: bool,
    pub bridge_return: u8,
    /// Ignore the next N write transactions.
    pub dropped_writes: usize,
    pub leakage: fn(u8, u8) -> u16,
    pub sample: u16,
    pub pa_on: bool,
    pub pa_enables: usize,
    pub xo_enabled: bool,
    pub peripheral_resets: usize,
    pub sdr_resets: usize,
    pub antenna: u8,
    /// Radio runs, including loop-ending runs.
    pub runs: usize,
    pub end_runs: usize,
    pub samples: usize,
    pub transactions: usize,
    events: EventLatch<PeripheralEvent>,
}

impl Default for RadioModel {
    fn default() -> Self {
        Self {
            user: [0; 8],
            tx_ram: vec![0; RADIO_RAM_LEN],
            rx_ram: vec![0; RADIO_RAM_LEN],
            waveform: (0..WAVEFORM_DEPTH).map(|i| (i & 0xFF) as u8).collect(),
            sdr: [0; 128],
            replies: VecDeque::new(),
            default_reply: RadioReply::Silent,
            exit_code: 0,
            write_counter: 0,
            clk36_valid: true,
            clk36_starts: true,
            clk36_running: false,
            bridge_busy: false,
            bridge_stuck: false,
            bridge_corrupt: 0,
            bridge_done: false,
            bridge_return: 0,
            dropped_writes: 0,
            leakage: default_leakage,
            sample: 0,
            pa_on: false,
            pa_enables: 0,
            xo_enabled: false,
            peripheral_resets: 0,
            sdr_resets: 0,
            antenna: 0,
            runs: 0,
            end_runs: 0,
            samples: 0,
            transactions: 0,
            events: EventLatch::new(),
        }
    }
}

impl RadioModel {
    /// The 32 bytes of a TX RAM region: bit count, flags, packet.
    pub fn tx_region(&self, region: u16) -> &[u8] {
        let base = usize::from(region << TX_REGION_SHIFT);
        &self.tx_ram[base..base + TX_REGION_LEN]
    }

    fn read_user(&self, address: u16) -> u8 {
        let reg = address as u8;
        match reg {
            USER_REG_CONTROL => {
                let mut b = self.user[0] & (CTRL_MODE_MASK | CTRL_USE_I);
                b |= (self.exit_code & 0x07) << CTRL_EXIT_SHIFT;
                if self.clk36_valid {
                    b |= CTRL_CLK36_VALID;
                }
                if self.clk36_running {
                    b |= CTRL_CLK36_RUNNING;
                }
                b
            }
            USER_REG_STATUS => {
                let mut b = self.write_counter & STATUS_WRITE_COUNTER_MASK;
                if self.bridge_done {
                    b |= STATUS_BRIDGE_DONE;
                }
                if self.bridge_busy {
                    b |= STATUS_BRIDGE_PENDING;
                }
                b
            }
            USER_REG_BRIDGE_DATA => self.bridge_return,
            _ => self.user[usize::from(reg & 0x07)],
        }
    }

    fn write_user(&mut self, address: u16, data: u8) {
        let reg = address as u8;
        match reg {
            USER_REG_CONTROL => {
                self.user[0] = data & (CTRL_MODE_MASK | CTRL_USE_I);
                if data & CTRL_GO_RADIO != 0 {
                    self.run_radio();
                }
            }
            USER_REG_STATUS => {
                if data & STATUS_CLK36_ONESHOT != 0 && self.clk36_starts {
                    self.clk36_running = true;
                }
                if data & STATUS_BRIDGE_GO != 0 {
                    self.run_bridge();
                } else {
                    self.bridge_done = false;
                }
            }
            _ => self.user[usize::from(reg & 0x07)] = data,
        }
    }

    fn run_bridge(&mut self) {
        if self.bridge_stuck {
            return;
        }
        let addr = self.user[usize::from(USER_REG_BRIDGE_ADDR)];
        let data = self.user[usize::from(USER_REG_BRIDGE_DATA)];
        let reg = usize::from(addr & BRIDGE_ADDR_MASK);
        if addr & BRIDGE_WRITE_FLAG != 0 {
            self.sdr[reg] = data;
        }
        self.bridge_return = self.sdr[reg];
        if addr & BRIDGE_WRITE_FLAG == 0 && self.bridge_corrupt > 0 {
            self.bridge_corrupt -= 1;
            self.bridge_return ^= 0xFF;
        }
        self.bridge_done = true;
    }

    fn run_radio(&mut self) {
        self.runs += 1;
        let loop_flags = self.user[usize::from(USER_REG_LOOP)];
        if loop_flags & LOOP_END_FSM != 0 {
            self.end_runs += 1;
            self.exit_code = 0;
        } else if self.user[usize::from(USER_REG_TEST)] & TEST_PLL_CHECK != 0 {
            self.exit_code = 0;
        } else {
            let reply = self
                .replies
                .pop_front()
                .unwrap_or_else(|| self.default_reply.clone());
            self.apply(reply);
        }
        // Loop request bits are sticky only until the exchange completes.
        self.user[usize::from(USER_REG_LOOP)] = 0;
        self.events.raise(PeripheralEvent::RadioDone);
    }

    fn apply(&mut self, reply: RadioReply) {
        match reply {
            RadioReply::Silent => {
                self.exit_code = 1;
            }
            RadioReply::Tag { epc, main, alt } => {
                let start = usize::from(pcepc_epc_address(0));
                self.rx_ram[start..start + MAX_EPC_LEN].copy_from_slice(&epc);
                let base = usize::from(RxRegion::PcEpc.base_address());
                let main_at = base + usize::from(PCEPC_MAIN_MAG_OFFSET);
                let alt_at = base + usize::from(PCEPC_ALT_MAG_OFFSET);
                self.rx_ram[main_at..main_at + 4].copy_from_slice(&main.to_le_bytes());
                self.rx_ram[alt_at..alt_at + 4].copy_from_slice(&alt.to_le_bytes());
                self.exit_code = 0;
            }
            RadioReply::Written {
                read_back,
                write_counter,
            } => {
                // One header bit precedes the data.
                let base = usize::from(RxRegion::Read.base_address() + READ_DATA_OFFSET);
                let mut raw = [0u8; MAX_EPC_LEN + 1];
                raw[0] = 0x80;
                for (k, b) in read_back.iter().enumerate() {
                    raw[k] |= b >> 1;
                    raw[k + 1] |= b << 7;
                }
                self.rx_ram[base..base + raw.len()].copy_from_slice(&raw);
                self.exit_code = 0;
                self.write_counter = write_counter;
            }
            RadioReply::Exit {
                code,
                write_counter,
            } => {
                self.exit_code = code;
                self.write_counter = write_counter;
            }
        }
    }

    fn transact(&mut self, t: Transaction) -> u8 {
        self.transactions += 1;
        let addr = usize::from(t.address);
        if t.access == Access::Write {
            if self.dropped_writes > 0 {
                self.dropped_writes -= 1;
                return 0;
            }
            match t.space {
                MemorySpace::RadioTx => self.tx_ram[addr] = t.data,
                MemorySpace::RadioRx => self.rx_ram[addr] = t.data,
                MemorySpace::User => self.write_user(t.address, t.data),
                MemorySpace::Waveform => {}
            }
            return 0;
        }
        match t.space {
            MemorySpace::RadioTx => self.tx_ram[addr],
            MemorySpace::RadioRx => self.rx_ram[addr],
            MemorySpace::Waveform => self.waveform.get(addr).copied().unwrap_or(0),
            MemorySpace::User => self.read_user(t.address),
        }
    }
}

/// Shared handle to a [`RadioModel`]; implements both [`RegisterBus`] and
/// [`Board`] so one simulated peripheral can back a whole reader.
#[derive(Debug, Clone, Default)]
pub struct MockRadio(Rc<RefCell<RadioModel>>);

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> RefMut<'_, RadioModel> {
        self.0.borrow_mut()
    }

    /// Queue the reply for the next radio run.
    pub fn push_reply(&self, reply: RadioReply) {
        self.0.borrow_mut().replies.push_back(reply);
    }

    pub fn push_replies<I: IntoIterator<Item = RadioReply>>(&self, replies: I) {
        self.0.borrow_mut().replies.extend(replies);
    }
}

impl RegisterBus for MockRadio {
    fn transfer(&mut self, frame: [u8; TRANSACTION_LEN]) -> Result<[u8; TRANSACTION_LEN]> {
        let t = Transaction::decode(&frame)?;
        let value = self.0.borrow_mut().transact(t);
        Ok([0, 0, 0, value])
    }
}

impl Board for MockRadio {
    fn set_pa(&mut self, on: bool) -> Result<()> {
        let mut m = self.0.borrow_mut();
        if on {
            m.pa_enables += 1;
        }
        m.pa_on = on;
        Ok(())
    }

    fn enable_xo(&mut self) -> Result<()> {
        self.0.borrow_mut().xo_enabled = true;
        Ok(())
    }

    fn reset_peripheral(&mut self) -> Result<()> {
        let mut m = self.0.borrow_mut();
        m.peripheral_resets += 1;
        m.user = [0; 8];
        m.exit_code = 0;
        m.write_counter = 0;
        m.clk36_running = false;
        m.bridge_done = false;
        Ok(())
    }

    fn reset_sdr(&mut self) -> Result<()> {
        let mut m = self.0.borrow_mut();
        m.sdr_resets += 1;
        m.sdr = [0; 128];
        Ok(())
    }

    fn select_antenna(&mut self, antenna: u8) -> Result<()> {
        self.0.borrow_mut().antenna = antenna;
        Ok(())
    }

    fn trigger_sample(&mut self) -> Result<()> {
        let mut m = self.0.borrow_mut();
        let offsets = m.user[usize::from(USER_REG_TX_OFFSET)];
        m.sample = (m.leakage)(offsets >> 4, offsets & 0x0F);
        m.samples += 1;
        m.events.raise(PeripheralEvent::SampleReady);
        Ok(())
    }

    fn read_sample(&mut self) -> Result<u16> {
        Ok(self.0.borrow().sample)
    }

    fn events(&self) -> EventLatch<PeripheralEvent> {
        self.0.borrow().events.clone()
    }
}

/// Recorded host side of the link.
#[derive(Debug)]
pub struct HostModel {
    pub pushes: Vec<(HostField, Vec<u8>)>,
    /// Errors returned by the next pushes, in order.
    pub failures: VecDeque<LinkError>,
    /// Acknowledge every accepted push immediately.
    pub auto_ack: bool,
    /// One entry per poll; `None` is a poll that finds nothing.
    pub commands: VecDeque<Option<HostCommand>>,
    pub polls: usize,
    acks: EventLatch<HostField>,
}

impl Default for HostModel {
    fn default() -> Self {
        Self {
            pushes: Vec::new(),
            failures: VecDeque::new(),
            auto_ack: true,
            commands: VecDeque::new(),
            polls: 0,
            acks: EventLatch::new(),
        }
    }
}

/// Shared handle to a [`HostModel`].
#[derive(Debug, Clone, Default)]
pub struct MockHost(Rc<RefCell<HostModel>>);

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> RefMut<'_, HostModel> {
        self.0.borrow_mut()
    }

    pub fn fail_next(&self, err: LinkError) {
        self.0.borrow_mut().failures.push_back(err);
    }

    /// Deliver `cmd` on the next poll that reaches it.
    pub fn queue_command(&self, cmd: HostCommand) {
        self.0.borrow_mut().commands.push_back(Some(cmd));
    }

    /// Deliver `cmd` after `polls` empty polls.
    pub fn queue_command_after(&self, polls: usize, cmd: HostCommand) {
        let mut m = self.0.borrow_mut();
        m.commands.extend(std::iter::repeat(None).take(polls));
        m.commands.push_back(Some(cmd));
    }

    pub fn set_auto_ack(&self, on: bool) {
        self.0.borrow_mut().auto_ack = on;
    }

    /// Payloads pushed on `field`, in order.
    pub fn pushed(&self, field: HostField) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .pushes
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, b)| b.clone())
            .collect()
    }

    /// Announced states, in order.
    pub fn states(&self) -> Vec<u8> {
        self.pushed(HostField::ReadState)
            .iter()
            .filter_map(|b| b.first().copied())
            .collect()
    }

    /// Log messages reassembled from their chunks.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for chunk in self.pushed(HostField::LogMessage) {
            for b in chunk {
                if b == 0 {
                    out.push(String::from_utf8_lossy(&current).into_owned());
                    current.clear();
                } else {
                    current.push(b);
                }
            }
        }
        out
    }

    pub fn clear(&self) {
        self.0.borrow_mut().pushes.clear();
    }
}

impl HostLink for MockHost {
    fn push(&mut self, field: HostField, bytes: &[u8]) -> std::result::Result<(), LinkError> {
        let mut m = self.0.borrow_mut();
        if let Some(err) = m.failures.pop_front() {
            return Err(err);
        }
        m.pushes.push((field, bytes.to_vec()));
        if m.auto_ack {
            m.acks.raise(field);
        }
        Ok(())
    }

    fn acks(&self) -> EventLatch<HostField> {
        self.0.borrow().acks.clone()
    }

    fn poll_command(&mut self) -> Option<HostCommand> {
        let mut m = self.0.borrow_mut();
        m.polls += 1;
        m.commands.pop_front().flatten()
    }
}
