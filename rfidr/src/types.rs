// rfidr-rs/rfidr/src/types.rs

use crate::ReaderFault;
use crate::constants::{LNA_GAIN_LOW, MAX_EPC_LEN};
use std::convert::TryFrom;

/// Peripheral memory space addressed by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MemorySpace {
    /// Captured I/Q samples, read only.
    #[display(fmt = "waveform")]
    Waveform,
    /// Reply capture half of the radio RAM.
    #[display(fmt = "radio-rx")]
    RadioRx,
    /// Protocol packet half of the radio RAM.
    #[display(fmt = "radio-tx")]
    RadioTx,
    /// Control and status registers.
    #[display(fmt = "user")]
    User,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// EPC - up to 12 bytes with an explicit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epc {
    bytes: [u8; MAX_EPC_LEN],
    len: usize,
}

impl Epc {
    /// An all-zero, full-length EPC.
    pub const ZERO: Self = Self {
        bytes: [0; MAX_EPC_LEN],
        len: MAX_EPC_LEN,
    };

    pub fn from_bytes(bytes: [u8; MAX_EPC_LEN]) -> Self {
        Self {
            bytes,
            len: MAX_EPC_LEN,
        }
    }

    /// `bytes` laid over `fill`. Anything past 12 bytes is dropped; the
    /// length is that of the overlay.
    pub fn overlay(fill: [u8; MAX_EPC_LEN], bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_EPC_LEN);
        let mut out = fill;
        out[..len].copy_from_slice(&bytes[..len]);
        Self { bytes: out, len }
    }

    /// Zero-length EPC; as a select mask it matches every tag.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// All 12 bytes, including whatever fills the tail past `len`.
    pub fn padded(&self) -> &[u8; MAX_EPC_LEN] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Epc {
    type Error = ReaderFault;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() > MAX_EPC_LEN {
            return Err(ReaderFault::InvalidLength {
                expected: MAX_EPC_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; MAX_EPC_LEN];
        arr[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: arr,
            len: bytes.len(),
        })
    }
}

/// Receive channel of the peripheral's clock and data recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Channel {
    #[display(fmt = "I")]
    I,
    #[display(fmt = "Q")]
    Q,
}

impl Channel {
    /// Both channels in the order every operation visits them.
    pub const BOTH: [Channel; 2] = [Channel::I, Channel::Q];
}

/// Fields recovered on one receive channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRead {
    pub pass: bool,
    pub epc: [u8; MAX_EPC_LEN],
    pub lna_gain: u8,
    pub main_mag: i32,
    pub alt_mag: i32,
}

impl Default for ChannelRead {
    fn default() -> Self {
        Self {
            pass: false,
            epc: [0; MAX_EPC_LEN],
            lna_gain: LNA_GAIN_LOW,
            main_mag: 0,
            alt_mag: 0,
        }
    }
}

/// Result of one search/inventory/track attempt, per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagReadResult {
    pub i: ChannelRead,
    pub q: ChannelRead,
}

impl TagReadResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: Channel) -> &ChannelRead {
        match channel {
            Channel::I => &self.i,
            Channel::Q => &self.q,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelRead {
        match channel {
            Channel::I => &mut self.i,
            Channel::Q => &mut self.q,
        }
    }

    pub fn any_pass(&self) -> bool {
        self.i.pass || self.q.pass
    }

    /// The channel to report: the passing one, or the stronger main
    /// integrator when both passed.
    pub fn reported_channel(&self) -> Option<Channel> {
        match (self.i.pass, self.q.pass) {
            (true, true) if self.i.main_mag > self.q.main_mag => Some(Channel::I),
            (true, true) => Some(Channel::Q),
            (true, false) => Some(Channel::I),
            (false, true) => Some(Channel::Q),
            (false, false) => None,
        }
    }
}

/// Protocol session.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Session {
    #[default]
    S0 = 0,
    S1 = 1,
    S2 = 2,
    S3 = 3,
}

/// Inventoried flag value a query targets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryFlag {
    #[default]
    A = 0,
    B = 1,
}

impl InventoryFlag {
    pub fn flipped(self) -> Self {
        match self {
            InventoryFlag::A => InventoryFlag::B,
            InventoryFlag::B => InventoryFlag::A,
        }
    }
}

/// Flag a select packet acts on.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectTarget {
    #[default]
    S0 = 0,
    S1 = 1,
    S2 = 2,
    S3 = 3,
    /// The selected (SL) flag.
    Sl = 4,
}

impl From<Session> for SelectTarget {
    fn from(session: Session) -> Self {
        match session {
            Session::S0 => SelectTarget::S0,
            Session::S1 => SelectTarget::S1,
            Session::S2 => SelectTarget::S2,
            Session::S3 => SelectTarget::S3,
        }
    }
}

/// Select action code (0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectAction(u8);

impl SelectAction {
    /// Matching: assert / inventoried A. Not matching: deassert / B.
    pub const A0: Self = Self(0);
    /// Matching: assert / A. Not matching: nothing.
    pub const A1: Self = Self(1);

    pub const fn new(code: u8) -> Self {
        Self(code & 0x07)
    }

    pub fn code(&self) -> u8 {
        self.0
    }
}

/// Which tags a query addresses by their SL flag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuerySel {
    #[default]
    All = 0,
    NotSelected = 2,
    Selected = 3,
}

/// Select and query fields staged before programming the TX RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketParams {
    pub select_target: SelectTarget,
    pub select_action: SelectAction,
    pub query_sel: QuerySel,
    pub session: Session,
    pub query_target: InventoryFlag,
    pub q: u8,
}

impl PacketParams {
    /// Fields for a single-tag search: SL select, immediate reply.
    pub fn single_tag(session: Session) -> Self {
        Self {
            select_target: SelectTarget::Sl,
            select_action: SelectAction::A0,
            query_sel: QuerySel::Selected,
            session,
            query_target: InventoryFlag::A,
            q: 0,
        }
    }

    /// Fields for a bulk round: select acts on the session's own flag.
    pub fn bulk(session: Session) -> Self {
        Self {
            select_target: SelectTarget::from(session),
            ..Self::single_tag(session)
        }
    }
}

/// Peripheral radio state machine mode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    Search = 0,
    Inventory = 1,
    ProgramConfirm = 2,
    Program = 3,
}

/// Which EPC a search singles out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// The EPC most recently sent by the host.
    AppSpecified,
    /// The EPC most recently decoded by an inventory or track round.
    LastInventoried,
    /// The on-board reference tag used for channel calibration.
    Calibration,
    /// No tag: zero EPC with the peripheral in PLL-check mode. Always passes.
    PllCheck,
}

/// Optional fields a search reads back after a passing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadFields {
    pub epc: bool,
    pub magnitudes: bool,
    pub lna_gain: bool,
}

impl ReadFields {
    pub const NONE: Self = Self {
        epc: false,
        magnitudes: false,
        lna_gain: false,
    };
    pub const MAGNITUDES: Self = Self {
        epc: false,
        magnitudes: true,
        lna_gain: false,
    };
    pub const EPC_AND_MAGNITUDES: Self = Self {
        epc: true,
        magnitudes: true,
        lna_gain: false,
    };
}

/// What a program operation writes to the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramContent {
    NewEpc,
    KillPassword,
    KillCommand,
}
