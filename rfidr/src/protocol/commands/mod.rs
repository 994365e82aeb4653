// rfidr-rs/rfidr/src/protocol/commands/mod.rs

pub mod access;
pub mod bits;
pub mod query;
pub mod select;

pub use access::{
    encode_kill, encode_kill_password, encode_program_epc, encode_read_epc, encode_req_rn,
    encode_write,
};
pub use bits::BitWriter;
pub use query::{encode_query, encode_query_adjust, encode_query_rep};
pub use select::encode_select;

use crate::constants::{
    TX_FLAG_ONE_SHOT, TX_FLAG_SWAP, TX_HEADER_LEN, TX_REGION_LEN, TX_REGION_QUERY,
    TX_REGION_QUERY_REP, TX_REGION_READ, TX_REGION_REQ_RN, TX_REGION_SELECT_1,
    TX_REGION_SELECT_2, TX_REGION_SHIFT, TX_REGION_WRITE,
};
use crate::types::{Epc, PacketParams, SelectAction, SelectTarget, Session};
use crate::{ReaderFault, Result};

/// Which of the two select slots a select packet occupies. A tag passes
/// the selection if it matches either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectSlot {
    First,
    Second,
}

/// Packets the reader stages in TX RAM. New packet kinds get an encoder in
/// `protocol::commands::<name>.rs` and a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxCommand {
    Select {
        slot: SelectSlot,
        target: SelectTarget,
        action: SelectAction,
        mask: Epc,
    },
    Query {
        params: PacketParams,
        flag_swap: bool,
    },
    QueryRep {
        session: Session,
    },
    /// Sent once in place of the query-rep.
    QueryAdjust {
        session: Session,
        up: bool,
    },
    ReqRn,
    ReadEpc,
    ProgramEpc(Epc),
    KillPassword(u32),
    Kill(u32),
}

impl TxCommand {
    pub fn region(&self) -> u16 {
        match self {
            Self::Select {
                slot: SelectSlot::First,
                ..
            } => TX_REGION_SELECT_1,
            Self::Select {
                slot: SelectSlot::Second,
                ..
            } => TX_REGION_SELECT_2,
            Self::Query { .. } => TX_REGION_QUERY,
            Self::QueryRep { .. } | Self::QueryAdjust { .. } => TX_REGION_QUERY_REP,
            Self::ReqRn => TX_REGION_REQ_RN,
            Self::ReadEpc => TX_REGION_READ,
            Self::ProgramEpc(_) | Self::KillPassword(_) | Self::Kill(_) => TX_REGION_WRITE,
        }
    }

    pub fn flags(&self) -> u8 {
        match self {
            Self::Query {
                flag_swap: true, ..
            } => TX_FLAG_SWAP,
            Self::QueryAdjust { .. } => TX_FLAG_ONE_SHOT,
            _ => 0,
        }
    }

    fn bits(&self) -> BitWriter {
        match self {
            Self::Select {
                target,
                action,
                mask,
                ..
            } => encode_select(*target, *action, mask),
            Self::Query { params, .. } => encode_query(params),
            Self::QueryRep { session } => encode_query_rep(*session),
            Self::QueryAdjust { session, up } => encode_query_adjust(*session, *up),
            Self::ReqRn => encode_req_rn(),
            Self::ReadEpc => encode_read_epc(),
            Self::ProgramEpc(epc) => encode_program_epc(epc),
            Self::KillPassword(pw) => encode_kill_password(*pw),
            Self::Kill(pw) => encode_kill(*pw),
        }
    }

    pub fn encode(&self) -> Result<TxPacket> {
        let w = self.bits();
        let bits = w.bit_len();
        let payload = w.into_bytes();
        if payload.len() > TX_REGION_LEN - TX_HEADER_LEN {
            return Err(ReaderFault::InvalidLength {
                expected: TX_REGION_LEN - TX_HEADER_LEN,
                actual: payload.len(),
            });
        }
        Ok(TxPacket {
            region: self.region(),
            bits: bits as u8,
            flags: self.flags(),
            payload,
        })
    }
}

/// A packet laid out for its TX RAM region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxPacket {
    pub region: u16,
    pub bits: u8,
    pub flags: u8,
    pub payload: Vec<u8>,
}

impl TxPacket {
    pub fn base_address(&self) -> u16 {
        self.region << TX_REGION_SHIFT
    }

    /// `[bit count] [flags] [payload...]`
    pub fn to_region_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TX_HEADER_LEN + self.payload.len());
        out.push(self.bits);
        out.push(self.flags);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Power-up image: blank selects acting on SL, a search query, and the
/// access packets.
pub fn default_image() -> Vec<TxCommand> {
    let params = PacketParams::single_tag(Session::S0);
    vec![
        TxCommand::Select {
            slot: SelectSlot::First,
            target: params.select_target,
            action: SelectAction::A0,
            mask: Epc::empty(),
        },
        TxCommand::Select {
            slot: SelectSlot::Second,
            target: params.select_target,
            action: SelectAction::A1,
            mask: Epc::empty(),
        },
        TxCommand::Query {
            params,
            flag_swap: false,
        },
        TxCommand::QueryRep {
            session: params.session,
        },
        TxCommand::ReqRn,
        TxCommand::ReadEpc,
        TxCommand::ProgramEpc(Epc::ZERO),
    ]
}
