// rfidr-rs/rfidr/src/protocol/commands/query.rs

use super::BitWriter;
use crate::constants::{CMD_QUERY, CMD_QUERY_ADJUST, CMD_QUERY_REP};
use crate::types::{PacketParams, Session};

/// Divide ratio, modulation and pilot tone fields of every query.
const QUERY_DR: u32 = 0;
const QUERY_M: u32 = 0;
const QUERY_TREXT: u32 = 0;

/// Query: `1000 DR M(2) TRext Sel(2) Session(2) Target Q(4)`. CRC-5 is
/// appended by the peripheral.
pub fn encode_query(params: &PacketParams) -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_QUERY), 4)
        .push(QUERY_DR, 1)
        .push(QUERY_M, 2)
        .push(QUERY_TREXT, 1)
        .push(params.query_sel as u32, 2)
        .push(params.session as u32, 2)
        .push(params.query_target as u32, 1)
        .push(u32::from(params.q.min(15)), 4);
    w
}

pub fn encode_query_rep(session: Session) -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_QUERY_REP), 2).push(session as u32, 2);
    w
}

/// QueryAdjust with UpDn `110` (Q+1) or `011` (Q-1).
pub fn encode_query_adjust(session: Session, up: bool) -> BitWriter {
    let updn = if up { 0b110 } else { 0b011 };
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_QUERY_ADJUST), 4)
        .push(session as u32, 2)
        .push(updn, 3);
    w
}
