// rfidr-rs/rfidr/src/protocol/commands/select.rs

use super::BitWriter;
use crate::constants::{CMD_SELECT, MEMBANK_EPC, SELECT_EPC_POINTER};
use crate::types::{Epc, SelectAction, SelectTarget};

/// Select: `1010 target(3) action(3) membank(2) pointer(8) length(8) mask truncate(1)`.
///
/// The mask is the EPC at its own length; an empty EPC gives the shortest
/// possible select, which matches every tag.
pub fn encode_select(target: SelectTarget, action: SelectAction, mask: &Epc) -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_SELECT), 4)
        .push(target as u32, 3)
        .push(u32::from(action.code()), 3)
        .push(u32::from(MEMBANK_EPC), 2)
        .push(u32::from(SELECT_EPC_POINTER), 8)
        .push((mask.len() * 8) as u32, 8)
        .push_bytes(mask.as_bytes())
        .push(0, 1);
    w
}
