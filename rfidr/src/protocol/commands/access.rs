// rfidr-rs/rfidr/src/protocol/commands/access.rs

use super::BitWriter;
use crate::constants::{
    CMD_KILL, CMD_READ, CMD_REQ_RN, CMD_WRITE, EPC_WORD_POINTER, KILL_PASSWORD_WORD_POINTER,
    MAX_EPC_LEN, MEMBANK_EPC, MEMBANK_RESERVED,
};
use crate::types::Epc;

/// Req_RN; the handle and CRC-16 are appended by the peripheral.
pub fn encode_req_rn() -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_REQ_RN), 8);
    w
}

/// Read of the six EPC words, used to confirm a program.
pub fn encode_read_epc() -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_READ), 8)
        .push(u32::from(MEMBANK_EPC), 2)
        .push(u32::from(EPC_WORD_POINTER), 8)
        .push((MAX_EPC_LEN / 2) as u32, 8);
    w
}

/// Write of consecutive words. The peripheral sends one word per access,
/// advancing its write counter; the handle is appended per word.
pub fn encode_write(membank: u8, word_pointer: u8, data: &[u8]) -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_WRITE), 8)
        .push(u32::from(membank), 2)
        .push(u32::from(word_pointer), 8)
        .push((data.len() / 2) as u32, 8)
        .push_bytes(data);
    w
}

pub fn encode_program_epc(epc: &Epc) -> BitWriter {
    encode_write(MEMBANK_EPC, EPC_WORD_POINTER, epc.padded())
}

pub fn encode_kill_password(password: u32) -> BitWriter {
    encode_write(
        MEMBANK_RESERVED,
        KILL_PASSWORD_WORD_POINTER,
        &password.to_be_bytes(),
    )
}

/// Kill: `11000100 password(32) RFU(3)`. The peripheral splits it into the
/// two half-password exchanges.
pub fn encode_kill(password: u32) -> BitWriter {
    let mut w = BitWriter::new();
    w.push(u32::from(CMD_KILL), 8).push(password, 32).push(0, 3);
    w
}
