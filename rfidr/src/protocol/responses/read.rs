// rfidr-rs/rfidr/src/protocol/responses/read.rs

use crate::constants::MAX_EPC_LEN;

/// Bytes pulled from the read region to recover a 96-bit EPC behind the
/// one-bit reply header.
pub const READ_EPC_SPAN: usize = MAX_EPC_LEN + 1;

/// Strip the header bit and realign the EPC that follows it.
pub fn decode_read_epc(raw: &[u8; READ_EPC_SPAN]) -> [u8; MAX_EPC_LEN] {
    let mut epc = [0u8; MAX_EPC_LEN];
    for (k, out) in epc.iter_mut().enumerate() {
        *out = (raw[k] << 1) | (raw[k + 1] >> 7);
    }
    epc
}
