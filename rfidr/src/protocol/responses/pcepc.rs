// rfidr-rs/rfidr/src/protocol/responses/pcepc.rs

use super::RxRegion;
use crate::constants::{MAX_EPC_LEN, PCEPC_EPC_OFFSET};

/// Bytes of EPC captured in the PC+EPC region.
pub const PCEPC_EPC_SPAN: usize = MAX_EPC_LEN;

/// Address of EPC byte `index` in the PC+EPC region (skipping the bit count
/// byte and the 16-bit PC).
pub fn pcepc_epc_address(index: usize) -> u16 {
    RxRegion::PcEpc.base_address() + PCEPC_EPC_OFFSET + index as u16
}

/// Integrator magnitudes are stored little-endian, two's complement.
pub fn decode_magnitude(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}
