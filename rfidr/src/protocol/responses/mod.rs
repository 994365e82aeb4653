// rfidr-rs/rfidr/src/protocol/responses/mod.rs

pub mod pcepc;
pub mod read;

pub use pcepc::{decode_magnitude, pcepc_epc_address, PCEPC_EPC_SPAN};
pub use read::{decode_read_epc, READ_EPC_SPAN};

use crate::constants::{
    RX_BITS_HANDLE, RX_BITS_LOCK, RX_BITS_PCEPC, RX_BITS_READ, RX_BITS_RN16,
    RX_BITS_RN16_INITIAL, RX_BITS_WRITE, RX_REGION_HANDLE, RX_REGION_LOCK, RX_REGION_PCEPC,
    RX_REGION_READ, RX_REGION_RN16, RX_REGION_RN16_INITIAL, RX_REGION_SHIFT, RX_REGION_WRITE,
};

/// Tag reply kinds, each captured into its own RX RAM region. The first
/// byte of a region tells the peripheral how many reply bits to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxRegion {
    /// RN16 + CRC-16 in reply to Req_RN.
    Rn16,
    /// Bare RN16 in reply to Query, QueryRep or QueryAdjust.
    Rn16Initial,
    Handle,
    /// Delayed reply to a write.
    Write,
    /// Delayed reply to a lock.
    Lock,
    /// Header bit, 96 data bits, RN16 and CRC-16.
    Read,
    /// PC + EPC + CRC-16, followed by the integrator magnitudes.
    PcEpc,
}

impl RxRegion {
    /// Regions in the order the power-up image writes them.
    pub const ALL: [RxRegion; 7] = [
        RxRegion::Rn16,
        RxRegion::Rn16Initial,
        RxRegion::PcEpc,
        RxRegion::Handle,
        RxRegion::Write,
        RxRegion::Read,
        RxRegion::Lock,
    ];

    fn offset(self) -> u16 {
        match self {
            RxRegion::Rn16 => RX_REGION_RN16,
            RxRegion::Rn16Initial => RX_REGION_RN16_INITIAL,
            RxRegion::Handle => RX_REGION_HANDLE,
            RxRegion::Write => RX_REGION_WRITE,
            RxRegion::Lock => RX_REGION_LOCK,
            RxRegion::Read => RX_REGION_READ,
            RxRegion::PcEpc => RX_REGION_PCEPC,
        }
    }

    pub fn base_address(self) -> u16 {
        self.offset() << RX_REGION_SHIFT
    }

    pub fn expected_bits(self) -> u8 {
        match self {
            RxRegion::Rn16 => RX_BITS_RN16,
            RxRegion::Rn16Initial => RX_BITS_RN16_INITIAL,
            RxRegion::Handle => RX_BITS_HANDLE,
            RxRegion::Write => RX_BITS_WRITE,
            RxRegion::Lock => RX_BITS_LOCK,
            RxRegion::Read => RX_BITS_READ,
            RxRegion::PcEpc => RX_BITS_PCEPC,
        }
    }
}
