// rfidr-rs/rfidr/src/protocol/frame.rs

use crate::constants::{
    RADIO_ADDR_BITS, SEL_ADDR_SHIFT, SEL_FINAL_SHIFT, SEL_RADIO_BIT, SEL_RX_HALF_BIT,
    SEL_USER_BIT, SEL_WAVEFORM_BIT, SEL_WRITE_BIT, TRANSACTION_LEN, USER_ADDR_BITS,
    WAVEFORM_ADDR_BITS,
};
use crate::types::{Access, MemorySpace};
use crate::{ReaderFault, Result};

/// One peripheral transaction.
///
/// Wire format, before the final 9-bit left shift and big-endian split:
/// `[write(22)] [waveform(21)] [radio(20)] [user(18)] [rx half(17)] [address] [data(8)]`
/// with the address left-aligned at bit 8 and truncated to the width of its
/// memory space. Waveform transactions are always reads. The reply's last
/// byte carries the value read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub space: MemorySpace,
    pub access: Access,
    pub address: u16,
    pub data: u8,
}

fn addr_mask(space: MemorySpace) -> u16 {
    let bits = match space {
        MemorySpace::Waveform => WAVEFORM_ADDR_BITS,
        MemorySpace::RadioRx | MemorySpace::RadioTx => RADIO_ADDR_BITS,
        MemorySpace::User => USER_ADDR_BITS,
    };
    ((1u32 << bits) - 1) as u16
}

impl Transaction {
    pub fn read(space: MemorySpace, address: u16) -> Self {
        Self {
            space,
            access: Access::Read,
            address,
            data: 0,
        }
    }

    /// A write; a write to waveform memory is sent as a read.
    pub fn write(space: MemorySpace, address: u16, data: u8) -> Self {
        let access = match space {
            MemorySpace::Waveform => Access::Read,
            _ => Access::Write,
        };
        Self {
            space,
            access,
            address,
            data,
        }
    }

    pub fn encode(&self) -> [u8; TRANSACTION_LEN] {
        let write = if self.access == Access::Write {
            SEL_WRITE_BIT
        } else {
            0
        };
        let addr = u32::from(self.address & addr_mask(self.space)) << SEL_ADDR_SHIFT;
        let mut word = match self.space {
            MemorySpace::Waveform => SEL_WAVEFORM_BIT | addr,
            MemorySpace::RadioRx => SEL_RADIO_BIT | SEL_RX_HALF_BIT | write | addr,
            MemorySpace::RadioTx => SEL_RADIO_BIT | write | addr,
            MemorySpace::User => SEL_USER_BIT | write | addr,
        };
        word |= u32::from(self.data);
        (word << SEL_FINAL_SHIFT).to_be_bytes()
    }

    pub fn decode(frame: &[u8; TRANSACTION_LEN]) -> Result<Self> {
        let word = u32::from_be_bytes(*frame);
        if word & ((1 << SEL_FINAL_SHIFT) - 1) != 0 {
            return Err(ReaderFault::FrameFormat("low padding bits set".into()));
        }
        let word = word >> SEL_FINAL_SHIFT;
        let space = if word & SEL_WAVEFORM_BIT != 0 {
            MemorySpace::Waveform
        } else if word & SEL_RADIO_BIT != 0 {
            if word & SEL_RX_HALF_BIT != 0 {
                MemorySpace::RadioRx
            } else {
                MemorySpace::RadioTx
            }
        } else if word & SEL_USER_BIT != 0 {
            MemorySpace::User
        } else {
            return Err(ReaderFault::FrameFormat(format!(
                "no memory selector in {:08x}",
                word
            )));
        };
        let access = if space != MemorySpace::Waveform && word & SEL_WRITE_BIT != 0 {
            Access::Write
        } else {
            Access::Read
        };
        Ok(Self {
            space,
            access,
            address: ((word >> SEL_ADDR_SHIFT) as u16) & addr_mask(space),
            data: (word & 0xFF) as u8,
        })
    }

    /// Value carried by a reply frame.
    pub fn reply_value(reply: &[u8; TRANSACTION_LEN]) -> u8 {
        reply[TRANSACTION_LEN - 1]
    }
}
