// rfidr-rs/rfidr/src/protocol/commands/bits.rs

/// MSB-first bit packer for air protocol packets.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub fn push(&mut self, value: u32, width: u8) -> &mut Self {
        for shift in (0..width).rev() {
            let bit = (value >> shift) & 1 == 1;
            if self.bits % 8 == 0 {
                self.bytes.push(0);
            }
            if bit {
                if let Some(last) = self.bytes.last_mut() {
                    *last |= 0x80 >> (self.bits % 8);
                }
            }
            self.bits += 1;
        }
        self
    }

    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        for b in data {
            self.push(u32::from(*b), 8);
        }
        self
    }

    pub fn bit_len(&self) -> usize {
        self.bits
    }

    /// Packed bytes; the last byte is zero padded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
