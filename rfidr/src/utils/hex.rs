// rfidr-rs/rfidr/src/utils/hex.rs
//! Hex helpers for EPCs and transaction traces.

use std::fmt::Write;

/// Lowercase hex without separators: `&[0xde, 0xad]` -> `"dead"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Lowercase hex with one space between bytes, for trace logs.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formats() {
        assert_eq!(bytes_to_hex(&[0xA0, 0xB1, 0x0C]), "a0b10c");
        assert_eq!(bytes_to_hex_spaced(&[0x01, 0xff]), "01 ff");
        assert_eq!(bytes_to_hex(&[]), "");
    }
}
