// fixtures.rs: provides commonly used EPCs and scripted radio replies

use rfidr::transport::RadioReply;
use rfidr::types::Epc;

pub fn sample_epc_bytes() -> [u8; 12] {
    [0x30, 0x08, 0x33, 0xB2, 0xDD, 0xD9, 0x01, 0x40, 0x00, 0x00, 0x00, 0x01]
}

pub fn sample_epc() -> Epc {
    Epc::from_bytes(sample_epc_bytes())
}

pub fn replacement_epc_bytes() -> [u8; 12] {
    [0xE2, 0x00, 0x68, 0x0A, 0x00, 0x00, 0x40, 0x17, 0x91, 0x30, 0x00, 0x42]
}

/// The calibration tag answering on I only.
pub fn calibration_pass() -> [RadioReply; 2] {
    [
        RadioReply::Tag {
            epc: [0; 12],
            main: 12_000,
            alt: 3_000,
        },
        RadioReply::Silent,
    ]
}

/// The sample tag answering on I only.
pub fn sample_tag_pass() -> [RadioReply; 2] {
    [
        RadioReply::Tag {
            epc: sample_epc_bytes(),
            main: 800,
            alt: -120,
        },
        RadioReply::Silent,
    ]
}
