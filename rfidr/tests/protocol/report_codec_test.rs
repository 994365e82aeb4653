#[path = "../common/mod.rs"]
mod common;

use rfidr::constants::{FIRST_OBSERVATION, LOG_CHUNK_LEN, NO_CHANNEL};
use rfidr::protocol::codec::{encode_primary, encode_supplement, log_chunks, recovery_notice};
use rfidr::types::TagReadResult;

fn tag_on_i() -> TagReadResult {
    let mut r = TagReadResult::new();
    r.i.pass = true;
    r.i.epc = common::fixtures::sample_epc_bytes();
    r.i.main_mag = 0x0102_0304;
    r.i.alt_mag = 0x0000_0A0B;
    r
}

#[test]
fn primary_packet_layout() {
    let out = encode_primary(&tag_on_i(), 21, true, 7);
    assert_eq!(hex::encode(&out[..12]), "300833b2ddd9014000000001");
    assert_eq!(out[12], 0x80 | 21);
    assert_eq!(out[13..16], [0x01, 0x02, 0x03]);
    assert_eq!(out[16..19], [0x00, 0x00, 0x0A]);
    assert_eq!(out[19], 7);
}

#[test]
fn supplement_without_calibration() {
    let out = encode_supplement(&tag_on_i(), &TagReadResult::new(), FIRST_OBSERVATION, 3, 9);
    assert_eq!(out[0], 1);
    assert_eq!(out[1], 0x04);
    assert_eq!(out[2], 0x0B);
    assert_eq!(out[3], NO_CHANNEL);
    assert_eq!(out[4..12], [0; 8]);
    assert_eq!(out[12], FIRST_OBSERVATION);
    assert_eq!(out[13], 0b0010);
    assert_eq!(out[14..16], [3, 9]);
}

#[test]
fn log_messages_are_chunked_and_terminated() {
    let short = log_chunks("Got here");
    assert_eq!(short, vec![b"Got here\0".to_vec()]);

    let long = log_chunks(&"x".repeat(300));
    assert_eq!(long.len(), 13);
    assert!(long[..12].iter().all(|c| c.len() == LOG_CHUNK_LEN));
    assert_eq!(long[12], vec![0]);
}

#[test]
fn recovery_notice_counts_attempts() {
    let [first, second] = recovery_notice(42);
    assert!(first.starts_with(b"Rcvrd. BT ops after"));
    assert_eq!(second, b"0000000042 tries\0".to_vec());
}
