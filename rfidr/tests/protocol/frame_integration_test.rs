#[path = "../common/mod.rs"]
mod common;

use rfidr::protocol::Transaction;
use rfidr::types::{Access, MemorySpace};

#[test]
fn user_write_frame_matches_fixture() {
    let t = Transaction::write(MemorySpace::User, 3, 0x5A);
    let frame = t.encode();
    assert_eq!(hex::encode(frame), "8806b400");
    assert_eq!(Transaction::decode(&frame).expect("frame decode"), t);
}

#[test]
fn waveform_write_is_sent_as_read() {
    let t = Transaction::write(MemorySpace::Waveform, 0x1FFF, 0x11);
    assert_eq!(t.access, Access::Read);
    let decoded = Transaction::decode(&t.encode()).expect("frame decode");
    assert_eq!(decoded.space, MemorySpace::Waveform);
    assert_eq!(decoded.address, 0x1FFF);
}

#[test]
fn rx_and_tx_halves_are_distinct() {
    let rx = Transaction::read(MemorySpace::RadioRx, 0x40).encode();
    let tx = Transaction::read(MemorySpace::RadioTx, 0x40).encode();
    assert_ne!(rx, tx);
    assert_eq!(
        Transaction::decode(&rx).expect("frame decode").space,
        MemorySpace::RadioRx
    );
}

#[test]
fn frames_without_selector_are_rejected() {
    assert!(Transaction::decode(&[0, 0, 0, 0]).is_err());
    assert!(Transaction::decode(&[0x88, 0x06, 0xB4, 0x01]).is_err());
}

#[test]
fn reply_value_is_last_byte() {
    assert_eq!(Transaction::reply_value(&[0, 0, 0, 0xC3]), 0xC3);
}
