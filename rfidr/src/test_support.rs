// rfidr-rs/rfidr/src/test_support.rs
//! Test support helpers intended for use by unit and integration tests.
//!
//! These centralize the mock radio and host wiring so tests across the
//! crate and the tests/ directory build readers the same way.
#![allow(dead_code)]

use crate::config::ReaderConfig;
use crate::constants::MAX_EPC_LEN;
use crate::reader::{Reader, ReaderState};
use crate::transport::{MockHost, MockRadio, RadioReply};

/// Config with short wait budgets so timeout paths finish quickly.
#[doc(hidden)]
pub fn fast_config() -> ReaderConfig {
    ReaderConfig {
        event_timeout_ms: 50,
        ack_timeout_ms: 50,
        ..ReaderConfig::default()
    }
}

/// A reader over one simulated peripheral and host, in the boot state.
/// The mocks are shared handles: keep them to script and inspect.
#[doc(hidden)]
pub fn mock_reader() -> (MockRadio, MockHost, Reader) {
    mock_reader_with(fast_config())
}

#[doc(hidden)]
pub fn mock_reader_with(config: ReaderConfig) -> (MockRadio, MockHost, Reader) {
    let radio = MockRadio::new();
    let host = MockHost::new();
    let reader = Reader::builder()
        .with_bus(Box::new(radio.clone()))
        .with_board(Box::new(radio.clone()))
        .with_host(Box::new(host.clone()))
        .with_config(config)
        .build();
    match reader {
        Ok(reader) => (radio, host, reader),
        Err(e) => panic!("mock reader: {}", e),
    }
}

/// Like [`mock_reader`], but already in configured idle without running
/// the initialization sequence.
#[doc(hidden)]
pub fn configured_reader() -> (MockRadio, MockHost, Reader) {
    let (radio, host, mut reader) = mock_reader();
    reader.ctx.current = ReaderState::IdleConfigured;
    reader.ctx.next = ReaderState::IdleConfigured;
    (radio, host, reader)
}

/// A tag reply whose EPC is `byte` repeated.
#[doc(hidden)]
pub fn tag_reply(byte: u8, main: i32, alt: i32) -> RadioReply {
    RadioReply::Tag {
        epc: [byte; MAX_EPC_LEN],
        main,
        alt,
    }
}
