// rfidr-rs/rfidr/src/utils/mod.rs
//! Small helpers shared across the crate: hex formatting for EPCs and
//! transaction traces, and event wait timeouts.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
