// rfidr-rs/rfidr/src/lib.rs

//! rfidr
//!
//! Protocol orchestration core of a handheld UHF RFID reader: the reader
//! state machine, tag search, inventory, tracking and programming on top
//! of a register-mapped radio peripheral and a host link.
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod reader;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::ReaderFault`,
// `crate::Result` and the value types in `types` are available to
// consumers and to the `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
