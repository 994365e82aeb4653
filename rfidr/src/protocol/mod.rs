// rfidr-rs/rfidr/src/protocol/mod.rs

pub mod codec;
pub mod commands;
pub mod frame;
pub mod responses;

pub use commands::*;
pub use frame::Transaction;
pub use responses::*;
