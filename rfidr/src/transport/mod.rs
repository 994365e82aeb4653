// rfidr-rs/rfidr/src/transport/mod.rs
//! Collaborator interfaces of the reader core: the register bus to the
//! radio peripheral, the board, and the host link, plus test doubles.

pub mod mock;
pub mod signal;
pub mod traits;

pub use mock::{MockHost, MockRadio, RadioReply};
pub use signal::EventLatch;
pub use traits::*;
