//! Chat message history.

pub mod log;

pub use log::MessageLog;
