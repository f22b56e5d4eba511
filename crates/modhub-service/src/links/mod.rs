//! Review of links posted in chat.

pub mod registry;

pub use registry::{HeldMessage, LinkRegistry, Release};
