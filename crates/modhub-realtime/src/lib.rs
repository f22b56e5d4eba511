//! # modhub-realtime
//!
//! Real-time WebSocket plumbing for ModHub. Provides:
//!
//! - Session registration with a bounded outbound queue per session
//! - Audience-filtered fan-out (everyone, everyone but some users, only some users)
//! - Ping/pong heartbeat
//! - The tagged JSON wire schema for inbound and outbound frames
//!
//! Policy decisions live in `modhub-service`; this crate only delivers.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod server;

pub use connection::audience::Audience;
pub use connection::handle::SessionHandle;
pub use connection::registry::SessionRegistry;
pub use message::types::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
