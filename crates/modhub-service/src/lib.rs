//! # modhub-service
//!
//! The moderation core of ModHub. The [`Hub`](hub::Hub) consumes inbound
//! session events and REST commands, applies the content policy, drives
//! the file workflow and violation ledger, and fans results out through
//! the session registry.
//!
//! All state lives in process memory. Per-user and per-file mutations are
//! serialized through DashMap entry guards; independent keys proceed in
//! parallel.

pub mod context;
pub mod file;
pub mod hub;
pub mod links;
pub mod message;
pub mod moderation;
pub mod rbac;
pub mod scanner;
pub mod user;

pub use context::RequestContext;
pub use hub::Hub;
