//! Shared value types.

pub mod id;

pub use id::{FileId, MessageId, SessionId, UrlCheckId, UserId, ViolationId};
