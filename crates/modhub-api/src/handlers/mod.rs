//! HTTP and WebSocket handlers.

pub mod files;
pub mod health;
pub mod messages;
pub mod url_checks;
pub mod users;
pub mod violations;
pub mod ws;
