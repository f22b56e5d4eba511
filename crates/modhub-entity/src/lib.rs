//! # modhub-entity
//!
//! Domain entity models for ModHub. Every struct in this crate is a record
//! held by the in-memory stores of `modhub-service` or a value object
//! attached to one. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod file;
pub mod message;
pub mod url_check;
pub mod user;
pub mod violation;
