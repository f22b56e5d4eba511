//! # modhub-api
//!
//! HTTP API layer for ModHub built on Axum.
//!
//! Provides the collaborator REST endpoints, the WebSocket upgrade and
//! per-session socket loops, request logging, CORS, extractors, DTOs, and
//! the mapping from [`AppError`](modhub_core::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
