//! Convenience result type alias for ModHub.

use crate::error::AppError;

/// A specialized `Result` type for ModHub operations.
pub type AppResult<T> = Result<T, AppError>;
