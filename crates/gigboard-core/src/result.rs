//! Convenience result type alias for GigBoard.

use crate::error::AppError;

/// A specialized `Result` type for GigBoard operations.
pub type AppResult<T> = Result<T, AppError>;
