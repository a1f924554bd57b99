//! Convenience result type alias for EcoLearn.

use crate::error::AppError;

/// A specialized `Result` type for EcoLearn operations.
pub type AppResult<T> = Result<T, AppError>;
