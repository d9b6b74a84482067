//! Convenience result type alias for LeadDocs.

use crate::error::AppError;

/// A specialized `Result` type for LeadDocs operations.
pub type AppResult<T> = Result<T, AppError>;
