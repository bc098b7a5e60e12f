//! Result type aliases for adpull.

use crate::AdpullError;

/// A specialized `Result` type for adpull operations.
pub type AdpullResult<T> = Result<T, AdpullError>;
