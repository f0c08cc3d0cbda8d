//! Centralized error handling for the aggregator
//!
//! Errors are split by how far they are allowed to travel:
//!
//! - **Configuration errors** abort the run before any stage executes
//! - **Source errors** are confined to one source, one line or one channel;
//!   they are logged and the offending unit is skipped
//! - Probe failures are not errors at all, they become `offline` channels
//!
//! Only [`AppError`] escapes to the binary.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
