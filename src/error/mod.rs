// Error types for the audio similarity index
//
// This module defines the structured error type shared by feature extraction
// and the similarity index, with numeric codes for callers that need them.

mod index;

pub use index::{log_index_error, IndexError, IndexErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
