// Index error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Index error code constants
///
/// Error code range: 2001-2004
pub struct IndexErrorCodes {}

impl IndexErrorCodes {
    /// Signal is empty, contains non-finite samples, or yields a non-finite descriptor
    pub const INVALID_AUDIO_INPUT: i32 = 2001;

    /// Frame/hop parameters cannot be used for analysis
    pub const INVALID_FRAMING: i32 = 2002;

    /// Descriptor built from a slice of the wrong length
    pub const DIMENSION_MISMATCH: i32 = 2003;

    /// Mutex guarding a shared index was poisoned
    pub const LOCK_POISONED: i32 = 2004;
}

/// Log an index error with structured context
///
/// Logs the numeric code, the component and the human-readable message.
pub fn log_index_error(err: &IndexError, context: &str) {
    error!(
        "Index error in {}: code={}, component=SimilarityIndex, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by feature extraction and the similarity index
///
/// An empty index is not an error: queries against it return no matches.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Signal cannot be analysed (empty, non-finite samples, degenerate output)
    InvalidAudioInput { reason: String },

    /// Frame/hop parameters cannot be used for analysis
    InvalidFraming { frame_size: usize, hop_size: usize },

    /// Descriptor built from a slice of the wrong length
    DimensionMismatch { expected: usize, got: usize },

    /// Mutex guarding a shared index was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for IndexError {
    fn code(&self) -> i32 {
        match self {
            IndexError::InvalidAudioInput { .. } => IndexErrorCodes::INVALID_AUDIO_INPUT,
            IndexError::InvalidFraming { .. } => IndexErrorCodes::INVALID_FRAMING,
            IndexError::DimensionMismatch { .. } => IndexErrorCodes::DIMENSION_MISMATCH,
            IndexError::LockPoisoned { .. } => IndexErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            IndexError::InvalidAudioInput { reason } => {
                format!("Invalid audio input: {}", reason)
            }
            IndexError::InvalidFraming {
                frame_size,
                hop_size,
            } => {
                format!(
                    "Invalid framing (frame_size={}, hop_size={}): frame_size must be >= 2 and 0 < hop_size <= frame_size",
                    frame_size, hop_size
                )
            }
            IndexError::DimensionMismatch { expected, got } => {
                format!(
                    "Descriptor must have {} components (got {})",
                    expected, got
                )
            }
            IndexError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for IndexError {}
