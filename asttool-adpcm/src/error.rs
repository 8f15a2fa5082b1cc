//! ADPCM codec error types.

use thiserror::Error;

/// ADPCM codec error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdpcmError {
    /// Loop bounds do not fit the loaded samples.
    #[error("Invalid loop region {start}..{end} for {num_samples} samples")]
    InvalidLoop {
        /// Loop start sample.
        start: usize,
        /// Loop end sample.
        end: usize,
        /// Number of loaded samples.
        num_samples: usize,
    },

    /// Encode offset does not start on a frame boundary.
    #[error("Sample offset {0} is not aligned to a 16-sample frame")]
    MisalignedOffset(usize),

    /// Destination buffer cannot hold the output.
    #[error("Buffer too small: need {needed}, have {available}")]
    BufferTooSmall {
        /// Required length.
        needed: usize,
        /// Provided length.
        available: usize,
    },

    /// Compressed input ends in the middle of a frame.
    #[error("ADPCM data length {0} is not a multiple of the 9-byte frame size")]
    TruncatedFrame(usize),
}

/// ADPCM result type.
pub type Result<T> = std::result::Result<T, AdpcmError>;
