//! Error types for the AST container

use asttool_adpcm::AdpcmError;
use thiserror::Error;

/// Result type for AST operations
pub type Result<T> = std::result::Result<T, AstError>;

/// Why a container's sample format cannot be handled
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIssue {
    /// Payload is already ADPCM compressed
    #[error("stream is already ADPCM encoded")]
    AlreadyEncoded,
    /// Format field holds an unknown tag
    #[error("unknown sample format tag {0}")]
    UnknownFormat(u16),
    /// Decoded bit depth other than 16
    #[error("unsupported bit depth {0}")]
    BitDepth(u16),
}

/// Errors that can occur while building or parsing AST containers
#[derive(Error, Debug)]
pub enum AstError {
    /// Header does not start with "STRM"
    #[error("Invalid AST magic, expected \"STRM\"")]
    InvalidMagic,

    /// Declared data size disagrees with the buffer length
    #[error("AST size mismatch: header declares {declared} bytes, buffer holds {actual}")]
    SizeMismatch {
        /// Data size field plus header size
        declared: u64,
        /// Actual buffer length
        actual: usize,
    },

    /// Sample format cannot be handled
    #[error("Unsupported AST format: {0}")]
    UnsupportedFormat(FormatIssue),

    /// Channel count outside 1..=6
    #[error("AST channel count {0} is outside the supported range 1..=6")]
    ChannelLimitExceeded(u16),

    /// Bad block magic or block size
    #[error("Corrupt BLCK at offset {offset:#x}: {reason}")]
    CorruptBlock {
        /// Byte offset of the block header
        offset: usize,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Buffer ends before a structure does
    #[error("Insufficient data: need {needed} bytes, have {available}")]
    InsufficientData {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// Channel buffers of different lengths
    #[error("Channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        /// Offending channel index
        channel: usize,
        /// Length of channel 0
        expected: usize,
        /// Length of the offending channel
        actual: usize,
    },

    /// Loop region outside the sample run
    #[error("Invalid loop region {start}..{end} for {num_samples} samples")]
    InvalidLoop {
        /// Loop start sample
        start: u32,
        /// Loop end sample
        end: u32,
        /// Samples per channel
        num_samples: usize,
    },

    /// Sample count does not fit the 32-bit header field
    #[error("Too many samples for an AST header: {0}")]
    TooManySamples(usize),

    /// Sample codec failure
    #[error("ADPCM error: {0}")]
    Adpcm(#[from] AdpcmError),

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AstError {
    /// Whether the error indicates a damaged input container
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            AstError::InvalidMagic
                | AstError::SizeMismatch { .. }
                | AstError::CorruptBlock { .. }
                | AstError::InsufficientData { .. }
        )
    }
}
