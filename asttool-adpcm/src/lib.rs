//! 4-bit ADPCM ("AFC") sample codec.
//!
//! This is the sample codec stored inside AST audio streams. Each channel is
//! coded independently as a sequence of 9-byte frames, every frame holding 16
//! samples:
//!
//! - 1 header byte: scale exponent (high nibble) and predictor index (low nibble)
//! - 8 bytes of signed 4-bit residuals, high nibble first
//!
//! Prediction uses the last two reconstructed samples of the channel, so a
//! channel's [`ChannelState`] has to be carried from one frame (and one
//! container block) to the next in order.
//!
//! ## Example
//!
//! ```
//! use asttool_adpcm::{AdpcmDecoder, AdpcmEncoder};
//!
//! let pcm: Vec<i16> = (0..64).map(|i| (i * 100) as i16).collect();
//! let mut encoder = AdpcmEncoder::new(&pcm);
//! let adpcm = encoder.encode_all().unwrap();
//! assert_eq!(adpcm.len(), asttool_adpcm::encoded_size(pcm.len()));
//!
//! let decoded = AdpcmDecoder::new().decode_to_vec(&adpcm).unwrap();
//! assert_eq!(decoded.len(), pcm.len());
//! ```

#![warn(missing_docs)]

pub mod decoder;
pub mod encoder;
pub mod error;
mod frame;

pub use decoder::AdpcmDecoder;
pub use encoder::{AdpcmEncoder, EncodeStats};
pub use error::{AdpcmError, Result};

/// Samples coded by one frame.
pub const SAMPLES_PER_FRAME: usize = 16;

/// Bytes occupied by one frame.
pub const BYTES_PER_FRAME: usize = 9;

/// Predictor coefficient pairs, 4.11 fixed point, applied to (last, penult).
pub const COEFFICIENTS: [[i16; 2]; 16] = [
    [0, 0],
    [2048, 0],
    [0, 2048],
    [1024, 1024],
    [4096, -2048],
    [3584, -1536],
    [3072, -1024],
    [4608, -2560],
    [4200, -2248],
    [4800, -2880],
    [5120, -3072],
    [2048, -2048],
    [1024, -1024],
    [-1024, 1024],
    [-1024, 0],
    [-2048, 0],
];

/// Predictor memory of one channel: the two most recent reconstructed samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelState {
    /// Most recent sample.
    pub last: i16,
    /// Sample before `last`.
    pub penult: i16,
}

impl ChannelState {
    /// Create a state from explicit history values.
    pub const fn new(last: i16, penult: i16) -> Self {
        Self { last, penult }
    }

    /// Shift a newly reconstructed sample into the history.
    #[inline]
    pub fn push(&mut self, sample: i16) {
        self.penult = self.last;
        self.last = sample;
    }
}

/// Compressed size in bytes of `num_samples` samples.
#[inline]
pub const fn encoded_size(num_samples: usize) -> usize {
    num_samples.div_ceil(SAMPLES_PER_FRAME) * BYTES_PER_FRAME
}

/// Number of samples carried by `num_bytes` of whole frames.
#[inline]
pub const fn decoded_len(num_bytes: usize) -> usize {
    num_bytes / BYTES_PER_FRAME * SAMPLES_PER_FRAME
}
