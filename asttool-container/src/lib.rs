//! AST Audio Stream Container
//!
//! This crate lays out, writes and parses AST streaming audio containers: a
//! 64-byte STRM header followed by fixed-granularity BLCK blocks, each holding
//! one time slice of every channel plus the channels' trailing predictor state.
//!
//! # Features
//!
//! - Exact size arithmetic ([`block_count`], [`total_container_size`], [`BlockLayout`])
//! - Container encoding with ADPCM or PCM16 payloads ([`AstEncoder`])
//! - PCM16 container decoding ([`AstDecoder`])
//! - PCM16 to ADPCM conversion ([`AstTranscoder`])
//!
//! # Example
//!
//! ```
//! use asttool_container::{AstDecoder, AstEncoder, AstEncoderConfig, AudioStream};
//!
//! let left: Vec<i16> = (0..1000).map(|i| (i * 20) as i16).collect();
//! let right = left.clone();
//! let stream = AudioStream::new(32000, vec![left, right])
//!     .unwrap()
//!     .with_loop(100, 900)
//!     .unwrap();
//!
//! let pcm = AstEncoder::new(AstEncoderConfig::pcm16()).encode(&stream).unwrap();
//! let decoded = AstDecoder::decode(&pcm.data).unwrap();
//! assert_eq!(decoded.loop_region(), stream.loop_region());
//! ```

mod decoder;
mod encoder;
mod error;
mod header;
mod layout;
mod stream;
mod transcoder;

pub use asttool_adpcm::ChannelState;
pub use decoder::AstDecoder;
pub use encoder::{AstEncoder, AstEncoderConfig, ChannelSummary, EncodedAst, ProgressCallback};
pub use error::{AstError, FormatIssue, Result};
pub use header::{
    read_blocks, BlockInfo, LoopMarker, SampleFormat, StrmHeader, BLCK_HEADER_SIZE, BLCK_MAGIC,
    BLOCK_SIZE, DEFAULT_VOLUME, MAX_CHANNELS, STRM_HEADER_SIZE, STRM_MAGIC,
};
pub use layout::{align_up, block_count, total_container_size, BlockLayout, BlockSpan, ALIGNMENT};
pub use stream::{AudioStream, LoopRegion};
pub use transcoder::AstTranscoder;
