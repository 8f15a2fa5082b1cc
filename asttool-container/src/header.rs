//! STRM and BLCK header definitions, parsing and writing

use crate::error::{AstError, FormatIssue, Result};
use asttool_adpcm::{decoded_len, encoded_size, ChannelState};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read, Write};

/// Magic tag of the stream header
pub const STRM_MAGIC: [u8; 4] = *b"STRM";
/// Magic tag of a data block
pub const BLCK_MAGIC: [u8; 4] = *b"BLCK";

/// Size of the STRM header in bytes
pub const STRM_HEADER_SIZE: usize = 0x40;
/// Size of a BLCK header in bytes
pub const BLCK_HEADER_SIZE: usize = 0x20;
/// Per-channel byte budget of a full block
pub const BLOCK_SIZE: usize = 0x2760;
/// Channels that fit the trailing state region of a block header
pub const MAX_CHANNELS: usize = 6;
/// Volume byte written by the encoder
pub const DEFAULT_VOLUME: u8 = 127;

/// Bytes of STRM header holding fields; the rest is zero padding
const STRM_FIELDS_SIZE: usize = 0x29;
/// End of the magic and data size fields
const STRM_SIZE_FIELD_END: usize = 0x08;
/// Offset of the trailing state region inside a BLCK header
pub(crate) const BLCK_STATE_OFFSET: usize = 0x08;

/// Sample format tag of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 4-bit ADPCM, wire tag 0
    Adpcm4,
    /// Big-endian signed 16-bit PCM, wire tag 1
    Pcm16,
}

impl SampleFormat {
    /// Parse the wire tag
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(SampleFormat::Adpcm4),
            1 => Some(SampleFormat::Pcm16),
            _ => None,
        }
    }

    /// Wire tag
    pub fn tag(self) -> u16 {
        match self {
            SampleFormat::Adpcm4 => 0,
            SampleFormat::Pcm16 => 1,
        }
    }

    /// Unpadded payload bytes for `num_samples` samples of one channel
    pub fn payload_size(self, num_samples: usize) -> usize {
        match self {
            SampleFormat::Adpcm4 => encoded_size(num_samples),
            SampleFormat::Pcm16 => num_samples * 2,
        }
    }

    /// Samples of one channel carried by a full block
    pub fn samples_per_block(self) -> usize {
        match self {
            SampleFormat::Adpcm4 => decoded_len(BLOCK_SIZE),
            SampleFormat::Pcm16 => BLOCK_SIZE / 2,
        }
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::Adpcm4 => "adpcm4",
            SampleFormat::Pcm16 => "pcm16",
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Loop marker field as stored on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopMarker(pub u16);

impl LoopMarker {
    /// Marker of a looped stream
    pub const LOOPED: LoopMarker = LoopMarker(0xFFFF);
    /// Marker of a one-shot stream
    pub const NOT_LOOPED: LoopMarker = LoopMarker(0);

    /// Marker for a loop flag
    pub fn from_looped(looped: bool) -> Self {
        if looped {
            Self::LOOPED
        } else {
            Self::NOT_LOOPED
        }
    }

    /// Only the 0xFFFF sentinel means looped
    pub fn is_looped(self) -> bool {
        self == Self::LOOPED
    }
}

/// Stream header (STRM)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrmHeader {
    /// Container size minus the header size
    pub data_size: u32,
    /// Block payload format
    pub format: SampleFormat,
    /// Bits per decoded sample
    pub bits_per_sample: u16,
    /// Channel count
    pub channels: u16,
    /// Whether the loop marker is set
    pub looped: bool,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Samples per channel
    pub num_samples: u32,
    /// Loop start sample (0 when not looped)
    pub loop_start: u32,
    /// Loop end sample (total samples when not looped)
    pub loop_end: u32,
    /// Full block byte budget
    pub block_size: u32,
    /// Playback volume
    pub volume: u8,
}

impl StrmHeader {
    /// Parse and check the header at the start of `data`.
    ///
    /// Checks run in order: magic, declared size against `data.len()`, then
    /// the format tag. Channel and bit depth limits are left to the caller.
    /// Only a buffer too short to hold the size field is `InsufficientData`;
    /// any other short header fails the size check.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < STRM_MAGIC.len() || data[..4] != STRM_MAGIC {
            return Err(AstError::InvalidMagic);
        }
        if data.len() < STRM_SIZE_FIELD_END {
            return Err(AstError::InsufficientData {
                needed: STRM_SIZE_FIELD_END,
                available: data.len(),
            });
        }

        let data_size = BigEndian::read_u32(&data[4..STRM_SIZE_FIELD_END]);
        let declared = data_size as u64 + STRM_HEADER_SIZE as u64;
        if declared != data.len() as u64 {
            return Err(AstError::SizeMismatch {
                declared,
                actual: data.len(),
            });
        }

        // declared >= 64, so the whole header is present
        let mut reader = Cursor::new(&data[STRM_SIZE_FIELD_END..STRM_HEADER_SIZE]);

        let tag = reader.read_u16::<BigEndian>()?;
        let format = SampleFormat::from_tag(tag)
            .ok_or(AstError::UnsupportedFormat(FormatIssue::UnknownFormat(tag)))?;

        let bits_per_sample = reader.read_u16::<BigEndian>()?;
        let channels = reader.read_u16::<BigEndian>()?;
        let looped = LoopMarker(reader.read_u16::<BigEndian>()?).is_looped();
        let sample_rate = reader.read_u32::<BigEndian>()?;
        let num_samples = reader.read_u32::<BigEndian>()?;
        let loop_start = reader.read_u32::<BigEndian>()?;
        let loop_end = reader.read_u32::<BigEndian>()?;
        let block_size = reader.read_u32::<BigEndian>()?;
        let _reserved = reader.read_u32::<BigEndian>()?;
        let volume = reader.read_u8()?;

        Ok(StrmHeader {
            data_size,
            format,
            bits_per_sample,
            channels,
            looped,
            sample_rate,
            num_samples,
            loop_start,
            loop_end,
            block_size,
            volume,
        })
    }

    /// Write the 64-byte header, zero padded
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&STRM_MAGIC)?;
        writer.write_u32::<BigEndian>(self.data_size)?;
        writer.write_u16::<BigEndian>(self.format.tag())?;
        writer.write_u16::<BigEndian>(self.bits_per_sample)?;
        writer.write_u16::<BigEndian>(self.channels)?;
        writer.write_u16::<BigEndian>(LoopMarker::from_looped(self.looped).0)?;
        writer.write_u32::<BigEndian>(self.sample_rate)?;
        writer.write_u32::<BigEndian>(self.num_samples)?;
        writer.write_u32::<BigEndian>(self.loop_start)?;
        writer.write_u32::<BigEndian>(self.loop_end)?;
        writer.write_u32::<BigEndian>(self.block_size)?;
        writer.write_u32::<BigEndian>(0)?; // reserved
        writer.write_u8(self.volume)?;
        writer.write_all(&[0u8; STRM_HEADER_SIZE - STRM_FIELDS_SIZE])?;
        Ok(())
    }

    /// Playback length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate > 0 {
            self.num_samples as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }
}

/// Write per-channel trailing state, 4 bytes per channel in channel order
pub(crate) fn write_channel_states<W: Write>(writer: &mut W, states: &[ChannelState]) -> Result<()> {
    for state in states.iter().take(MAX_CHANNELS) {
        writer.write_i16::<BigEndian>(state.last)?;
        writer.write_i16::<BigEndian>(state.penult)?;
    }
    Ok(())
}

/// A block header found while walking a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of the BLCK header
    pub offset: usize,
    /// Per-channel payload bytes
    pub size: u32,
    /// Trailing state of each channel
    pub states: Vec<ChannelState>,
}

/// List the block headers of a container whose STRM header is `header`
pub fn read_blocks(data: &[u8], header: &StrmHeader) -> Result<Vec<BlockInfo>> {
    let channels = header.channels as usize;
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(AstError::ChannelLimitExceeded(header.channels));
    }

    let mut blocks = Vec::new();
    let mut offset = STRM_HEADER_SIZE;

    while offset < data.len() {
        let end = offset + BLCK_HEADER_SIZE;
        if end > data.len() {
            return Err(AstError::InsufficientData {
                needed: end,
                available: data.len(),
            });
        }

        let mut reader = Cursor::new(&data[offset..end]);
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != BLCK_MAGIC {
            return Err(AstError::CorruptBlock {
                offset,
                reason: "bad block magic",
            });
        }

        let size = reader.read_u32::<BigEndian>()?;
        let mut states = Vec::with_capacity(channels);
        for _ in 0..channels {
            let last = reader.read_i16::<BigEndian>()?;
            let penult = reader.read_i16::<BigEndian>()?;
            states.push(ChannelState::new(last, penult));
        }

        let next = end + size as usize * channels;
        if next > data.len() {
            return Err(AstError::InsufficientData {
                needed: next,
                available: data.len(),
            });
        }

        blocks.push(BlockInfo {
            offset,
            size,
            states,
        });
        offset = next;
    }

    Ok(blocks)
}
