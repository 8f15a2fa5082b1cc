//! AST decoder
//!
//! Recovers per-channel PCM samples from an uncompressed (PCM16) AST
//! container. Compressed containers are rejected: this decoder exists to feed
//! [`AstTranscoder`](crate::AstTranscoder).

use crate::error::{AstError, FormatIssue, Result};
use crate::header::{SampleFormat, StrmHeader, BLCK_HEADER_SIZE, BLCK_MAGIC, MAX_CHANNELS, STRM_HEADER_SIZE};
use crate::stream::AudioStream;
use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

/// Parser for PCM16 AST containers
#[derive(Debug, Clone, Copy, Default)]
pub struct AstDecoder;

impl AstDecoder {
    /// Read the STRM header without format restrictions
    pub fn read_header(data: &[u8]) -> Result<StrmHeader> {
        StrmHeader::parse(data)
    }

    /// Validate `data` and recover its samples and stream metadata
    pub fn decode(data: &[u8]) -> Result<AudioStream> {
        let header = StrmHeader::parse(data)?;

        match header.format {
            SampleFormat::Pcm16 => {}
            SampleFormat::Adpcm4 => {
                return Err(AstError::UnsupportedFormat(FormatIssue::AlreadyEncoded));
            }
        }
        if header.bits_per_sample != 16 {
            return Err(AstError::UnsupportedFormat(FormatIssue::BitDepth(
                header.bits_per_sample,
            )));
        }

        let channels = header.channels as usize;
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(AstError::ChannelLimitExceeded(header.channels));
        }

        // loop region may reach past the nominal length
        let num_samples = header.num_samples.max(header.loop_end) as usize;

        // every sample needs two payload bytes per channel
        let needed = STRM_HEADER_SIZE.saturating_add(num_samples.saturating_mul(channels * 2));
        if needed > data.len() {
            return Err(AstError::InsufficientData {
                needed,
                available: data.len(),
            });
        }

        debug!(
            channels,
            sample_rate = header.sample_rate,
            num_samples,
            looped = header.looped,
            "Decoding PCM16 AST"
        );

        // reads are clipped at num_samples, so block padding never lands in
        // the buffers and they need no slack
        let mut buffers = vec![vec![0i16; num_samples]; channels];

        let mut offset = STRM_HEADER_SIZE;
        let mut current = 0usize;

        while current < num_samples {
            let block_start = offset;
            let block = slice(data, offset, BLCK_HEADER_SIZE)?;
            if block[..4] != BLCK_MAGIC {
                return Err(AstError::CorruptBlock {
                    offset: block_start,
                    reason: "bad block magic",
                });
            }

            let block_size = BigEndian::read_u32(&block[4..8]) as usize;
            if block_size % 2 != 0 {
                return Err(AstError::CorruptBlock {
                    offset: block_start,
                    reason: "odd block size",
                });
            }
            if block_size == 0 {
                return Err(AstError::CorruptBlock {
                    offset: block_start,
                    reason: "empty block",
                });
            }
            offset += BLCK_HEADER_SIZE;

            let words = block_size / 2;
            let take = words.min(num_samples - current);

            for buf in buffers.iter_mut() {
                let payload = slice(data, offset, block_size)?;
                BigEndian::read_i16_into(&payload[..take * 2], &mut buf[current..current + take]);
                offset += block_size;
            }

            current += words;
        }

        let stream = AudioStream::new(header.sample_rate, buffers)?;
        if header.looped {
            stream.with_loop(header.loop_start, header.loop_end)
        } else {
            Ok(stream)
        }
    }
}

/// Borrow `len` bytes at `offset`, or report how far the data falls short
fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset + len;
    data.get(offset..end).ok_or(AstError::InsufficientData {
        needed: end,
        available: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{AstEncoder, AstEncoderConfig};

    fn pcm_container(channels: usize, len: usize) -> Vec<u8> {
        let buffers = (0..channels)
            .map(|c| (0..len).map(|i| (i * (c + 1)) as i16).collect())
            .collect();
        let stream = AudioStream::new(22050, buffers).unwrap();
        AstEncoder::new(AstEncoderConfig::pcm16())
            .encode(&stream)
            .unwrap()
            .into_bytes()
    }

    #[test]
    fn test_decode_pcm() {
        let data = pcm_container(2, 300);
        let stream = AstDecoder::decode(&data).unwrap();
        assert_eq!(stream.num_channels(), 2);
        assert_eq!(stream.num_samples(), 300);
        assert_eq!(stream.sample_rate(), 22050);
        assert_eq!(stream.channel(1).unwrap()[299], 598);
    }

    #[test]
    fn test_invalid_magic() {
        let mut data = pcm_container(1, 10);
        data[0] = b'X';
        assert!(matches!(AstDecoder::decode(&data), Err(AstError::InvalidMagic)));
        assert!(matches!(AstDecoder::decode(&[]), Err(AstError::InvalidMagic)));
    }

    #[test]
    fn test_short_buffer_is_size_mismatch() {
        let mut data = [0u8; 32];
        data[..4].copy_from_slice(b"STRM");
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::SizeMismatch {
                declared: 64,
                actual: 32
            })
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let mut data = pcm_container(1, 10);
        data.extend_from_slice(&[0; 32]);
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_already_encoded() {
        let stream = AudioStream::new(32000, vec![vec![0; 10]]).unwrap();
        let data = AstEncoder::default().encode(&stream).unwrap().data;
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::UnsupportedFormat(FormatIssue::AlreadyEncoded))
        ));
    }

    #[test]
    fn test_bit_depth() {
        let mut data = pcm_container(1, 10);
        data[0x0B] = 8;
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::UnsupportedFormat(FormatIssue::BitDepth(8)))
        ));
    }

    #[test]
    fn test_channel_limit() {
        let mut data = pcm_container(1, 10);
        data[0x0D] = 7;
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::ChannelLimitExceeded(7))
        ));
    }

    #[test]
    fn test_odd_block_size() {
        let mut data = pcm_container(1, 10);
        data[STRM_HEADER_SIZE + 7] = 0x21;
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::CorruptBlock {
                offset: STRM_HEADER_SIZE,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_block_size() {
        let mut data = pcm_container(1, 10);
        data[STRM_HEADER_SIZE + 4..STRM_HEADER_SIZE + 8].copy_from_slice(&[0; 4]);
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::CorruptBlock {
                offset: STRM_HEADER_SIZE,
                reason: "empty block"
            })
        ));
    }

    #[test]
    fn test_bad_block_magic() {
        let mut data = pcm_container(1, 10);
        data[STRM_HEADER_SIZE] = b'X';
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::CorruptBlock { .. })
        ));
    }

    #[test]
    fn test_truncated_blocks() {
        let mut data = pcm_container(1, 10);
        // claim more samples than the blocks hold, keeping the size field honest
        data[0x17] = 200;
        assert!(matches!(
            AstDecoder::decode(&data),
            Err(AstError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_loop_end_widens_samples() {
        let stream = AudioStream::new(32000, vec![(0..64).collect()])
            .unwrap()
            .with_loop(8, 64)
            .unwrap();
        let mut data = AstEncoder::new(AstEncoderConfig::pcm16())
            .encode(&stream)
            .unwrap()
            .into_bytes();

        // shrink the nominal length; the loop end still covers 64 samples
        data[0x17] = 40;
        let decoded = AstDecoder::decode(&data).unwrap();
        assert_eq!(decoded.num_samples(), 64);
        assert_eq!(decoded.channel(0).unwrap()[63], 63);
        assert_eq!(decoded.loop_region().unwrap().end, 64);
    }

    #[test]
    fn test_reads_clip_at_sample_count() {
        // 10 samples padded to a 32-byte (16 sample) block
        let data = pcm_container(2, 10);
        let stream = AstDecoder::decode(&data).unwrap();
        assert_eq!(stream.num_samples(), 10);
        assert_eq!(stream.channel(0).unwrap(), &(0..10).collect::<Vec<i16>>()[..]);
        assert_eq!(stream.channel(1).unwrap()[9], 18);
    }

    #[test]
    fn test_read_header_accepts_adpcm() {
        let stream = AudioStream::new(32000, vec![vec![0; 10]]).unwrap();
        let data = AstEncoder::default().encode(&stream).unwrap().data;
        let header = AstDecoder::read_header(&data).unwrap();
        assert_eq!(header.format, SampleFormat::Adpcm4);
    }
}
