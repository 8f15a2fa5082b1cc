//! Block layout arithmetic.
//!
//! Every size here is known before a single byte is written: the encoder
//! allocates exactly [`BlockLayout::container_size`] bytes and fills them in
//! place.
//!
//! A container is the 64-byte STRM header followed by `block_count` blocks.
//! Each block is a 32-byte BLCK header plus one payload region per channel.
//! All blocks but the last carry [`BLOCK_SIZE`] bytes per channel; the last
//! one carries the remainder, padded up to [`ALIGNMENT`].

use crate::header::{SampleFormat, BLCK_HEADER_SIZE, BLCK_STATE_OFFSET, BLOCK_SIZE, STRM_HEADER_SIZE};

/// Granularity of every padded region
pub const ALIGNMENT: usize = 0x20;

/// Round `size` up to the next multiple of [`ALIGNMENT`]
#[inline]
pub const fn align_up(size: usize) -> usize {
    size.div_ceil(ALIGNMENT) * ALIGNMENT
}

/// Number of blocks needed for `num_samples` ADPCM samples
pub fn block_count(num_samples: usize) -> usize {
    BlockLayout::new(SampleFormat::Adpcm4, num_samples).block_count()
}

/// Exact size of an ADPCM container holding `num_samples` samples per channel
pub fn total_container_size(num_samples: usize, channels: usize) -> usize {
    BlockLayout::new(SampleFormat::Adpcm4, num_samples).container_size(channels)
}

/// One block's slice of the sample run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Block index
    pub index: usize,
    /// First sample covered by the block
    pub sample_offset: usize,
    /// Samples per channel in the block
    pub sample_count: usize,
    /// Padded per-channel payload bytes
    pub byte_size: usize,
}

/// Layout of a container for a given format and sample count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    format: SampleFormat,
    num_samples: usize,
    aligned_size: usize,
    block_count: usize,
}

impl BlockLayout {
    /// Compute the layout of `num_samples` samples per channel
    pub fn new(format: SampleFormat, num_samples: usize) -> Self {
        let aligned_size = align_up(format.payload_size(num_samples));
        BlockLayout {
            format,
            num_samples,
            aligned_size,
            block_count: aligned_size.div_ceil(BLOCK_SIZE),
        }
    }

    /// Payload format
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Samples per channel
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of BLCK blocks
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Sample stride between consecutive blocks
    pub fn samples_per_block(&self) -> usize {
        self.format.samples_per_block()
    }

    /// Per-channel payload bytes of the final block
    pub fn last_block_size(&self) -> usize {
        match self.block_count {
            0 => 0,
            n => self.aligned_size - (n - 1) * BLOCK_SIZE,
        }
    }

    /// Exact container size in bytes for `channels` channels
    pub fn container_size(&self, channels: usize) -> usize {
        let size = STRM_HEADER_SIZE + self.block_count * BLCK_HEADER_SIZE;

        if self.aligned_size % BLOCK_SIZE == 0 {
            // every block is full
            size + self.aligned_size * channels
        } else {
            let full_blocks = (self.block_count - 1) * BLOCK_SIZE;
            size + (full_blocks + self.last_block_size()) * channels
        }
    }

    /// Span of block `index`, if it exists
    pub fn block_span(&self, index: usize) -> Option<BlockSpan> {
        if index >= self.block_count {
            return None;
        }

        let sample_offset = index * self.samples_per_block();
        let sample_count = self
            .samples_per_block()
            .min(self.num_samples - sample_offset);

        Some(BlockSpan {
            index,
            sample_offset,
            sample_count,
            byte_size: align_up(self.format.payload_size(sample_count)),
        })
    }

    /// All block spans in stream order
    pub fn blocks(&self) -> impl Iterator<Item = BlockSpan> + '_ {
        (0..self.block_count).filter_map(move |index| self.block_span(index))
    }

    /// Byte offset of block `index`'s BLCK header
    pub fn block_offset(&self, index: usize, channels: usize) -> usize {
        STRM_HEADER_SIZE + index * (BLCK_HEADER_SIZE + BLOCK_SIZE * channels)
    }

    /// Byte offset of the trailing state region in the final block header
    pub fn last_state_offset(&self, channels: usize) -> Option<usize> {
        self.block_count
            .checked_sub(1)
            .map(|last| self.block_offset(last, channels) + BLCK_STATE_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPB: usize = 17920;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 32);
        assert_eq!(align_up(32), 32);
        assert_eq!(align_up(33), 64);
        assert_eq!(align_up(BLOCK_SIZE), BLOCK_SIZE);
    }

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(0), 0);
        assert_eq!(block_count(1), 1);
        assert_eq!(block_count(100), 1);
        assert_eq!(block_count(SPB), 1);
        assert_eq!(block_count(SPB + 1), 2);
        assert_eq!(block_count(3 * SPB), 3);
    }

    #[test]
    fn test_total_size_single_block() {
        // 100 samples -> 7 frames -> 63 bytes -> 64 aligned
        assert_eq!(total_container_size(100, 1), 64 + 32 + 64);
        assert_eq!(total_container_size(100, 2), 64 + 32 + 128);
    }

    #[test]
    fn test_total_size_full_blocks() {
        assert_eq!(
            total_container_size(2 * SPB, 2),
            64 + 2 * 32 + 2 * BLOCK_SIZE * 2
        );
    }

    #[test]
    fn test_total_size_partial_last_block() {
        let layout = BlockLayout::new(SampleFormat::Adpcm4, SPB + 1);
        assert_eq!(layout.block_count(), 2);
        assert_eq!(layout.last_block_size(), 32);
        assert_eq!(layout.container_size(3), 64 + 2 * 32 + (BLOCK_SIZE + 32) * 3);
    }

    #[test]
    fn test_spans_cover_stream() {
        let layout = BlockLayout::new(SampleFormat::Adpcm4, 2 * SPB + 500);
        let spans: Vec<_> = layout.blocks().collect();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].sample_offset, SPB);
        assert_eq!(spans[2].sample_count, 500);
        assert_eq!(spans[2].byte_size, align_up(32 * 9));
        assert_eq!(spans[2].byte_size, layout.last_block_size());

        let total: usize = spans.iter().map(|s| BLCK_HEADER_SIZE + s.byte_size * 2).sum();
        assert_eq!(STRM_HEADER_SIZE + total, layout.container_size(2));
    }

    #[test]
    fn test_pcm_layout() {
        let layout = BlockLayout::new(SampleFormat::Pcm16, 5041);
        assert_eq!(layout.block_count(), 2);
        assert_eq!(layout.samples_per_block(), 5040);
        assert_eq!(layout.last_block_size(), 32);
        assert_eq!(layout.block_span(1).unwrap().sample_count, 1);
        assert_eq!(layout.block_span(2), None);
    }

    #[test]
    fn test_state_offsets() {
        let layout = BlockLayout::new(SampleFormat::Adpcm4, 2 * SPB + 1);
        assert_eq!(layout.block_offset(0, 2), 64);
        assert_eq!(layout.block_offset(1, 2), 64 + 32 + 2 * BLOCK_SIZE);
        assert_eq!(
            layout.last_state_offset(2),
            Some(64 + 2 * (32 + 2 * BLOCK_SIZE) + 8)
        );
        assert_eq!(BlockLayout::new(SampleFormat::Adpcm4, 0).last_state_offset(1), None);
    }

    #[test]
    fn test_empty_stream() {
        let layout = BlockLayout::new(SampleFormat::Adpcm4, 0);
        assert_eq!(layout.block_count(), 0);
        assert_eq!(layout.last_block_size(), 0);
        assert_eq!(layout.container_size(2), STRM_HEADER_SIZE);
        assert_eq!(layout.blocks().count(), 0);
    }
}
