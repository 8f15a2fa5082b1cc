//! In-memory audio stream

use crate::error::{AstError, Result};
use crate::header::MAX_CHANNELS;

/// Loop region in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRegion {
    /// First sample of the loop
    pub start: u32,
    /// Sample where playback jumps back to `start`
    pub end: u32,
}

/// Decoded audio: per-channel signed 16-bit samples plus stream metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    sample_rate: u32,
    loop_region: Option<LoopRegion>,
    channels: Vec<Vec<i16>>,
}

impl AudioStream {
    /// Build a stream from per-channel sample buffers of equal length
    pub fn new(sample_rate: u32, channels: Vec<Vec<i16>>) -> Result<Self> {
        if channels.is_empty() || channels.len() > MAX_CHANNELS {
            return Err(AstError::ChannelLimitExceeded(
                channels.len().min(u16::MAX as usize) as u16,
            ));
        }

        let expected = channels[0].len();
        if let Some((channel, buf)) = channels
            .iter()
            .enumerate()
            .find(|(_, buf)| buf.len() != expected)
        {
            return Err(AstError::ChannelLengthMismatch {
                channel,
                expected,
                actual: buf.len(),
            });
        }

        if u32::try_from(expected).is_err() {
            return Err(AstError::TooManySamples(expected));
        }

        Ok(AudioStream {
            sample_rate,
            loop_region: None,
            channels,
        })
    }

    /// Set the loop region; `start <= end <= num_samples` must hold
    pub fn with_loop(mut self, start: u32, end: u32) -> Result<Self> {
        if start > end || end as usize > self.num_samples() {
            return Err(AstError::InvalidLoop {
                start,
                end,
                num_samples: self.num_samples(),
            });
        }
        self.loop_region = Some(LoopRegion { start, end });
        Ok(self)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels[0].len()
    }

    /// Whether a loop region is set
    pub fn is_looped(&self) -> bool {
        self.loop_region.is_some()
    }

    /// Loop region, if any
    pub fn loop_region(&self) -> Option<LoopRegion> {
        self.loop_region
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[i16]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels in order
    pub fn channels(&self) -> impl Iterator<Item = &[i16]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Playback length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }
}
