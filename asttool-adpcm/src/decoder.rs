//! ADPCM decoder implementation.

use crate::error::{AdpcmError, Result};
use crate::frame::{self, FrameHeader};
use crate::{decoded_len, ChannelState, BYTES_PER_FRAME, SAMPLES_PER_FRAME};

/// Per-channel ADPCM decoder.
#[derive(Debug, Clone, Default)]
pub struct AdpcmDecoder {
    state: ChannelState,
}

impl AdpcmDecoder {
    /// Create a decoder with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder resuming from a known predictor state.
    pub fn with_state(state: ChannelState) -> Self {
        Self { state }
    }

    /// Current predictor state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Decode whole frames from `src` into `dest`.
    ///
    /// Returns the number of samples written.
    pub fn decode(&mut self, src: &[u8], dest: &mut [i16]) -> Result<usize> {
        if src.len() % BYTES_PER_FRAME != 0 {
            return Err(AdpcmError::TruncatedFrame(src.len()));
        }

        let needed = decoded_len(src.len());
        if dest.len() < needed {
            return Err(AdpcmError::BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }

        for (input, output) in src
            .chunks_exact(BYTES_PER_FRAME)
            .zip(dest.chunks_exact_mut(SAMPLES_PER_FRAME))
        {
            self.decode_frame(input, output);
        }

        Ok(needed)
    }

    /// Decode `src` into a newly allocated buffer.
    pub fn decode_to_vec(&mut self, src: &[u8]) -> Result<Vec<i16>> {
        let mut out = vec![0i16; decoded_len(src.len())];
        self.decode(src, &mut out)?;
        Ok(out)
    }

    fn decode_frame(&mut self, input: &[u8], output: &mut [i16]) {
        let header = FrameHeader::from_byte(input[0]);
        let body = &input[1..];
        for (i, sample) in output.iter_mut().enumerate() {
            *sample = frame::reconstruct(frame::nibble(body, i), header, &mut self.state);
        }
    }
}
