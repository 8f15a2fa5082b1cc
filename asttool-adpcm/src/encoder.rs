//! ADPCM encoder implementation.

use crate::error::{AdpcmError, Result};
use crate::frame::{self, FrameHeader};
use crate::{encoded_size, ChannelState, BYTES_PER_FRAME, COEFFICIENTS, SAMPLES_PER_FRAME};

/// Loop region registered on an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoopPoints {
    start: usize,
    end: usize,
    internal: bool,
}

/// Reconstruction statistics gathered while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EncodeStats {
    /// Frames written.
    pub frames: u64,
    /// Input samples covered by those frames (excluding silence padding).
    pub samples: u64,
    /// Sum of squared reconstruction errors.
    pub squared_error: f64,
    /// Largest absolute reconstruction error.
    pub peak_error: u32,
}

impl EncodeStats {
    /// Root-mean-square reconstruction error.
    pub fn rms_error(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            (self.squared_error / self.samples as f64).sqrt()
        }
    }
}

/// Per-channel ADPCM encoder.
///
/// Borrows the channel's PCM samples and keeps the predictor state between
/// calls, so consecutive [`encode`](Self::encode) calls must walk the stream
/// in ascending sample order.
#[derive(Debug, Clone)]
pub struct AdpcmEncoder<'a> {
    samples: &'a [i16],
    state: ChannelState,
    loop_points: Option<LoopPoints>,
    loop_state: Option<ChannelState>,
    stats: EncodeStats,
}

impl<'a> AdpcmEncoder<'a> {
    /// Load a channel's samples.
    pub fn new(samples: &'a [i16]) -> Self {
        Self {
            samples,
            state: ChannelState::default(),
            loop_points: None,
            loop_state: None,
            stats: EncodeStats::default(),
        }
    }

    /// Register a loop region.
    ///
    /// With `internal` set the loop lives in the surrounding container and the
    /// full sample run is kept. Otherwise the stream ends at `end`.
    pub fn set_loop(&mut self, start: usize, end: usize, internal: bool) -> Result<()> {
        if start > end || end > self.samples.len() {
            return Err(AdpcmError::InvalidLoop {
                start,
                end,
                num_samples: self.samples.len(),
            });
        }
        self.loop_points = Some(LoopPoints {
            start,
            end,
            internal,
        });
        Ok(())
    }

    /// Number of samples this encoder will emit.
    pub fn num_samples(&self) -> usize {
        match self.loop_points {
            Some(points) if !points.internal => points.end,
            _ => self.samples.len(),
        }
    }

    /// Compressed size of the whole stream.
    pub fn encoded_size(&self) -> usize {
        encoded_size(self.num_samples())
    }

    /// Current predictor state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Most recent reconstructed sample.
    pub fn last(&self) -> i16 {
        self.state.last
    }

    /// Sample before [`last`](Self::last).
    pub fn penult(&self) -> i16 {
        self.state.penult
    }

    /// Predictor state right before the loop start sample, once encoded.
    pub fn loop_state(&self) -> Option<ChannelState> {
        self.loop_state
    }

    /// Statistics for everything encoded so far.
    pub fn stats(&self) -> &EncodeStats {
        &self.stats
    }

    /// Encode up to `sample_span` samples starting at `sample_offset`.
    ///
    /// The span is clipped to the end of the stream and a short final frame is
    /// padded with silence. Returns the number of bytes written to `dest`.
    pub fn encode(
        &mut self,
        dest: &mut [u8],
        sample_offset: usize,
        sample_span: usize,
    ) -> Result<usize> {
        if sample_offset % SAMPLES_PER_FRAME != 0 {
            return Err(AdpcmError::MisalignedOffset(sample_offset));
        }

        let end = sample_offset
            .saturating_add(sample_span)
            .min(self.num_samples());
        let span = end.saturating_sub(sample_offset);
        let needed = encoded_size(span);
        if dest.len() < needed {
            return Err(AdpcmError::BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }

        for (i, out) in dest[..needed].chunks_exact_mut(BYTES_PER_FRAME).enumerate() {
            let start = sample_offset + i * SAMPLES_PER_FRAME;
            let count = (end - start).min(SAMPLES_PER_FRAME);
            self.encode_frame(start, count, out);
        }

        Ok(needed)
    }

    /// Encode the whole stream into a new buffer.
    pub fn encode_all(&mut self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.encoded_size()];
        let written = self.encode(&mut out, 0, self.num_samples())?;
        debug_assert_eq!(written, out.len());
        tracing::debug!(
            samples = self.num_samples(),
            bytes = written,
            rms_error = self.stats.rms_error(),
            "Encoded ADPCM stream"
        );
        Ok(out)
    }

    fn encode_frame(&mut self, start: usize, count: usize, out: &mut [u8]) {
        let mut input = [0i16; SAMPLES_PER_FRAME];
        input[..count].copy_from_slice(&self.samples[start..start + count]);

        let (header, _) = search_frame(&input, self.state);

        out[0] = header.to_byte();
        let body = &mut out[1..BYTES_PER_FRAME];
        let loop_start = self.loop_points.map(|p| p.start);

        for (i, &sample) in input.iter().enumerate() {
            if loop_start == Some(start + i) {
                self.loop_state = Some(self.state);
            }

            let nibble = quantize(sample, header, self.state);
            frame::put_nibble(body, i, nibble);
            let decoded = frame::reconstruct(nibble, header, &mut self.state);

            if i < count {
                let error = (sample as i32 - decoded as i32).unsigned_abs();
                self.stats.squared_error += (error as f64) * (error as f64);
                self.stats.peak_error = self.stats.peak_error.max(error);
            }
        }

        self.stats.frames += 1;
        self.stats.samples += count as u64;
    }
}

/// Pick the header minimising squared error for one frame from `state`.
fn search_frame(input: &[i16; SAMPLES_PER_FRAME], state: ChannelState) -> (FrameHeader, i64) {
    let mut best = (FrameHeader::from_byte(0), i64::MAX);

    for coef_index in 0..COEFFICIENTS.len() as u8 {
        for scale_shift in 0..16u8 {
            let header = FrameHeader {
                scale_shift,
                coef_index,
            };
            let error = trial_error(input, header, state, best.1);
            if error < best.1 {
                best = (header, error);
                if error == 0 {
                    return best;
                }
            }
        }
    }

    best
}

/// Squared error of coding `input` with `header`, giving up past `limit`.
fn trial_error(
    input: &[i16; SAMPLES_PER_FRAME],
    header: FrameHeader,
    mut state: ChannelState,
    limit: i64,
) -> i64 {
    let mut total = 0i64;
    for &sample in input {
        let nibble = quantize(sample, header, state);
        let decoded = frame::reconstruct(nibble, header, &mut state);
        let diff = sample as i64 - decoded as i64;
        total += diff * diff;
        if total >= limit {
            break;
        }
    }
    total
}

/// Residual nibble closest to `sample` under the given prediction.
#[inline]
fn quantize(sample: i16, header: FrameHeader, state: ChannelState) -> i32 {
    let residual = ((sample as i32) << 11) - frame::predict(header, state);
    let step = header.scale() << 11;
    (residual + step / 2).div_euclid(step).clamp(-8, 7)
}
