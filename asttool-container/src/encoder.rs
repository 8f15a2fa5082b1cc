//! AST encoder

use crate::error::{AstError, Result};
use crate::header::{
    write_channel_states, SampleFormat, StrmHeader, BLCK_HEADER_SIZE, BLCK_MAGIC,
    BLCK_STATE_OFFSET, BLOCK_SIZE, DEFAULT_VOLUME, MAX_CHANNELS, STRM_HEADER_SIZE,
};
use crate::layout::{BlockLayout, BlockSpan};
use crate::stream::{AudioStream, LoopRegion};
use asttool_adpcm::{AdpcmEncoder, ChannelState};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};
use tracing::{debug, info, trace};

/// Progress callback: percentage done and index of the block just written
pub type ProgressCallback = Box<dyn Fn(f64, usize) + Send>;

/// Bytes reserved for trailing channel state in a BLCK header
const BLCK_STATE_SIZE: usize = BLCK_HEADER_SIZE - BLCK_STATE_OFFSET;

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstEncoderConfig {
    /// Block payload format
    pub format: SampleFormat,
    /// Volume byte stored in the header
    pub volume: u8,
}

impl Default for AstEncoderConfig {
    fn default() -> Self {
        AstEncoderConfig {
            format: SampleFormat::Adpcm4,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl AstEncoderConfig {
    /// Configuration writing uncompressed PCM16 blocks
    pub fn pcm16() -> Self {
        AstEncoderConfig {
            format: SampleFormat::Pcm16,
            ..Default::default()
        }
    }
}

/// Per-channel result of an encode pass
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    /// Channel index
    pub channel: usize,
    /// Samples written
    pub samples: u64,
    /// RMS reconstruction error (0 for PCM)
    pub rms_error: f64,
    /// Peak reconstruction error (0 for PCM)
    pub peak_error: u32,
    /// Codec state after the last block
    pub final_state: ChannelState,
    /// Codec state at the loop start, when looped
    pub loop_state: Option<ChannelState>,
}

/// Output of [`AstEncoder::encode`]
#[derive(Debug, Clone)]
pub struct EncodedAst {
    /// Container bytes
    pub data: Vec<u8>,
    /// One summary per channel
    pub summaries: Vec<ChannelSummary>,
}

impl EncodedAst {
    /// Take the container bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Payload writer for one channel
trait ChannelEncoder {
    /// Fill `dest` with the block's payload and advance the channel state
    fn encode_block(&mut self, dest: &mut [u8], span: &BlockSpan) -> Result<()>;

    /// State embedded in the block header after this channel's payload
    fn state(&self) -> ChannelState;

    fn summary(&self, channel: usize) -> ChannelSummary;
}

struct AdpcmChannel<'a> {
    encoder: AdpcmEncoder<'a>,
}

impl ChannelEncoder for AdpcmChannel<'_> {
    fn encode_block(&mut self, dest: &mut [u8], span: &BlockSpan) -> Result<()> {
        self.encoder
            .encode(dest, span.sample_offset, span.sample_count)?;
        Ok(())
    }

    fn state(&self) -> ChannelState {
        self.encoder.state()
    }

    fn summary(&self, channel: usize) -> ChannelSummary {
        let stats = self.encoder.stats();
        ChannelSummary {
            channel,
            samples: stats.samples,
            rms_error: stats.rms_error(),
            peak_error: stats.peak_error,
            final_state: self.encoder.state(),
            loop_state: self.encoder.loop_state(),
        }
    }
}

struct Pcm16Channel<'a> {
    samples: &'a [i16],
    loop_start: Option<usize>,
    loop_state: Option<ChannelState>,
    state: ChannelState,
    written: u64,
}

impl ChannelEncoder for Pcm16Channel<'_> {
    fn encode_block(&mut self, dest: &mut [u8], span: &BlockSpan) -> Result<()> {
        let end = span.sample_offset + span.sample_count;
        let mut writer = Cursor::new(dest);
        for (index, &sample) in self.samples[span.sample_offset..end].iter().enumerate() {
            if self.loop_start == Some(span.sample_offset + index) {
                self.loop_state = Some(self.state);
            }
            writer.write_i16::<BigEndian>(sample)?;
            self.state.push(sample);
        }
        self.written += span.sample_count as u64;
        Ok(())
    }

    fn state(&self) -> ChannelState {
        self.state
    }

    fn summary(&self, channel: usize) -> ChannelSummary {
        ChannelSummary {
            channel,
            samples: self.written,
            rms_error: 0.0,
            peak_error: 0,
            final_state: self.state,
            loop_state: self.loop_state,
        }
    }
}

/// Builds complete AST containers from an [`AudioStream`]
pub struct AstEncoder {
    config: AstEncoderConfig,
    progress: Option<ProgressCallback>,
}

impl AstEncoder {
    /// Create an encoder
    pub fn new(config: AstEncoderConfig) -> Self {
        AstEncoder {
            config,
            progress: None,
        }
    }

    /// Report progress once per block
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64, usize) + Send + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Assemble a container for `stream`
    pub fn encode(&self, stream: &AudioStream) -> Result<EncodedAst> {
        let channels = stream.num_channels();
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(AstError::ChannelLimitExceeded(channels as u16));
        }

        let mut encoders = self.channel_encoders(stream)?;

        let num_samples = stream.num_samples();
        let layout = BlockLayout::new(self.config.format, num_samples);
        let total_size = layout.container_size(channels);

        let header = self.build_header(stream, total_size)?;
        debug!(
            format = %self.config.format,
            channels,
            num_samples,
            blocks = layout.block_count(),
            total_size,
            "Writing AST container"
        );

        let mut data = vec![0u8; total_size];
        let mut cursor = Cursor::new(data.as_mut_slice());
        header.write_to(&mut cursor)?;
        debug_assert_eq!(cursor.position() as usize, STRM_HEADER_SIZE);

        for span in layout.blocks() {
            let block_pos = layout.block_offset(span.index, channels);
            debug_assert_eq!(cursor.position() as usize, block_pos);
            cursor.write_all(&BLCK_MAGIC)?;
            cursor.write_u32::<BigEndian>(span.byte_size as u32)?;
            let state_pos = (block_pos + BLCK_STATE_OFFSET) as u64;
            cursor.seek(SeekFrom::Current(BLCK_STATE_SIZE as i64))?;

            for encoder in encoders.iter_mut() {
                let pos = cursor.position() as usize;
                let region = &mut cursor.get_mut()[pos..pos + span.byte_size];
                encoder.encode_block(region, &span)?;
                cursor.seek(SeekFrom::Current(span.byte_size as i64))?;
            }

            let block_end = cursor.position();
            let states: Vec<ChannelState> = encoders.iter().map(|e| e.state()).collect();
            cursor.set_position(state_pos);
            write_channel_states(&mut cursor, &states)?;
            cursor.set_position(block_end);

            let done = span.sample_offset + span.sample_count;
            let percent = done as f64 / num_samples as f64 * 100.0;
            trace!(block = span.index, percent, "Converting to AST");
            if let Some(callback) = &self.progress {
                callback(percent, span.index);
            }
        }

        debug_assert_eq!(cursor.position() as usize, total_size);

        let summaries: Vec<ChannelSummary> = encoders
            .iter()
            .enumerate()
            .map(|(channel, encoder)| encoder.summary(channel))
            .collect();

        for summary in &summaries {
            info!(
                channel = summary.channel + 1,
                samples = summary.samples,
                rms_error = summary.rms_error,
                peak_error = summary.peak_error,
                last = summary.final_state.last,
                penult = summary.final_state.penult,
                "Channel info"
            );
            if let Some(state) = summary.loop_state {
                info!(
                    channel = summary.channel + 1,
                    last = state.last,
                    penult = state.penult,
                    "Loop start state"
                );
            }
        }

        Ok(EncodedAst { data, summaries })
    }

    fn channel_encoders<'a>(
        &self,
        stream: &'a AudioStream,
    ) -> Result<Vec<Box<dyn ChannelEncoder + 'a>>> {
        let region = stream.loop_region();

        stream
            .channels()
            .map(|samples| -> Result<Box<dyn ChannelEncoder + 'a>> {
                match self.config.format {
                    SampleFormat::Adpcm4 => {
                        let mut encoder = AdpcmEncoder::new(samples);
                        if let Some(LoopRegion { start, end }) = region {
                            encoder.set_loop(start as usize, end as usize, true)?;
                        }
                        Ok(Box::new(AdpcmChannel { encoder }))
                    }
                    SampleFormat::Pcm16 => Ok(Box::new(Pcm16Channel {
                        samples,
                        loop_start: region.map(|r| r.start as usize),
                        loop_state: None,
                        state: ChannelState::default(),
                        written: 0,
                    })),
                }
            })
            .collect()
    }

    fn build_header(&self, stream: &AudioStream, total_size: usize) -> Result<StrmHeader> {
        let num_samples = u32::try_from(stream.num_samples())
            .map_err(|_| AstError::TooManySamples(stream.num_samples()))?;
        let data_size = u32::try_from(total_size - STRM_HEADER_SIZE)
            .map_err(|_| AstError::TooManySamples(stream.num_samples()))?;
        let region = stream.loop_region();

        Ok(StrmHeader {
            data_size,
            format: self.config.format,
            bits_per_sample: 16,
            channels: stream.num_channels() as u16,
            looped: region.is_some(),
            sample_rate: stream.sample_rate(),
            num_samples,
            loop_start: region.map_or(0, |r| r.start),
            loop_end: region.map_or(num_samples, |r| r.end),
            block_size: BLOCK_SIZE as u32,
            volume: self.config.volume,
        })
    }
}

impl Default for AstEncoder {
    fn default() -> Self {
        Self::new(AstEncoderConfig::default())
    }
}

impl std::fmt::Debug for AstEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstEncoder")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
