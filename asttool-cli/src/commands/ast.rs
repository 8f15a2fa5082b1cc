//! WAV to AST container.

use super::{format_duration, format_size, progress_bar, read_input, write_output, LoopArgs};
use crate::wav::WavFile;
use anyhow::{Context, Result};
use asttool_container::{AstEncoder, AstEncoderConfig, AudioStream};
use clap::{Args, ValueEnum};
use console::style;
use std::path::PathBuf;

/// Block payload written by the `ast` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PayloadFormat {
    /// 4-bit ADPCM
    #[default]
    Adpcm4,
    /// Uncompressed big-endian PCM16
    Pcm16,
}

impl From<PayloadFormat> for AstEncoderConfig {
    fn from(format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Adpcm4 => AstEncoderConfig::default(),
            PayloadFormat::Pcm16 => AstEncoderConfig::pcm16(),
        }
    }
}

/// Build an AST container from a 16-bit PCM WAV file.
#[derive(Args, Debug)]
pub struct CmdAst {
    /// Input WAV file
    pub input: PathBuf,

    /// Output AST file
    pub output: PathBuf,

    #[command(flatten)]
    pub loops: LoopArgs,

    /// Block payload format
    #[arg(long, value_enum, default_value_t = PayloadFormat::Adpcm4)]
    pub format: PayloadFormat,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl CmdAst {
    /// Execute the ast command.
    pub fn run(&self, overwrite: bool) -> Result<()> {
        let data = read_input(&self.input)?;
        let wav = WavFile::parse(&data)
            .with_context(|| format!("Could not parse {}", self.input.display()))?;

        let mut stream = AudioStream::new(wav.sample_rate, wav.channels)
            .context("An AST file holds 1 to 6 channels of equal length")?;
        if let Some((start, end)) = self.loops.resolve(wav.loop_points) {
            stream = stream.with_loop(start, end)?;
        }

        println!(
            "{} {} channel(s), {} Hz, {} samples ({}){}",
            style("Input:").cyan().bold(),
            stream.num_channels(),
            stream.sample_rate(),
            stream.num_samples(),
            format_duration(stream.duration()),
            stream
                .loop_region()
                .map(|r| format!(", loop {}..{}", r.start, r.end))
                .unwrap_or_default()
        );

        let mut encoder = AstEncoder::new(self.format.into());
        let pb = if self.no_progress {
            None
        } else {
            Some(progress_bar()?)
        };
        if let Some(pb) = &pb {
            let pb = pb.clone();
            encoder = encoder.with_progress(move |percent, block| {
                pb.set_position(percent as u64);
                pb.set_message(format!("block {}", block + 1));
            });
        }

        let encoded = encoder.encode(&stream)?;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        write_output(&self.output, &encoded.data, overwrite)?;

        for summary in &encoded.summaries {
            println!(
                "  Channel {}: RMS error {:.2}, peak {}, last {}, penult {}",
                summary.channel + 1,
                summary.rms_error,
                summary.peak_error,
                summary.final_state.last,
                summary.final_state.penult
            );
        }
        println!(
            "{} {} ({})",
            style("Output saved to:").white(),
            style(self.output.display()).green().bold(),
            format_size(encoded.data.len() as u64)
        );
        Ok(())
    }
}
