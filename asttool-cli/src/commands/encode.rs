//! WAV to bare ADPCM4 stream.

use super::{format_size, read_input, write_output, LoopArgs};
use crate::wav::WavFile;
use anyhow::{Context, Result};
use asttool_adpcm::AdpcmEncoder;
use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Encode one channel of a 16-bit PCM WAV file to a bare ADPCM4 stream.
///
/// A loop truncates the stream at the loop end; the player loops externally
/// and needs the predictor state printed for the loop start.
#[derive(Args, Debug)]
pub struct CmdEncode {
    /// Input WAV file
    pub input: PathBuf,

    /// Output ADPCM file
    pub output: PathBuf,

    #[command(flatten)]
    pub loops: LoopArgs,

    /// Channel of the WAV file to encode
    #[arg(long, default_value_t = 0)]
    pub channel: usize,
}

impl CmdEncode {
    /// Execute the encode command.
    pub fn run(&self, overwrite: bool) -> Result<()> {
        let data = read_input(&self.input)?;
        info!(size = data.len(), "Read input file");

        let wav = WavFile::parse(&data)
            .with_context(|| format!("Could not parse {}", self.input.display()))?;
        let samples = wav.channels.get(self.channel).with_context(|| {
            format!(
                "Channel {} requested but the WAV file has {}",
                self.channel,
                wav.channels.len()
            )
        })?;

        let mut encoder = AdpcmEncoder::new(samples);
        if let Some((start, end)) = self.loops.resolve(wav.loop_points) {
            encoder.set_loop(start as usize, end as usize, false)?;
        }

        let encoded = encoder.encode_all()?;
        write_output(&self.output, &encoded, overwrite)?;

        let stats = encoder.stats();
        println!(
            "{} {} samples -> {} ({})",
            style("Encoded").green().bold(),
            stats.samples,
            style(self.output.display()).white(),
            format_size(encoded.len() as u64)
        );
        println!(
            "  RMS error: {:.2}, peak error: {}",
            stats.rms_error(),
            stats.peak_error
        );
        if let Some(state) = encoder.loop_state() {
            println!(
                "  Loop start state: last {}, penult {}",
                style(state.last).yellow(),
                style(state.penult).yellow()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::build_wav;
    use asttool_adpcm::encoded_size;

    #[test]
    fn test_encode_truncates_at_loop_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.adpcm");
        let samples: Vec<i16> = (0..200).map(|i| (i * 40) as i16).collect();
        std::fs::write(&input, build_wav(32000, &[samples], Some((16, 99)))).unwrap();

        let cmd = CmdEncode {
            input,
            output: output.clone(),
            loops: LoopArgs::default(),
            channel: 0,
        };
        cmd.run(false).unwrap();

        assert_eq!(std::fs::read(&output).unwrap().len(), encoded_size(100));
    }

    #[test]
    fn test_encode_rejects_missing_channel() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        std::fs::write(&input, build_wav(32000, &[vec![0; 32]], None)).unwrap();

        let cmd = CmdEncode {
            input,
            output: dir.path().join("out.adpcm"),
            loops: LoopArgs::default(),
            channel: 1,
        };
        assert!(cmd.run(false).is_err());
    }
}
