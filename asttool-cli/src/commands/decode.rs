//! Bare ADPCM4 stream to raw PCM.

use super::{read_input, write_output};
use anyhow::Result;
use asttool_adpcm::AdpcmDecoder;
use byteorder::{ByteOrder, LittleEndian};
use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Decode a bare ADPCM4 stream to raw little-endian 16-bit PCM.
#[derive(Args, Debug)]
pub struct CmdDecode {
    /// Input ADPCM file
    pub input: PathBuf,

    /// Output raw PCM file
    pub output: PathBuf,
}

impl CmdDecode {
    /// Execute the decode command.
    pub fn run(&self, overwrite: bool) -> Result<()> {
        let data = read_input(&self.input)?;
        info!(size = data.len(), "Read input file");

        let samples = AdpcmDecoder::new().decode_to_vec(&data)?;
        let mut pcm = vec![0u8; samples.len() * 2];
        LittleEndian::write_i16_into(&samples, &mut pcm);
        write_output(&self.output, &pcm, overwrite)?;

        println!(
            "{} {} samples -> {}",
            style("Decoded").green().bold(),
            samples.len(),
            style(self.output.display()).white()
        );
        Ok(())
    }
}
