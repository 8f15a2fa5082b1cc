//! PCM16 AST to ADPCM4 AST.

use super::{format_size, read_input, write_output};
use anyhow::{Context, Result};
use asttool_container::AstTranscoder;
use clap::Args;
use console::style;
use std::path::PathBuf;

/// Re-encode an uncompressed (PCM16) AST file as ADPCM4, keeping its loop.
#[derive(Args, Debug)]
pub struct CmdConvert {
    /// Input PCM16 AST file
    pub input: PathBuf,

    /// Output ADPCM4 AST file
    pub output: PathBuf,
}

impl CmdConvert {
    /// Execute the convert command.
    pub fn run(&self, overwrite: bool) -> Result<()> {
        let data = read_input(&self.input)?;
        let encoded = AstTranscoder::default()
            .convert_with_summary(&data)
            .with_context(|| format!("Could not convert {}", self.input.display()))?;

        write_output(&self.output, &encoded.data, overwrite)?;

        println!(
            "{} {} ({} -> {})",
            style("Converted").green().bold(),
            style(self.output.display()).white(),
            format_size(data.len() as u64),
            format_size(encoded.data.len() as u64)
        );
        Ok(())
    }
}
