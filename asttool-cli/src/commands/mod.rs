//! CLI subcommand implementations.

pub mod ast;
pub mod convert;
pub mod decode;
pub mod encode;
pub mod info;

pub use ast::CmdAst;
pub use convert::CmdConvert;
pub use decode::CmdDecode;
pub use encode::CmdEncode;
pub use info::CmdInfo;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Loop bounds given on the command line.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopArgs {
    /// Loop start sample (overrides the WAV loop)
    #[arg(long, requires = "loop_end")]
    pub loop_start: Option<u32>,

    /// Loop end sample, exclusive (overrides the WAV loop)
    #[arg(long, requires = "loop_start")]
    pub loop_end: Option<u32>,
}

impl LoopArgs {
    /// Command-line bounds if given, else the ones found in the input file.
    pub fn resolve(&self, from_file: Option<(u32, u32)>) -> Option<(u32, u32)> {
        match (self.loop_start, self.loop_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => from_file,
        }
    }
}

/// Read a whole input file.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }
    std::fs::read(path).with_context(|| format!("Could not open input file {}", path.display()))
}

/// Write `bytes` to `path`, refusing to replace an existing file unless `overwrite`.
pub fn write_output(path: &Path, bytes: &[u8], overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "Output file already exists: {} (use -y to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("Could not write output file {}", path.display()))
}

/// Percentage bar fed by the encoder's per-block callback.
pub fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% | {msg}",
        )?
        .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Format bytes as human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration in seconds as human-readable string.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    if total_seconds >= 60 {
        format!("{}m{:.2}s", total_seconds / 60, seconds - (total_seconds / 60 * 60) as f64)
    } else {
        format!("{:.2}s", seconds)
    }
}
