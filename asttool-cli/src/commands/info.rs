//! AST file inspection command.

use super::{format_duration, format_size, read_input};
use anyhow::Result;
use asttool_container::{read_blocks, AstDecoder, BlockLayout, StrmHeader};
use clap::Args;
use console::style;
use serde::Serialize;
use std::path::PathBuf;

/// One BLCK header as listed by `info`.
#[derive(Debug, Clone, Serialize)]
pub struct BlockEntry {
    /// Byte offset of the block header.
    pub offset: usize,
    /// Per-channel payload bytes.
    pub size: u32,
    /// Trailing (last, penult) state per channel.
    pub states: Vec<(i16, i16)>,
}

/// AST file information.
#[derive(Debug, Clone, Serialize)]
pub struct AstInfo {
    /// File path.
    pub file: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Parsed STRM header.
    pub header: StrmHeader,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Container size the header's sample count calls for.
    pub expected_size_bytes: usize,
    /// Block headers, in file order.
    pub blocks: Vec<BlockEntry>,
    /// Why the block walk stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_error: Option<String>,
}

/// Inspect an AST file.
#[derive(Args, Debug)]
pub struct CmdInfo {
    /// Path to the AST file.
    pub file: PathBuf,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,

    /// List every block header.
    #[arg(long)]
    pub blocks: bool,
}

impl CmdInfo {
    /// Execute the info command.
    pub fn run(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let info = self.analyze(&data)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            self.print_info(&info);
        }
        Ok(())
    }

    fn analyze(&self, data: &[u8]) -> Result<AstInfo> {
        let header = AstDecoder::read_header(data)?;
        let expected_size_bytes = BlockLayout::new(header.format, header.num_samples as usize)
            .container_size(header.channels as usize);

        let (blocks, block_error) = match read_blocks(data, &header) {
            Ok(blocks) => (blocks, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        let blocks = blocks
            .into_iter()
            .map(|b| BlockEntry {
                offset: b.offset,
                size: b.size,
                states: b.states.iter().map(|s| (s.last, s.penult)).collect(),
            })
            .collect();

        Ok(AstInfo {
            file: self.file.display().to_string(),
            size_bytes: data.len() as u64,
            duration_seconds: header.duration(),
            header,
            expected_size_bytes,
            blocks,
            block_error,
        })
    }

    fn print_info(&self, info: &AstInfo) {
        let header = &info.header;

        println!();
        println!("{}", style("AST Information").cyan().bold());
        println!();
        println!("  {:<16} {}", style("File:").white(), info.file);
        println!("  {:<16} {}", style("Size:").white(), format_size(info.size_bytes));
        println!("  {:<16} {}", style("Format:").white(), header.format);
        println!("  {:<16} {}", style("Channels:").white(), header.channels);
        println!("  {:<16} {} Hz", style("Sample Rate:").white(), header.sample_rate);
        println!("  {:<16} {}", style("Samples:").white(), header.num_samples);
        println!(
            "  {:<16} {}",
            style("Duration:").white(),
            format_duration(info.duration_seconds)
        );
        if header.looped {
            println!(
                "  {:<16} {}..{}",
                style("Loop:").white(),
                header.loop_start,
                header.loop_end
            );
        } else {
            println!("  {:<16} no", style("Loop:").white());
        }
        println!("  {:<16} {}", style("Volume:").white(), header.volume);
        println!("  {:<16} {:#x}", style("Block Size:").white(), header.block_size);

        if info.expected_size_bytes as u64 != info.size_bytes {
            println!(
                "  {} expected {} bytes for {} samples",
                style("Warning:").yellow().bold(),
                info.expected_size_bytes,
                header.num_samples
            );
        }

        println!();
        println!("  {:<16} {}", style("Blocks:").cyan().bold(), info.blocks.len());
        if let Some(err) = &info.block_error {
            println!("  {} {}", style("Error:").red().bold(), err);
        }
        if self.blocks {
            for (i, block) in info.blocks.iter().enumerate() {
                let states: Vec<String> = block
                    .states
                    .iter()
                    .map(|(last, penult)| format!("{}/{}", last, penult))
                    .collect();
                println!(
                    "    {:>4} @ {:#08x}  {:>5} bytes  {}",
                    style(i).dim(),
                    block.offset,
                    block.size,
                    states.join(" ")
                );
            }
        }
        println!();
    }
}
