//! asttool - AST audio container and ADPCM4 conversion tool.

mod commands;
mod wav;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::{ast::PayloadFormat, CmdAst, CmdConvert, CmdDecode, CmdEncode, CmdInfo, LoopArgs};
use console::style;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line arguments for asttool.
#[derive(Parser, Debug)]
#[command(name = "asttool")]
#[command(version)]
#[command(about = "Build, inspect and convert AST streaming audio containers")]
#[command(long_about = "asttool converts 16-bit PCM audio to 4-bit ADPCM and AST containers.\n\n\
    Passing a single file picks the action from its extension:\n    \
    song.wav             -> song.ast\n    \
    song.adpcm, song.adp -> song.raw\n    \
    song.ast             -> song.ADPCM.ast\n\n\
    EXAMPLES:\n    \
    asttool ast in.wav out.ast --loop-start 1000 --loop-end 64000\n    \
    asttool encode in.wav out.adpcm\n    \
    asttool info out.ast --json")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// File to convert by extension (drag-and-drop mode)
    input: Option<PathBuf>,

    /// Overwrite output file if it exists
    #[arg(short = 'y', long, global = true)]
    overwrite: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a WAV channel to a bare ADPCM4 stream
    Encode(CmdEncode),
    /// Decode a bare ADPCM4 stream to raw 16-bit PCM
    Decode(CmdDecode),
    /// Build an AST container from a WAV file
    Ast(CmdAst),
    /// Convert a PCM16 AST container to ADPCM4
    Convert(CmdConvert),
    /// Show AST header and block information
    Info(CmdInfo),
}

/// Subcommand implied by an input file's extension, with its output path.
fn infer_command(input: &Path) -> Option<Command> {
    let ext = input.extension()?.to_str()?.to_ascii_lowercase();
    let command = match ext.as_str() {
        "wav" => Command::Ast(CmdAst {
            input: input.to_path_buf(),
            output: input.with_extension("ast"),
            loops: LoopArgs::default(),
            format: PayloadFormat::Adpcm4,
            no_progress: false,
        }),
        "adpcm" | "adp" => Command::Decode(CmdDecode {
            input: input.to_path_buf(),
            output: input.with_extension("raw"),
        }),
        "ast" => Command::Convert(CmdConvert {
            input: input.to_path_buf(),
            output: input.with_extension("ADPCM.ast"),
        }),
        _ => return None,
    };
    Some(command)
}

fn run(command: Command, overwrite: bool) -> Result<()> {
    match command {
        Command::Encode(cmd) => cmd.run(overwrite),
        Command::Decode(cmd) => cmd.run(overwrite),
        Command::Ast(cmd) => cmd.run(overwrite),
        Command::Convert(cmd) => cmd.run(overwrite),
        Command::Info(cmd) => cmd.run(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json = matches!(&cli.command, Some(Command::Info(cmd)) if cmd.json);

    // Initialize logging (not in JSON mode)
    if !json {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(if cli.verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })
            .with_target(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    let command = match (cli.command, cli.input) {
        (Some(command), _) => command,
        (None, Some(input)) => match infer_command(&input) {
            Some(command) => {
                debug!(input = %input.display(), ?command, "Drag-and-drop mode");
                command
            }
            None => bail!(
                "Cannot infer an action for {} (expected .wav, .adpcm, .adp or .ast)",
                input.display()
            ),
        },
        (None, None) => bail!("No input given; run with --help for usage"),
    };

    if let Err(e) = run(command, cli.overwrite) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    if !json {
        println!("{}", style("Done!").green().bold());
    }
    Ok(())
}
