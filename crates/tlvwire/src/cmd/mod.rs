use clap::{Args, Subcommand};
use std::path::PathBuf;
use tlvwire_frame::FrameConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod pack;
pub mod unpack;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame one message and write it to stdout.
    Pack(PackArgs),
    /// Read frames from stdin and print each message.
    Unpack(UnpackArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Pack(args) => pack::run(args, config),
        Command::Unpack(args) => unpack::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Action byte (0-255).
    #[arg(long, short = 'a')]
    pub action: u8,
    /// Sub-field value; repeat to build a multi-field payload.
    #[arg(long, short = 'f', conflicts_with_all = ["data", "file"])]
    pub field: Vec<String>,
    /// Raw string content.
    #[arg(long, conflicts_with_all = ["field", "file"])]
    pub data: Option<String>,
    /// Read raw content from file.
    #[arg(long, conflicts_with_all = ["field", "data"])]
    pub file: Option<PathBuf>,
    /// Print the frame as hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Split each message's content into sub-fields.
    #[arg(long)]
    pub fields: bool,
    /// Exit after reading N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
