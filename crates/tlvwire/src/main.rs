mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use tlvwire_frame::{FrameConfig, MAGIC};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tlvwire", version, about = "Frame and unframe tlvwire messages")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Frame magic number (hex with 0x prefix, or decimal).
    #[arg(
        long,
        value_name = "MAGIC",
        env = "TLVWIRE_MAGIC",
        default_value_t = MAGIC,
        value_parser = parse_magic,
        global = true
    )]
    magic: u16,

    #[command(subcommand)]
    command: Command,
}

fn parse_magic(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse::<u16>(),
    };
    parsed.map_err(|err| format!("invalid magic {input:?}: {err}"))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = FrameConfig::with_magic(cli.magic);
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
