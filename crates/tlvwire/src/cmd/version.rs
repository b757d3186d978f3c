use tlvwire_frame::{FrameConfig, HEADER_SIZE, MAX_PAYLOAD};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("tlvwire {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    let defaults = FrameConfig::default();
    println!(
        "target: {}",
        option_env!("TLVWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("os/arch: {}/{}", std::env::consts::OS, std::env::consts::ARCH);
    println!("features: async={}", cfg!(feature = "async"));
    println!(
        "wire: magic=0x{:04x} header={}B max_payload={}B queue_capacity={}",
        defaults.magic, HEADER_SIZE, MAX_PAYLOAD, defaults.queue_capacity
    );

    Ok(SUCCESS)
}
