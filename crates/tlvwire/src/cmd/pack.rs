use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tlvwire_frame::{pack_payload, try_pack_fields, FrameConfig, SerializedWriter, SharedTarget};
use tracing::debug;

use crate::cmd::PackArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output;

pub fn run(args: PackArgs, config: FrameConfig) -> CliResult<i32> {
    let payload = build_payload(&args)?;

    if args.hex {
        let wire = frame_into(Arc::new(Mutex::new(Vec::new())), payload, config)?;
        println!("{}", output::hex(&wire));
    } else {
        frame_into(Arc::new(Mutex::new(std::io::stdout())), payload, config)?;
    }

    Ok(SUCCESS)
}

fn build_payload(args: &PackArgs) -> CliResult<Bytes> {
    if !args.field.is_empty() {
        let block = try_pack_fields(&args.field)
            .map_err(|err| frame_error("field encode failed", err))?;
        return Ok(pack_payload(args.action, &block));
    }

    let content = if let Some(data) = &args.data {
        data.as_bytes().to_vec()
    } else if let Some(path) = &args.file {
        std::fs::read(path)
            .map_err(|err| io_error(&format!("failed to read {}", path.display()), err))?
    } else {
        Vec::new()
    };
    Ok(pack_payload(args.action, &content))
}

/// Frame `payload` onto `sink` through a serialized writer and hand the sink
/// back once the write has landed.
fn frame_into<W>(sink: Arc<Mutex<W>>, payload: Bytes, config: FrameConfig) -> CliResult<W>
where
    W: Write + Send + 'static,
{
    let writer =
        SerializedWriter::start(config).map_err(|err| frame_error("writer start failed", err))?;

    let target: SharedTarget = sink.clone();
    let outcome = writer
        .submit(Some(target), payload)
        .and_then(|ticket| ticket.wait());
    let stats = writer.shutdown();
    debug!(?stats, "pack finished");
    outcome.map_err(|err| frame_error("frame write failed", err))?;

    let sink = Arc::try_unwrap(sink)
        .map_err(|_| CliError::new(INTERNAL, "frame sink still shared after shutdown"))?;
    Ok(sink.into_inner().unwrap_or_else(PoisonError::into_inner))
}
