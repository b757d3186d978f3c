use std::io::BufRead;

use bytes::Bytes;
use tlvwire_frame::{unpack_payload, FrameConfig, FrameReader, Payload};
use tracing::debug;

use crate::cmd::UnpackArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{self, OutputFormat};

pub fn run(args: UnpackArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let stdin = std::io::stdin().lock();
    let read = unpack_stream(stdin, &args, config, |index, payload, fields| {
        output::print_message(index, payload, fields, format);
    })?;
    debug!(frames = read, "unpack finished");
    Ok(SUCCESS)
}

/// Decode frames from `input` until a clean EOF between frames or until
/// `args.count` frames have been handled. Returns the number of frames read.
fn unpack_stream<R, F>(
    input: R,
    args: &UnpackArgs,
    config: FrameConfig,
    mut emit: F,
) -> CliResult<usize>
where
    R: BufRead,
    F: FnMut(usize, &Payload, Option<&[Bytes]>),
{
    let mut reader = FrameReader::with_config(input, config);
    let mut index = 0usize;

    while args.count.map_or(true, |count| index < count) {
        let at_eof = reader
            .get_mut()
            .fill_buf()
            .map_err(|err| io_error("failed to read input", err))?
            .is_empty();
        if at_eof {
            break;
        }

        let frame = reader
            .read_frame()
            .map_err(|err| frame_error(&format!("frame {index}"), err))?;
        let payload =
            unpack_payload(&frame).map_err(|err| frame_error(&format!("frame {index}"), err))?;

        if args.fields {
            let fields = payload
                .fields()
                .map_err(|err| frame_error(&format!("frame {index} fields"), err))?;
            emit(index, &payload, Some(&fields));
        } else {
            emit(index, &payload, None);
        }
        index += 1;
    }

    Ok(index)
}
