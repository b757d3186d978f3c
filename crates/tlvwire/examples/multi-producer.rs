//! Multi-producer example: several threads share one socket through a
//! serialized writer while a reader on the other end decodes every message.
//!
//! Run with:
//!   cargo run --example multi-producer

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::sync::Arc;
    use std::thread;

    use tlvwire::frame::{pack_payload_multi, FrameReader, SerializedWriter, SharedTarget};

    const PRODUCERS: u8 = 4;
    const MESSAGES: usize = 5;

    let (tx_sock, rx_sock) = UnixStream::pair()?;
    let target: SharedTarget = Arc::new(tx_sock);
    let writer = SerializedWriter::start_default()?;

    let reader = thread::spawn(
        move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut reader = FrameReader::new(rx_sock);
            for _ in 0..usize::from(PRODUCERS) * MESSAGES {
                let payload = reader.read_payload()?;
                let fields = payload.fields()?;
                let fields: Vec<_> = fields.iter().map(|f| String::from_utf8_lossy(f)).collect();
                eprintln!("[reader] action={} fields={fields:?}", payload.action);
            }
            Ok(())
        },
    );

    let producers: Vec<_> = (1..=PRODUCERS)
        .map(|id| {
            let handle = writer.handle();
            let target = Arc::clone(&target);
            thread::spawn(move || -> tlvwire::frame::Result<()> {
                for seq in 0..MESSAGES {
                    let payload =
                        pack_payload_multi(id, [format!("producer-{id}"), format!("seq-{seq}")]);
                    // The last ticket of each producer is awaited; earlier ones
                    // are fire-and-forget.
                    let ticket = handle.submit(Some(Arc::clone(&target)), payload)?;
                    if seq + 1 == MESSAGES {
                        ticket.wait()?;
                    }
                }
                Ok(())
            })
        })
        .collect();

    for producer in producers {
        producer
            .join()
            .expect("producer thread should not panic")?;
    }

    let stats = writer.shutdown();
    eprintln!(
        "[writer] submitted={} written={} failed={}",
        stats.submitted, stats.written, stats.failed
    );

    reader
        .join()
        .expect("reader thread should not panic")
        .expect("reader should decode every message");
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("multi-producer example requires unix domain sockets");
}
