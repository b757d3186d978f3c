//! Serialized frame writer: many producers, one worker, no interleaving.
//!
//! ```text
//! Producer 1 ─┐
//! Producer 2 ─┼─► bounded queue ─► worker thread ─► target A / target B / ...
//! Producer N ─┘
//! ```
//!
//! The single worker processes pending writes strictly in FIFO order, so
//! frames for the same target arrive in submission order and never
//! interleave at the byte level. Writes to different targets are serialized
//! too.

use std::io::Write;
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::codec::{encode_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::writer::write_wire;

const WORKER_THREAD_NAME: &str = "tlvwire-frame-writer";

/// A destination the worker can push complete frames into.
///
/// Implementations must write the whole buffer or fail; the worker never
/// splits a frame across calls.
pub trait FrameTarget: Send + Sync {
    fn write_wire(&self, wire: &[u8]) -> Result<()>;
}

impl<W: Write + Send> FrameTarget for Mutex<W> {
    fn write_wire(&self, wire: &[u8]) -> Result<()> {
        let mut inner = self.lock().map_err(|_| {
            FrameError::Io(std::io::Error::other("frame target lock poisoned"))
        })?;
        write_wire(&mut *inner, wire)
    }
}

impl FrameTarget for TcpStream {
    fn write_wire(&self, wire: &[u8]) -> Result<()> {
        let mut stream = self;
        write_wire(&mut stream, wire)
    }
}

#[cfg(unix)]
impl FrameTarget for UnixStream {
    fn write_wire(&self, wire: &[u8]) -> Result<()> {
        let mut stream = self;
        write_wire(&mut stream, wire)
    }
}

/// Shared handle to a frame target.
pub type SharedTarget = Arc<dyn FrameTarget>;

struct PendingWrite {
    target: SharedTarget,
    payload: Bytes,
    outcome: SyncSender<Result<()>>,
}

enum Command {
    Write(PendingWrite),
    Shutdown,
}

#[derive(Default)]
struct Shared {
    /// Held shared across the closed check and the enqueue in `submit`, and
    /// exclusively while `close` flips `closed`, so no write can land behind
    /// `Command::Shutdown`.
    admission: RwLock<()>,
    closed: AtomicBool,
    submitted: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// Counters describing the writer's lifetime so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Pending writes accepted into the queue.
    pub submitted: u64,
    /// Frames fully written to their target.
    pub written: u64,
    /// Frames whose write failed or came up short.
    pub failed: u64,
}

impl Shared {
    fn stats(&self) -> WriterStats {
        WriterStats {
            submitted: self.submitted.load(Ordering::Acquire),
            written: self.written.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}

/// Outcome of one submission.
///
/// Dropping the ticket is the fire-and-forget path; the write still happens
/// and failures are still logged.
#[must_use = "drop the ticket explicitly to ignore the write outcome"]
#[derive(Debug)]
pub struct WriteTicket {
    rx: Option<Receiver<Result<()>>>,
}

impl WriteTicket {
    fn resolved() -> Self {
        Self { rx: None }
    }

    fn pending(rx: Receiver<Result<()>>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Block until the worker has attempted the write.
    ///
    /// Returns `Err(FrameError::WriterClosed)` if the writer shut down before
    /// reaching this submission.
    pub fn wait(self) -> Result<()> {
        match self.rx {
            None => Ok(()),
            Some(rx) => rx.recv().unwrap_or(Err(FrameError::WriterClosed)),
        }
    }

    /// Return the outcome if it is already known, or the ticket back if not.
    pub fn try_wait(self) -> std::result::Result<Result<()>, WriteTicket> {
        let Some(rx) = &self.rx else {
            return Ok(Ok(()));
        };
        match rx.try_recv() {
            Ok(outcome) => Ok(outcome),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(Err(FrameError::WriterClosed)),
        }
    }
}

/// Cloneable submission handle for a [`SerializedWriter`].
#[derive(Clone)]
pub struct SubmitHandle {
    tx: SyncSender<Command>,
    shared: Arc<Shared>,
    max_payload: usize,
}

impl SubmitHandle {
    /// Queue `payload` to be framed and written to `target`.
    ///
    /// Oversized payloads are rejected without touching the queue. A `None`
    /// target is accepted and ignored: nothing is queued and the ticket is
    /// already resolved. Blocks while the queue is full.
    ///
    /// Success means the write was queued, not delivered; use the returned
    /// ticket to observe delivery.
    pub fn submit(
        &self,
        target: Option<SharedTarget>,
        payload: impl Into<Bytes>,
    ) -> Result<WriteTicket> {
        let payload = payload.into();
        if payload.len() > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }

        let Some(target) = target else {
            return Ok(WriteTicket::resolved());
        };

        let _admitted = self
            .shared
            .admission
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(FrameError::WriterClosed);
        }

        let (outcome, rx) = mpsc::sync_channel(1);
        self.shared.submitted.fetch_add(1, Ordering::AcqRel);
        let pending = PendingWrite {
            target,
            payload,
            outcome,
        };
        if self.tx.send(Command::Write(pending)).is_err() {
            self.shared.submitted.fetch_sub(1, Ordering::AcqRel);
            return Err(FrameError::WriterClosed);
        }
        Ok(WriteTicket::pending(rx))
    }

    /// Whether the owning writer has begun shutting down.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Current counters.
    pub fn stats(&self) -> WriterStats {
        self.shared.stats()
    }
}

/// Owns the pending-write queue and its single worker thread.
///
/// Dropping the writer drains the queue like [`SerializedWriter::shutdown`].
pub struct SerializedWriter {
    handle: SubmitHandle,
    worker: Option<JoinHandle<()>>,
}

impl SerializedWriter {
    /// Start a writer with default configuration.
    pub fn start_default() -> Result<Self> {
        Self::start(FrameConfig::default())
    }

    /// Spawn the worker and return the running writer.
    pub fn start(config: FrameConfig) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel(config.queue_capacity.max(1));
        let shared = Arc::new(Shared::default());

        let worker = {
            let shared = Arc::clone(&shared);
            let magic = config.magic;
            thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn(move || run_worker(rx, magic, shared))?
        };

        debug!(
            magic = config.magic,
            queue_capacity = config.queue_capacity,
            "frame writer started"
        );

        Ok(Self {
            handle: SubmitHandle {
                tx,
                shared,
                max_payload: config.effective_max_payload(),
            },
            worker: Some(worker),
        })
    }

    /// A cloneable handle producers can submit through.
    pub fn handle(&self) -> SubmitHandle {
        self.handle.clone()
    }

    /// See [`SubmitHandle::submit`].
    pub fn submit(
        &self,
        target: Option<SharedTarget>,
        payload: impl Into<Bytes>,
    ) -> Result<WriteTicket> {
        self.handle.submit(target, payload)
    }

    /// Current counters.
    pub fn stats(&self) -> WriterStats {
        self.handle.stats()
    }

    /// Stop accepting submissions, write everything already queued, and join
    /// the worker.
    pub fn shutdown(mut self) -> WriterStats {
        self.close();
        self.handle.stats()
    }

    fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            // Waits out submitters mid-enqueue; the worker keeps draining, so a
            // submitter blocked on a full queue still gets through.
            let _closing = self
                .handle
                .shared
                .admission
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.handle.shared.closed.store(true, Ordering::Release);
        }
        // Queued behind every accepted write, so the worker drains first.
        let _ = self.handle.tx.send(Command::Shutdown);
        if worker.join().is_err() {
            warn!("frame writer worker panicked");
        }
        debug!(stats = ?self.handle.stats(), "frame writer stopped");
    }
}

impl Drop for SerializedWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(rx: Receiver<Command>, magic: u16, shared: Arc<Shared>) {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + 1024);

    while let Ok(command) = rx.recv() {
        let pending = match command {
            Command::Write(pending) => pending,
            Command::Shutdown => break,
        };

        buf.clear();
        let result = encode_frame(magic, &pending.payload, &mut buf)
            .and_then(|()| pending.target.write_wire(&buf));

        match &result {
            Ok(()) => {
                shared.written.fetch_add(1, Ordering::AcqRel);
            }
            Err(err) => {
                shared.failed.fetch_add(1, Ordering::AcqRel);
                warn!(error = %err, size = pending.payload.len(), "frame write failed");
            }
        }

        // The submitter may have dropped its ticket.
        let _ = pending.outcome.send(result);
    }
}
