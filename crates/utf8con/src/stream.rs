//! The byte-oriented standard streams and the sinks behind them.
//!
//! Each [`Streams`] registry holds one slot per [`StdStream`]. A slot holds
//! either a plain byte writer or a [`Decoder`] feeding the wide console; the
//! variant tag is what tells a [`Utf8Console`](crate::Utf8Console) that a
//! stream is already redirected.

use std::{
    fmt,
    io::{self, Write},
    sync::{LazyLock, Mutex, MutexGuard, PoisonError, TryLockError},
};

use tracing::{debug, warn};

use crate::{Decoder, WideChar, WideConsole, WideSink};

/// A byte writer standing behind a standard stream.
pub type ByteWriter = Box<dyn Write + Send>;

/// A wide console sink that can sit behind a standard stream.
pub type WideConsoleSink = Box<dyn WideSink<Unit = WideChar> + Send>;

type WideFactory = Box<dyn Fn(StdStream) -> WideConsoleSink + Send + Sync>;

/// One of the process's standard output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    /// Standard output.
    Output,
    /// Standard error.
    Error,
}

impl StdStream {
    /// Both streams, in slot order.
    pub const ALL: [StdStream; 2] = [StdStream::Output, StdStream::Error];

    pub(crate) const fn index(self) -> usize {
        match self {
            StdStream::Output => 0,
            StdStream::Error => 1,
        }
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StdStream::Output => "stdout",
            StdStream::Error => "stderr",
        })
    }
}

enum Sink {
    Bytes(ByteWriter),
    Transcoding(Decoder<WideConsoleSink>),
}

impl Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match (self, buf) {
            (Sink::Bytes(writer), _) => writer.write(buf),
            (Sink::Transcoding(decoder), [byte]) => decoder.process_byte(*byte).map(|()| 1),
            (Sink::Transcoding(decoder), _) => decoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Bytes(writer) => writer.flush(),
            Sink::Transcoding(decoder) => decoder.sync(),
        }
    }
}

/// A registry of standard stream sinks.
///
/// [`Streams::global()`] is the one behind [`stdout()`] and [`stderr()`];
/// [`Streams::new`] builds an independent one around arbitrary writers.
pub struct Streams {
    slots: [Mutex<Sink>; 2],
    wide: WideFactory,
}

static GLOBAL: LazyLock<Streams> = LazyLock::new(|| {
    Streams::new(
        Box::new(io::stdout()),
        Box::new(io::stderr()),
        |stream| -> WideConsoleSink { Box::new(WideConsole::new(stream)) },
    )
});

impl Streams {
    /// A registry whose streams start out writing bytes to `output` and
    /// `error`. `wide` builds the wide console sink for a stream when it gets
    /// redirected.
    pub fn new(
        output: ByteWriter,
        error: ByteWriter,
        wide: impl Fn(StdStream) -> WideConsoleSink + Send + Sync + 'static,
    ) -> Self {
        Self {
            slots: [
                Mutex::new(Sink::Bytes(output)),
                Mutex::new(Sink::Bytes(error)),
            ],
            wide: Box::new(wide),
        }
    }

    /// The process's standard streams.
    pub fn global() -> &'static Streams {
        &GLOBAL
    }

    /// A writer for `stream`.
    #[must_use]
    pub fn handle(&self, stream: StdStream) -> StreamHandle<'_> {
        StreamHandle {
            streams: self,
            stream,
        }
    }

    /// Whether `stream` currently goes through a UTF-8 decoder.
    #[must_use]
    pub fn is_transcoding(&self, stream: StdStream) -> bool {
        matches!(*self.lock(stream), Sink::Transcoding(_))
    }

    fn lock(&self, stream: StdStream) -> MutexGuard<'_, Sink> {
        self.slots[stream.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Put a decoder in front of `stream`, returning the byte writer it
    /// replaced. Returns `None` if the stream is already transcoding.
    pub(crate) fn install(&self, stream: StdStream) -> Option<ByteWriter> {
        let mut slot = self.lock(stream);
        let Sink::Bytes(writer) = &mut *slot else {
            debug!(%stream, "stream already transcoding; leaving it alone");
            return None;
        };
        if let Err(error) = writer.flush() {
            warn!(%stream, %error, "failed to flush stream before redirecting it");
        }
        let decoder = Decoder::new((self.wide)(stream));
        let Sink::Bytes(previous) = core::mem::replace(&mut *slot, Sink::Transcoding(decoder))
        else {
            unreachable!("slot was checked to hold a byte writer");
        };
        debug!(%stream, "redirected stream through UTF-8 decoder");
        Some(previous)
    }

    /// Put `previous` back behind `stream`, flushing and dropping whatever
    /// sink was installed.
    pub(crate) fn restore(&self, stream: StdStream, previous: ByteWriter) {
        let mut slot = self.lock(stream);
        if let Err(error) = slot.flush() {
            warn!(%stream, %error, "failed to flush stream before restoring it");
        }
        *slot = Sink::Bytes(previous);
        debug!(%stream, "restored previous stream sink");
    }
}

/// A slot that is locked right now, possibly by the formatting thread's own
/// [`StreamLock`], shows as `None`.
impl fmt::Debug for Streams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transcoding = |stream: StdStream| {
            let slot = match self.slots[stream.index()].try_lock() {
                Ok(slot) => slot,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return None,
            };
            Some(matches!(*slot, Sink::Transcoding(_)))
        };
        f.debug_struct("Streams")
            .field("output_transcoding", &transcoding(StdStream::Output))
            .field("error_transcoding", &transcoding(StdStream::Error))
            .finish_non_exhaustive()
    }
}

/// A writer for one standard stream of a [`Streams`] registry.
///
/// Every write goes to whatever sink is installed at that moment. Concurrent
/// writers can interleave the bytes of a multi-byte sequence; hold a
/// [`StreamLock`] across writes that must stay together.
#[derive(Debug, Clone, Copy)]
pub struct StreamHandle<'a> {
    streams: &'a Streams,
    stream: StdStream,
}

impl<'a> StreamHandle<'a> {
    /// Which stream this handle writes to.
    #[must_use]
    pub fn stream(&self) -> StdStream {
        self.stream
    }

    /// Lock the stream for a sequence of writes.
    ///
    /// The sink cannot be swapped while the lock is held, so a guard created
    /// or dropped on the same thread meanwhile will deadlock.
    #[must_use]
    pub fn lock(&self) -> StreamLock<'a> {
        StreamLock {
            slot: self.streams.lock(self.stream),
        }
    }
}

impl Write for StreamHandle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.streams.lock(self.stream).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.streams.lock(self.stream).flush()
    }
}

/// Exclusive access to a standard stream. See [`StreamHandle::lock`].
pub struct StreamLock<'a> {
    slot: MutexGuard<'a, Sink>,
}

impl Write for StreamLock<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.slot.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.slot.flush()
    }
}

impl fmt::Debug for StreamLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLock")
            .field("transcoding", &matches!(*self.slot, Sink::Transcoding(_)))
            .finish()
    }
}

/// A handle to the process's standard output.
#[must_use]
pub fn stdout() -> StreamHandle<'static> {
    Streams::global().handle(StdStream::Output)
}

/// A handle to the process's standard error.
#[must_use]
pub fn stderr() -> StreamHandle<'static> {
    Streams::global().handle(StdStream::Error)
}
