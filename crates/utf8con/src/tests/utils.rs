use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use crate::{
    ConsoleMode, ConsoleOptions, Decoder, StdStream, Streams, WideChar, WideConsoleSink, WideSink,
    WideUnit,
};

/// Decode `chunks` in order, one `process_bytes` call each.
pub(crate) fn decode_chunks<U: WideUnit>(chunks: &[&[u8]]) -> Vec<U> {
    let mut decoder = Decoder::new(Vec::<U>::new());
    for chunk in chunks {
        assert_eq!(decoder.process_bytes(chunk).unwrap(), chunk.len());
    }
    decoder.into_sink()
}

pub(crate) fn decode<U: WideUnit>(bytes: &[u8]) -> Vec<U> {
    decode_chunks(&[bytes])
}

/// Split `bytes` using `splits` as a source of chunk sizes.
pub(crate) fn split_by<'a>(bytes: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    for s in splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(1 + s % rest.len());
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

pub(crate) fn quickcheck_tests() -> u64 {
    if cfg!(miri) {
        10
    } else if cfg!(feature = "test-fast") {
        100
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// A sink that accepts `budget` units, then fails with `BrokenPipe`.
#[derive(Debug)]
pub(crate) struct FailAfter<U> {
    pub(crate) budget: usize,
    pub(crate) units: Vec<U>,
}

impl<U> FailAfter<U> {
    pub(crate) fn new(budget: usize) -> Self {
        Self {
            budget,
            units: Vec::new(),
        }
    }
}

impl<U: WideUnit> WideSink for FailAfter<U> {
    type Unit = U;

    fn put(&mut self, unit: U) -> io::Result<()> {
        if self.units.len() == self.budget {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.units.push(unit);
        Ok(())
    }
}

/// A sink that rejects the unit at position `fail_at` once with
/// `Interrupted`, then accepts everything.
#[derive(Debug)]
pub(crate) struct InterruptedOnce<U> {
    pub(crate) fail_at: Option<usize>,
    pub(crate) units: Vec<U>,
}

impl<U> InterruptedOnce<U> {
    pub(crate) fn new(fail_at: usize) -> Self {
        Self {
            fail_at: Some(fail_at),
            units: Vec::new(),
        }
    }
}

impl<U: WideUnit> WideSink for InterruptedOnce<U> {
    type Unit = U;

    fn put(&mut self, unit: U) -> io::Result<()> {
        if self.fail_at == Some(self.units.len()) {
            self.fail_at = None;
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.units.push(unit);
        Ok(())
    }
}

/// A byte writer whose contents stay observable after it is boxed.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBytes {
    pub(crate) bytes: Arc<Mutex<Vec<u8>>>,
    pub(crate) flushes: Arc<Mutex<usize>>,
}

impl SharedBytes {
    pub(crate) fn contents(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub(crate) fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

impl Write for SharedBytes {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

/// A wide sink whose units stay observable after it is boxed.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedWide {
    pub(crate) units: Arc<Mutex<Vec<WideChar>>>,
    pub(crate) syncs: Arc<Mutex<usize>>,
    pub(crate) budget: Option<usize>,
}

impl SharedWide {
    pub(crate) fn contents(&self) -> Vec<WideChar> {
        self.units.lock().unwrap().clone()
    }

    pub(crate) fn text(&self) -> String {
        self.contents()
            .into_iter()
            .map(WideUnit::to_u32)
            .map(|unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }

    pub(crate) fn sync_count(&self) -> usize {
        *self.syncs.lock().unwrap()
    }
}

impl WideSink for SharedWide {
    type Unit = WideChar;

    fn put(&mut self, unit: WideChar) -> io::Result<()> {
        let mut units = self.units.lock().unwrap();
        if self.budget.is_some_and(|budget| units.len() == budget) {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        units.push(unit);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        *self.syncs.lock().unwrap() += 1;
        Ok(())
    }
}

/// A private registry wired to observable sinks.
pub(crate) struct Harness {
    pub(crate) streams: Streams,
    pub(crate) output: SharedBytes,
    pub(crate) error: SharedBytes,
    pub(crate) wide_output: SharedWide,
    pub(crate) wide_error: SharedWide,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_wide(SharedWide::default(), SharedWide::default())
    }

    pub(crate) fn with_wide(wide_output: SharedWide, wide_error: SharedWide) -> Self {
        let output = SharedBytes::default();
        let error = SharedBytes::default();
        let (wo, we) = (wide_output.clone(), wide_error.clone());
        let streams = Streams::new(
            Box::new(output.clone()),
            Box::new(error.clone()),
            move |stream| -> WideConsoleSink {
                match stream {
                    StdStream::Output => Box::new(wo.clone()),
                    StdStream::Error => Box::new(we.clone()),
                }
            },
        );
        Self {
            streams,
            output,
            error,
            wide_output,
            wide_error,
        }
    }
}

pub(crate) fn translate() -> ConsoleOptions {
    ConsoleOptions {
        mode: ConsoleMode::Translate,
        ..ConsoleOptions::default()
    }
}
