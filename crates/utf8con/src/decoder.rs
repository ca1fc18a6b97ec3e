//! Incremental UTF-8 decoder feeding a wide-character sink.
//!
//! The decoder keeps the partially read sequence between calls, so the input
//! may be split anywhere, including inside a multi-byte sequence. Malformed
//! input is never reported: an invalid lead byte, a stray continuation byte,
//! or a sequence cut short by a new lead or an ASCII byte is dropped and
//! decoding resumes with the next byte. No replacement character is emitted.

use std::io;

use bstr::BStr;
use tracing::{debug, trace};

use crate::{WideSink, WideUnit, WriteFailure};

const MAX_SCALAR: u32 = 0x10_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// `remaining` is always in `1..=3`.
    Pending { remaining: u8, point: u32 },
}

/// Streaming UTF-8 to wide-unit decoder.
///
/// Code points are written to the sink as UTF-16 (a surrogate pair for
/// anything outside the Basic Multilingual Plane) when `S::Unit` is 16 bits
/// wide, and as single units when it is 32 bits wide.
///
/// To decode into a sink the decoder should not own, instantiate it with
/// `&mut S`.
#[derive(Debug)]
pub struct Decoder<S> {
    state: State,
    sink: S,
}

impl<S: WideSink> Decoder<S> {
    /// Create an idle decoder writing to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            state: State::Idle,
            sink,
        }
    }

    /// Decode `bytes`, writing every completed code point to the sink.
    ///
    /// A sequence left incomplete at the end of `bytes` is carried over to the
    /// next call.
    ///
    /// # Errors
    ///
    /// When the sink rejects a unit, decoding stops at the byte that produced
    /// it. The returned [`WriteFailure`] reports how many bytes were consumed
    /// up to and including that byte.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Result<usize, WriteFailure> {
        for (index, &byte) in bytes.iter().enumerate() {
            let Some(point) = self.step(byte) else {
                continue;
            };
            if let Err(source) = self.emit(point) {
                let consumed = index + 1;
                debug!(
                    consumed,
                    unprocessed = %BStr::new(&bytes[consumed..]),
                    error = %source,
                    "wide sink rejected output"
                );
                return Err(WriteFailure { consumed, source });
            }
        }
        Ok(bytes.len())
    }

    /// Decode a single byte.
    ///
    /// ASCII goes straight to the sink; anything else runs through the same
    /// state machine as [`process_bytes`](Self::process_bytes).
    ///
    /// # Errors
    ///
    /// Returns the sink's error if it rejects the output of this byte. A
    /// rejected ASCII byte produced no output and reports the sink's error as
    /// is; any other failure is reported like a failed
    /// [`write`](std::io::Write::write).
    pub fn process_byte(&mut self, byte: u8) -> io::Result<()> {
        if byte.is_ascii() {
            self.state = State::Idle;
            return self.sink.put(S::Unit::from_scalar(byte.into()));
        }
        self.process_bytes(&[byte])
            .map(drop)
            .map_err(io::Error::from)
    }

    /// Flush the sink.
    ///
    /// A partially decoded sequence stays pending.
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn sync(&mut self) -> io::Result<()> {
        self.sink.sync()
    }

    /// Whether a multi-byte sequence is in progress.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// Drop any partially decoded sequence.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// The sink this decoder writes to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the decoder, returning its sink. A pending sequence is lost.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Advance the state machine by one byte, returning a finished code point.
    #[inline]
    fn step(&mut self, byte: u8) -> Option<u32> {
        let (next, complete) = match (byte, self.state) {
            (0x00..=0x7F, _) => (State::Idle, Some(u32::from(byte))),
            (0x80..=0xBF, State::Pending { remaining, point }) => {
                let point = (point << 6) | u32::from(byte & 0x3F);
                if remaining == 1 {
                    (State::Idle, Some(point))
                } else {
                    (
                        State::Pending {
                            remaining: remaining - 1,
                            point,
                        },
                        None,
                    )
                }
            }
            (0xC0..=0xDF, _) => (lead(1, byte & 0x1F), None),
            (0xE0..=0xEF, _) => (lead(2, byte & 0x0F), None),
            (0xF0..=0xF7, _) => (lead(3, byte & 0x07), None),
            _ => {
                trace!(byte, "discarding malformed UTF-8 byte");
                (State::Idle, None)
            }
        };
        self.state = next;
        complete
    }

    fn emit(&mut self, point: u32) -> io::Result<()> {
        if S::Unit::BITS >= 32 || point <= 0xD7FF || (0xE000..=0xFFFF).contains(&point) {
            self.sink.put(S::Unit::from_scalar(point))
        } else if (0x1_0000..=MAX_SCALAR).contains(&point) {
            let offset = point - 0x1_0000;
            self.sink.put(S::Unit::from_scalar((offset >> 10) + 0xD800))?;
            self.sink.put(S::Unit::from_scalar((offset & 0x3FF) + 0xDC00))
        } else {
            // Encoded surrogates and values past U+10FFFF have no UTF-16 form.
            trace!(point, "dropping code point with no UTF-16 encoding");
            Ok(())
        }
    }
}

fn lead(remaining: u8, bits: u8) -> State {
    State::Pending {
        remaining,
        point: u32::from(bits),
    }
}

/// A failed `write` may already have delivered part of the buffer, so its
/// error never has kind [`io::ErrorKind::Interrupted`]; callers must not
/// replay the buffer.
impl<S: WideSink> io::Write for Decoder<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.process_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync()
    }
}
