use std::io;

use thiserror::Error;

/// A wide sink refused a unit partway through a buffer.
///
/// Bytes before `consumed` went through the decoder; the byte at
/// `consumed - 1` triggered the rejected emission. Nothing after it was
/// looked at.
#[derive(Error, Debug)]
#[error("wide sink rejected output after {consumed} input bytes: {source}")]
pub struct WriteFailure {
    /// Input bytes processed, including the one whose output failed.
    pub consumed: usize,
    /// The sink's error.
    #[source]
    pub source: io::Error,
}

impl From<WriteFailure> for io::Error {
    /// Keeps the sink's error kind, except that `Interrupted` becomes
    /// `Other`: part of the buffer has already reached the sink, so the write
    /// must not be retried from the start.
    fn from(failure: WriteFailure) -> Self {
        let kind = match failure.source.kind() {
            io::ErrorKind::Interrupted => io::ErrorKind::Other,
            kind => kind,
        };
        io::Error::new(kind, failure)
    }
}
