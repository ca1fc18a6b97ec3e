use core::fmt;

use tracing::debug;

use crate::{
    ByteWriter, ConsoleMode, ConsoleOptions, StdStream, Streams,
    platform::{prepare_console, prepare_native},
};

/// Keeps the standard streams decoding UTF-8 for as long as it lives.
///
/// In [`ConsoleMode::Translate`] the guard puts a UTF-8 [`Decoder`] in front
/// of each selected stream that is not already decoding, and puts the previous
/// sink back when dropped. A guard created while another one is active leaves
/// the stream alone and restores nothing, so nested guards unwind cleanly in
/// any order.
///
/// The guard cannot be cloned. Moving it moves the duty to restore the
/// streams.
///
/// [`Decoder`]: crate::Decoder
#[must_use = "the previous console sinks are restored as soon as the guard is dropped"]
pub struct Utf8Console<'s> {
    streams: &'s Streams,
    mode: ConsoleMode,
    previous: [Option<ByteWriter>; 2],
}

impl Utf8Console<'static> {
    /// Redirect the process's standard streams as the platform requires.
    pub fn new() -> Self {
        Self::with_options(ConsoleOptions::default())
    }

    /// Redirect the process's standard streams as `options` say.
    pub fn with_options(options: ConsoleOptions) -> Self {
        Self::install(Streams::global(), options)
    }
}

impl Default for Utf8Console<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Utf8Console<'s> {
    /// Redirect the streams of `streams` as `options` say.
    pub fn install(streams: &'s Streams, options: ConsoleOptions) -> Self {
        let mut previous = [None, None];
        match options.mode {
            ConsoleMode::Native => prepare_native(),
            ConsoleMode::Translate => {
                prepare_console();
                for stream in StdStream::ALL {
                    if options.redirects(stream) {
                        previous[stream.index()] = streams.install(stream);
                    }
                }
            }
        }
        debug!(
            mode = ?options.mode,
            output = previous[0].is_some(),
            error = previous[1].is_some(),
            "UTF-8 console session started"
        );
        Self {
            streams,
            mode: options.mode,
            previous,
        }
    }

    /// The mode the guard was created with.
    #[must_use]
    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    /// Whether this guard redirected `stream` and will restore it.
    #[must_use]
    pub fn owns(&self, stream: StdStream) -> bool {
        self.previous[stream.index()].is_some()
    }

    /// Whether this guard redirected any stream.
    #[must_use]
    pub fn is_active(&self) -> bool {
        StdStream::ALL.into_iter().any(|stream| self.owns(stream))
    }
}

impl Drop for Utf8Console<'_> {
    fn drop(&mut self) {
        for stream in StdStream::ALL {
            if let Some(previous) = self.previous[stream.index()].take() {
                self.streams.restore(stream, previous);
            }
        }
    }
}

impl fmt::Debug for Utf8Console<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8Console")
            .field("mode", &self.mode)
            .field("owns_output", &self.owns(StdStream::Output))
            .field("owns_error", &self.owns(StdStream::Error))
            .finish_non_exhaustive()
    }
}
