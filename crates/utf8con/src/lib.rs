//! UTF-8 console output for consoles that speak wide characters.
//!
//! Application code writes UTF-8 bytes to [`stdout()`] and [`stderr()`]. On a
//! platform whose console expects UTF-16 (Windows), a [`Utf8Console`] guard
//! swaps the sinks behind those streams for streaming [`Decoder`]s that turn
//! the bytes into wide units and hand them to the real console. Dropping the
//! guard puts the previous sinks back.
//!
//! ```no_run
//! use std::io::Write;
//!
//! fn main() -> std::io::Result<()> {
//!     let _console = utf8con::make_utf8_io();
//!     writeln!(utf8con::stdout(), "Hello, 世界!")?;
//!     Ok(())
//! }
//! ```
//!
//! The decoder is usable on its own with any [`WideSink`]:
//!
//! ```rust
//! use utf8con::Decoder;
//!
//! let mut decoder = Decoder::new(Vec::<u16>::new());
//! decoder.process_bytes(&[0xF0, 0x9F]).unwrap();
//! decoder.process_bytes(&[0x98, 0x80]).unwrap();
//! assert_eq!(decoder.into_sink(), vec![0xD83D, 0xDE00]);
//! ```

mod decoder;
mod error;
mod options;
mod platform;
mod sink;
mod stream;
mod transcoder;
mod unit;

#[cfg(test)]
mod tests;

pub use decoder::Decoder;
pub use error::WriteFailure;
pub use options::{ConsoleMode, ConsoleOptions};
#[cfg(not(windows))]
pub use platform::{Locale, imbue_locale};
pub use platform::{TRANSLATES, WideChar, WideConsole, prepare_console};
pub use sink::WideSink;
pub use stream::{
    ByteWriter, StdStream, StreamHandle, StreamLock, Streams, WideConsoleSink, stderr, stdout,
};
pub use transcoder::Utf8Console;
pub use unit::WideUnit;

/// Begin a UTF-8 console session on the process's standard streams.
///
/// Bind the returned guard to the scope that should see UTF-8 output
/// (usually all of `main`); the original sinks come back when it drops.
#[must_use = "the previous console sinks are restored as soon as the guard is dropped"]
pub fn make_utf8_io() -> Utf8Console<'static> {
    Utf8Console::new()
}
