#![cfg(windows)]

use std::{
    io::{self, Write},
    ptr,
    sync::OnceLock,
};

use windows_sys::Win32::{
    Foundation::{HANDLE, INVALID_HANDLE_VALUE},
    System::Console::{
        CONSOLE_MODE, GetConsoleMode, GetStdHandle, STD_ERROR_HANDLE, STD_OUTPUT_HANDLE,
        WriteConsoleW,
    },
};

use crate::{StdStream, WideSink};

/// The native wide unit: `wchar_t` is a UTF-16 code unit here.
pub type WideChar = u16;

/// Whether this platform's console needs UTF-8 translated to wide output.
pub const TRANSLATES: bool = true;

const CAPACITY: usize = 4096;

static CONSOLES: OnceLock<[bool; 2]> = OnceLock::new();

pub(super) fn switch_to_wide() {
    consoles();
}

fn consoles() -> &'static [bool; 2] {
    CONSOLES.get_or_init(|| StdStream::ALL.map(is_console))
}

fn std_handle(stream: StdStream) -> HANDLE {
    let id = match stream {
        StdStream::Output => STD_OUTPUT_HANDLE,
        StdStream::Error => STD_ERROR_HANDLE,
    };
    // SAFETY: `GetStdHandle` has no preconditions.
    unsafe { GetStdHandle(id) }
}

fn is_console(stream: StdStream) -> bool {
    let handle = std_handle(stream);
    if handle.is_null() || handle == INVALID_HANDLE_VALUE {
        return false;
    }
    let mut mode: CONSOLE_MODE = 0;
    // SAFETY: `handle` is a standard handle and `mode` outlives the call.
    unsafe { GetConsoleMode(handle, &mut mode) != 0 }
}

/// The console behind a standard stream, taking UTF-16 units.
///
/// Units are buffered and written with `WriteConsoleW` on a newline, when the
/// buffer fills up, and on [`sync`](WideSink::sync). When the stream is
/// redirected to a file or pipe the units are written as UTF-16LE bytes.
#[derive(Debug)]
pub struct WideConsole {
    stream: StdStream,
    units: Vec<u16>,
}

impl WideConsole {
    /// The console behind `stream`.
    #[must_use]
    pub fn new(stream: StdStream) -> Self {
        Self {
            stream,
            units: Vec::with_capacity(CAPACITY),
        }
    }

    fn flush_units(&mut self) -> io::Result<()> {
        if self.units.is_empty() {
            return Ok(());
        }
        let units = core::mem::take(&mut self.units);
        let result = if consoles()[self.stream.index()] {
            write_console(std_handle(self.stream), &units)
        } else {
            let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
            match self.stream {
                StdStream::Output => io::stdout().write_all(&bytes),
                StdStream::Error => io::stderr().write_all(&bytes),
            }
        };
        self.units = units;
        self.units.clear();
        result
    }
}

fn write_console(handle: HANDLE, mut units: &[u16]) -> io::Result<()> {
    while !units.is_empty() {
        let len = u32::try_from(units.len()).unwrap_or(u32::MAX);
        let mut written = 0u32;
        // SAFETY: `units` is valid for `len` reads and `written` outlives the
        // call.
        let ok = unsafe {
            WriteConsoleW(
                handle,
                units.as_ptr().cast(),
                len,
                &mut written,
                ptr::null(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        if written == 0 {
            return Err(io::ErrorKind::WriteZero.into());
        }
        units = &units[written as usize..];
    }
    Ok(())
}

impl WideSink for WideConsole {
    type Unit = u16;

    fn put(&mut self, unit: u16) -> io::Result<()> {
        self.units.push(unit);
        if unit == u16::from(b'\n') || self.units.len() >= CAPACITY {
            self.flush_units()?;
        }
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush_units()?;
        match self.stream {
            StdStream::Output => io::stdout().flush(),
            StdStream::Error => io::stderr().flush(),
        }
    }
}

impl Drop for WideConsole {
    fn drop(&mut self) {
        let _ = self.flush_units();
    }
}
