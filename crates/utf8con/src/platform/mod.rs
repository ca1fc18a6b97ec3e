use std::sync::Once;

use tracing::debug;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::*;

#[cfg(not(windows))]
mod other;

#[cfg(not(windows))]
pub use self::other::*;

static PREPARED: Once = Once::new();

/// Switch the process's console to wide-character output.
///
/// The work happens at most once per process no matter how many threads or
/// guards call this; the first caller wins and every later call returns
/// immediately. Returns `true` for the call that did the work.
pub fn prepare_console() -> bool {
    let mut ran = false;
    PREPARED.call_once(|| {
        switch_to_wide();
        ran = true;
    });
    if ran {
        debug!(translates = TRANSLATES, "prepared console for wide output");
    }
    ran
}

/// Preparation for [`ConsoleMode::Native`](crate::ConsoleMode::Native).
pub(crate) fn prepare_native() {
    #[cfg(not(windows))]
    imbue_locale();
}
