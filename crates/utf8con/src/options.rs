use crate::{StdStream, platform};

/// How a [`Utf8Console`](crate::Utf8Console) treats the standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConsoleMode {
    /// The console expects wide characters. UTF-8 written to the standard
    /// streams is decoded and forwarded to the wide console.
    Translate,
    /// The console already takes the process's narrow encoding. Nothing is
    /// redirected; wide console sinks only pick up the process locale.
    Native,
}

impl ConsoleMode {
    /// The mode the current platform needs.
    #[must_use]
    pub const fn platform() -> Self {
        if platform::TRANSLATES {
            Self::Translate
        } else {
            Self::Native
        }
    }
}

impl Default for ConsoleMode {
    fn default() -> Self {
        Self::platform()
    }
}

/// Configuration for a [`Utf8Console`](crate::Utf8Console).
///
/// # Default
///
/// The platform's [`ConsoleMode`], with both standard output and standard
/// error redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConsoleOptions {
    /// Whether to translate output for a wide console.
    ///
    /// # Default
    ///
    /// [`ConsoleMode::platform()`]
    pub mode: ConsoleMode,

    /// Redirect standard output when translating.
    ///
    /// # Default
    ///
    /// `true`
    pub output: bool,

    /// Redirect standard error when translating.
    ///
    /// # Default
    ///
    /// `true`
    pub error: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            mode: ConsoleMode::platform(),
            output: true,
            error: true,
        }
    }
}

impl ConsoleOptions {
    pub(crate) fn redirects(&self, stream: StdStream) -> bool {
        match stream {
            StdStream::Output => self.output,
            StdStream::Error => self.error,
        }
    }
}
