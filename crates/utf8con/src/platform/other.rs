use std::{
    env, fmt,
    io::{self, Write},
    sync::{PoisonError, RwLock},
};

use tracing::debug;

use crate::{StdStream, WideSink};

/// The native wide unit: `wchar_t` is 32 bits here.
pub type WideChar = u32;

/// Whether this platform's console needs UTF-8 translated to wide output.
pub const TRANSLATES: bool = false;

static LOCALE: RwLock<Option<Locale>> = RwLock::new(None);

pub(super) fn switch_to_wide() {
    // The terminal takes the locale's narrow encoding; nothing to switch.
}

/// A process locale, as named by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    name: String,
}

impl Locale {
    /// A locale with the given name, e.g. `en_US.UTF-8`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The locale selected by `LC_ALL`, `LC_CTYPE` or `LANG`, in that order
    /// of precedence, falling back to `C`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|var| env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    /// Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ["LC_ALL", "LC_CTYPE", "LANG"]
            .into_iter()
            .find_map(|var| lookup(var).filter(|name| !name.is_empty()))
            .map_or_else(|| Self::new("C"), |name| Self { name })
    }

    /// The locale name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the locale's codeset is UTF-8.
    #[must_use]
    pub fn is_utf8(&self) -> bool {
        self.codeset().is_some_and(|codeset| {
            let codeset = codeset.replace('-', "");
            codeset.eq_ignore_ascii_case("utf8")
        })
    }

    /// Whether text beyond ASCII can be written in this locale.
    ///
    /// The bare `C` and `POSIX` locales are treated as UTF-8, which is what
    /// Rust's own standard streams assume.
    fn encodes_unicode(&self) -> bool {
        self.is_utf8() || matches!(self.name.as_str(), "C" | "POSIX")
    }

    fn codeset(&self) -> Option<&str> {
        let (_, rest) = self.name.split_once('.')?;
        Some(rest.split_once('@').map_or(rest, |(codeset, _)| codeset))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// Read the process locale and make it the locale of wide console sinks
/// created from now on.
///
/// Safe to call any number of times; each call picks up the current
/// environment.
pub fn imbue_locale() -> Locale {
    let locale = Locale::from_env();
    debug!(locale = %locale, "imbuing wide console with process locale");
    *LOCALE.write().unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());
    locale
}

fn current_locale() -> Locale {
    LOCALE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(Locale::from_env)
}

/// The terminal behind a standard stream, taking one UTF-32 unit at a time
/// and writing it in the locale's encoding.
pub struct WideConsole {
    target: Box<dyn Write + Send>,
    locale: Locale,
}

impl WideConsole {
    /// The console behind `stream`, in the imbued process locale.
    #[must_use]
    pub fn new(stream: StdStream) -> Self {
        let target: Box<dyn Write + Send> = match stream {
            StdStream::Output => Box::new(io::stdout()),
            StdStream::Error => Box::new(io::stderr()),
        };
        Self {
            target,
            locale: current_locale(),
        }
    }

    /// A console writing to an arbitrary byte writer.
    pub fn with_writer(target: impl Write + Send + 'static, locale: Locale) -> Self {
        Self {
            target: Box::new(target),
            locale,
        }
    }

    /// Switch to `locale`, returning the previous one.
    pub fn imbue(&mut self, locale: Locale) -> Locale {
        core::mem::replace(&mut self.locale, locale)
    }

    /// The locale units are encoded in.
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

impl fmt::Debug for WideConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WideConsole")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl WideSink for WideConsole {
    type Unit = u32;

    fn put(&mut self, unit: u32) -> io::Result<()> {
        let ch = char::from_u32(unit).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("U+{unit:04X} is not a Unicode scalar value"),
            )
        })?;
        if !ch.is_ascii() && !self.locale.encodes_unicode() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("U+{unit:04X} cannot be written in locale {}", self.locale),
            ));
        }
        let mut buf = [0; 4];
        self.target.write_all(ch.encode_utf8(&mut buf).as_bytes())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}
