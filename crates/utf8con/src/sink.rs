use std::io;

use crate::WideUnit;

/// A destination for wide-character output, one unit at a time.
///
/// This is the console side of a [`Decoder`](crate::Decoder): the real
/// console device, or an in-memory buffer in tests.
pub trait WideSink {
    /// The unit type the sink accepts.
    type Unit: WideUnit;

    /// Accept a single unit.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot take any more output, e.g. the
    /// console was detached or the pipe behind it closed.
    fn put(&mut self, unit: Self::Unit) -> io::Result<()>;

    /// Push anything buffered through to the device.
    ///
    /// # Errors
    ///
    /// Returns the device's write error.
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<U: WideUnit> WideSink for Vec<U> {
    type Unit = U;

    fn put(&mut self, unit: U) -> io::Result<()> {
        self.push(unit);
        Ok(())
    }
}

impl<S: WideSink + ?Sized> WideSink for &mut S {
    type Unit = S::Unit;

    fn put(&mut self, unit: Self::Unit) -> io::Result<()> {
        (**self).put(unit)
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}

impl<S: WideSink + ?Sized> WideSink for Box<S> {
    type Unit = S::Unit;

    fn put(&mut self, unit: Self::Unit) -> io::Result<()> {
        (**self).put(unit)
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}
