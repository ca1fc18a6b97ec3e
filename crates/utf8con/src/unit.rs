use core::fmt;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// A native wide-character code unit: `u16` for UTF-16 consoles, `u32` for
/// UTF-32 ones.
pub trait WideUnit: sealed::Sealed + Copy + Eq + fmt::Debug + Send + 'static {
    /// Width of the unit in bits.
    const BITS: u32;

    /// Build a unit from a code point value, truncating it to the unit's
    /// width.
    fn from_scalar(value: u32) -> Self;

    /// The unit's numeric value.
    fn to_u32(self) -> u32;
}

impl WideUnit for u16 {
    const BITS: u32 = u16::BITS;

    #[inline]
    #[expect(clippy::cast_possible_truncation)]
    fn from_scalar(value: u32) -> Self {
        value as u16
    }

    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }
}

impl WideUnit for u32 {
    const BITS: u32 = u32::BITS;

    #[inline]
    fn from_scalar(value: u32) -> Self {
        value
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self
    }
}
