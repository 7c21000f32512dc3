//! Niche-optimized integers.
#![expect(unsafe_code, reason = "transmute is unsafe")]

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use core::num::NonZero;

// -----------------------------------------------------------------------------
// NonMaxU32

/// A `u32` that is known not to equal `u32::MAX`.
///
/// `Option<NonMaxU32>` is the same size as `u32`:
///
/// ```
/// use strata_utils::num::NonMaxU32;
///
/// assert_eq!(size_of::<Option<NonMaxU32>>(), size_of::<u32>());
/// assert_eq!(NonMaxU32::new(7).map(NonMaxU32::get), Some(7));
/// assert!(NonMaxU32::new(u32::MAX).is_none());
/// ```
///
/// The value is stored XOR-ed with `u32::MAX`, so reading it costs one XOR.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct NonMaxU32(NonZero<u32>);

impl NonMaxU32 {
    /// The value `0`.
    pub const ZERO: NonMaxU32 = unsafe { mem::transmute(0u32 ^ u32::MAX) };

    /// The largest representable value, `u32::MAX - 1`.
    pub const MAX: NonMaxU32 = unsafe { mem::transmute((u32::MAX - 1) ^ u32::MAX) };

    /// Returns `None` if `n == u32::MAX`.
    #[inline(always)]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZero::<u32>::new(n ^ u32::MAX) {
            Some(inner) => Some(Self(inner)),
            None => None,
        }
    }

    /// Creates a value without checking it.
    ///
    /// # Safety
    /// `n` must not be `u32::MAX`.
    #[inline(always)]
    pub const unsafe fn new_unchecked(n: u32) -> Self {
        unsafe { Self(NonZero::new_unchecked(n ^ u32::MAX)) }
    }

    /// Returns the primitive value.
    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0.get() ^ u32::MAX
    }

    /// Returns the value as an index.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.get() as usize
    }
}

impl PartialOrd for NonMaxU32 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NonMaxU32 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl Hash for NonMaxU32 {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl From<NonMaxU32> for u32 {
    #[inline]
    fn from(nonmax: NonMaxU32) -> Self {
        nonmax.get()
    }
}

impl TryFrom<u32> for NonMaxU32 {
    type Error = NonMaxError;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NonMaxError)
    }
}

impl fmt::Debug for NonMaxU32 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl fmt::Display for NonMaxU32 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

/// Returned when converting `u32::MAX` into a [`NonMaxU32`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NonMaxError;

impl fmt::Display for NonMaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value equals the integer maximum")
    }
}

impl core::error::Error for NonMaxError {}

#[cfg(test)]
mod tests {
    use super::NonMaxU32;

    #[test]
    fn ordering_follows_value() {
        let small = NonMaxU32::new(3).unwrap();
        let large = NonMaxU32::MAX;
        assert!(small < large);
        assert_eq!(NonMaxU32::ZERO.get(), 0);
        assert_eq!(large.get(), u32::MAX - 1);
    }

    #[test]
    fn try_from_rejects_max() {
        assert!(NonMaxU32::try_from(u32::MAX).is_err());
        assert_eq!(u32::from(NonMaxU32::try_from(9).unwrap()), 9);
    }
}
