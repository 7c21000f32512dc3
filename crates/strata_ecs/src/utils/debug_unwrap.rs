/// A debug checked version of [`Option::unwrap_unchecked`].
///
/// Panics in debug builds (or with the `debug` feature) on `None` / `Err`,
/// and is `unwrap_unchecked` otherwise.
#[doc(hidden)]
pub trait DebugCheckedUnwrap {
    type Item;

    /// # Safety
    /// Must only be called on `Some` or `Ok` values.
    unsafe fn debug_checked_unwrap(self) -> Self::Item;
}

impl<T> DebugCheckedUnwrap for Option<T> {
    type Item = T;

    #[cfg(any(feature = "debug", debug_assertions))]
    #[inline(always)]
    #[track_caller]
    unsafe fn debug_checked_unwrap(self) -> Self::Item {
        if let Some(inner) = self {
            inner
        } else {
            unreachable!()
        }
    }

    #[cfg(not(any(feature = "debug", debug_assertions)))]
    #[inline(always)]
    unsafe fn debug_checked_unwrap(self) -> Self::Item {
        unsafe { self.unwrap_unchecked() }
    }
}

impl<T, U> DebugCheckedUnwrap for Result<T, U> {
    type Item = T;

    #[cfg(any(feature = "debug", debug_assertions))]
    #[inline(always)]
    #[track_caller]
    unsafe fn debug_checked_unwrap(self) -> Self::Item {
        if let Ok(inner) = self {
            inner
        } else {
            unreachable!()
        }
    }

    #[cfg(not(any(feature = "debug", debug_assertions)))]
    #[inline(always)]
    unsafe fn debug_checked_unwrap(self) -> Self::Item {
        unsafe { self.unwrap_unchecked() }
    }
}
