use core::ptr::NonNull;

use strata_ptr::OwningPtr;

// -----------------------------------------------------------------------------
// Dropper

/// A type-erased destructor.
///
/// Only exists for types that need dropping, see [`Dropper::of`].
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct Dropper {
    func: unsafe fn(OwningPtr<'_>),
}

impl Dropper {
    /// # Safety
    /// `ptr` points to a valid `T`.
    unsafe fn drop_fn<T>(ptr: OwningPtr<'_>) {
        ptr.debug_assert_aligned::<T>();
        unsafe {
            ptr.drop_as::<T>();
        }
    }

    /// Returns `None` for types without drop glue.
    pub const fn of<T>() -> Option<Dropper> {
        if core::mem::needs_drop::<T>() {
            Some(Dropper {
                func: Self::drop_fn::<T>,
            })
        } else {
            None
        }
    }

    /// # Safety
    /// `ptr` points to a valid value of the type this dropper was made for.
    #[inline(always)]
    pub(crate) unsafe fn call(self, ptr: OwningPtr<'_>) {
        unsafe { (self.func)(ptr) }
    }
}

// -----------------------------------------------------------------------------
// DefaultFn

/// Writes the default value of a type into uninitialized memory.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct DefaultFn {
    func: unsafe fn(NonNull<u8>),
}

impl DefaultFn {
    /// # Safety
    /// `dst` is valid for writes and aligned for `T`.
    unsafe fn write_fn<T: Default>(dst: NonNull<u8>) {
        unsafe { dst.cast::<T>().write(T::default()) }
    }

    pub const fn of<T: Default>() -> DefaultFn {
        DefaultFn {
            func: Self::write_fn::<T>,
        }
    }

    /// # Safety
    /// - `dst` is valid for writes and aligned for the type.
    /// - Any previous value at `dst` is leaked, not dropped.
    #[inline(always)]
    pub(crate) unsafe fn call(self, dst: NonNull<u8>) {
        unsafe { (self.func)(dst) }
    }
}
