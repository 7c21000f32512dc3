use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

// -----------------------------------------------------------------------------
// Common methods

macro_rules! impl_ptr {
    ($ptr:ident) => {
        impl From<$ptr<'_>> for NonNull<u8> {
            #[inline(always)]
            fn from(ptr: $ptr<'_>) -> Self {
                ptr.0
            }
        }

        impl $ptr<'_> {
            /// Returns `true` if the address is aligned for `T`.
            #[inline]
            pub fn is_aligned<T>(&self) -> bool {
                self.0.as_ptr().cast::<T>().is_aligned()
            }

            /// Checks alignment for `T`, only in debug builds.
            #[cfg_attr(debug_assertions, track_caller)]
            #[cfg_attr(not(debug_assertions), inline(always))]
            pub fn debug_assert_aligned<T>(&self) {
                debug_assert!(
                    self.is_aligned::<T>(),
                    "pointer {:p} is not aligned to {} for type {}",
                    self.0,
                    align_of::<T>(),
                    core::any::type_name::<T>(),
                );
            }
        }

        impl fmt::Pointer for $ptr<'_> {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Pointer::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $ptr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($ptr), self.0)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Ptr

/// A type-erased shared pointer, the untyped form of `&'a T`.
///
/// The pointee must stay valid and unchanged while the pointer is alive.
///
/// ```
/// # use core::ptr::NonNull;
/// # use strata_ptr::Ptr;
/// let x = 8i32;
/// let ptr = unsafe { Ptr::new(NonNull::from_ref(&x).cast()) };
/// assert_eq!(unsafe { *ptr.as_ref::<i32>() }, 8);
/// ```
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Ptr<'a>(NonNull<u8>, PhantomData<&'a u8>);

impl_ptr!(Ptr);

impl<'a> Ptr<'a> {
    /// Wraps a raw pointer.
    ///
    /// # Safety
    /// `ptr` must point to a valid value for the lifetime `'a`.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> Ptr<'a> {
        Ptr(ptr, PhantomData)
    }

    /// Returns the raw address, dropping the lifetime.
    #[inline(always)]
    pub const fn as_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Converts back into a typed reference with the full lifetime `'a`.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_ref<T>(self) -> &'a T {
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }
}

// -----------------------------------------------------------------------------
// PtrMut

/// A type-erased exclusive pointer, the untyped form of `&'a mut T`.
///
/// ```
/// # use core::ptr::NonNull;
/// # use strata_ptr::PtrMut;
/// let mut x = 8i32;
/// let mut ptr = unsafe { PtrMut::new(NonNull::from_mut(&mut x).cast()) };
/// unsafe { *ptr.as_mut::<i32>() += 2 };
/// assert_eq!(x, 10);
/// ```
#[repr(transparent)]
pub struct PtrMut<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_ptr!(PtrMut);

impl<'a> PtrMut<'a> {
    /// Wraps a raw pointer.
    ///
    /// # Safety
    /// `ptr` must point to a valid value that is exclusively
    /// available for the lifetime `'a`.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> PtrMut<'a> {
        PtrMut(ptr, PhantomData)
    }

    /// Returns the raw address, dropping the lifetime.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Reborrows as a shared pointer with a shorter lifetime.
    #[inline(always)]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    /// Returns a typed shared reference tied to `&self`.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_ref<T>(&self) -> &'_ T {
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }

    /// Returns a typed mutable reference tied to `&mut self`.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub const unsafe fn as_mut<T>(&mut self) -> &'_ mut T {
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }

    /// Consumes the pointer into a typed mutable reference with lifetime `'a`.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub const unsafe fn consume<T>(self) -> &'a mut T {
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }

    /// Upgrades into an owning pointer.
    ///
    /// # Safety
    /// The caller takes over responsibility for the pointee: after this call
    /// the original location must be treated as uninitialized.
    #[inline(always)]
    pub const unsafe fn promote(self) -> OwningPtr<'a> {
        OwningPtr(self.0, PhantomData)
    }
}

// -----------------------------------------------------------------------------
// OwningPtr

/// A type-erased pointer that owns its pointee but not its memory.
///
/// Typically points into a column slot or at a stack value wrapped in
/// [`ManuallyDrop`]. Whoever holds it must either move the value out with
/// [`read`](Self::read), copy its bytes somewhere that takes over ownership,
/// or destroy it with [`drop_as`](Self::drop_as).
///
/// ```
/// # use strata_ptr::OwningPtr;
/// let s = String::from("abc");
/// let len = OwningPtr::make(s, |ptr| unsafe { ptr.read::<String>() }.len());
/// assert_eq!(len, 3);
/// ```
#[repr(transparent)]
pub struct OwningPtr<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_ptr!(OwningPtr);

impl<'a> OwningPtr<'a> {
    /// Wraps a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid value, exclusively available for `'a`.
    /// - The pointee must not be dropped by anyone else.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<u8>) -> OwningPtr<'a> {
        Self(ptr, PhantomData)
    }

    /// Moves `val` behind an `OwningPtr` for the duration of `f`.
    ///
    /// `f` is expected to consume the pointer, otherwise the value leaks.
    #[inline]
    pub fn make<T, F: FnOnce(OwningPtr<'_>) -> R, R>(val: T, f: F) -> R {
        let mut val = ManuallyDrop::new(val);
        f(OwningPtr(NonNull::from_mut(&mut *val).cast(), PhantomData))
    }

    /// Returns the raw address, dropping the lifetime.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Reborrows as a shared pointer.
    #[inline(always)]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    /// Moves the value out.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub const unsafe fn read<T>(self) -> T {
        unsafe { ptr::read(self.0.as_ptr().cast::<T>()) }
    }

    /// Runs the destructor of the pointee in place.
    ///
    /// # Safety
    /// - `T` must be the erased pointee type.
    /// - The pointer must be aligned for `T`.
    #[inline(always)]
    pub unsafe fn drop_as<T>(self) {
        unsafe { ptr::drop_in_place(self.0.as_ptr().cast::<T>()) }
    }
}

// -----------------------------------------------------------------------------
// Tests
