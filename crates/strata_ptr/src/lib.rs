//! Lightweight type-erased pointers for the storage engine.
//!
//! Column storage is untyped, so every value that crosses the storage boundary
//! travels as a pointer to bytes. These wrappers add a lifetime (and debug-only
//! alignment checks) on top of [`NonNull<u8>`](core::ptr::NonNull):
//!
//! - [`Ptr<'a>`]: a type-erased `&'a T`.
//! - [`PtrMut<'a>`]: a type-erased `&'a mut T`.
//! - [`OwningPtr<'a>`]: a pointer that conceptually owns its pointee. The value
//!   must be moved out with [`read`](OwningPtr::read) or destroyed with
//!   [`drop_as`](OwningPtr::drop_as), otherwise it leaks.
//!
//! None of them manage allocation.
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod type_erased;

// -----------------------------------------------------------------------------
// Top-level exports

pub use type_erased::{OwningPtr, Ptr, PtrMut};
