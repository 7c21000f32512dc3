use alloc::alloc as malloc;
use core::alloc::Layout;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

use strata_ptr::{OwningPtr, Ptr, PtrMut};

use crate::utils::{AbortOnPanic, DefaultFn, Dropper};

// -----------------------------------------------------------------------------
// Column

/// A contiguous, type-erased buffer holding one component of every row.
///
/// The column does not track its length or capacity, the owning
/// [`Table`](crate::storage::Table) does. Zero-sized items never allocate.
#[derive(Debug)]
pub struct Column {
    item_layout: Layout,
    data: NonNull<u8>,
    dropper: Option<Dropper>,
}

impl Column {
    #[inline(always)]
    const fn is_zst(&self) -> bool {
        self.item_layout.size() == 0
    }

    /// Returns the layout of one item.
    #[inline(always)]
    pub const fn item_layout(&self) -> Layout {
        self.item_layout
    }

    #[inline(always)]
    pub const fn dropper(&self) -> Option<Dropper> {
        self.dropper
    }

    /// Creates an unallocated column.
    ///
    /// # Safety
    /// - `item_layout` must be the layout of the stored type.
    /// - `dropper`, if any, must drop the stored type.
    #[inline(always)]
    pub(crate) const unsafe fn new(item_layout: Layout, dropper: Option<Dropper>) -> Self {
        let align = unsafe { NonZeroUsize::new_unchecked(item_layout.align()) };

        Self {
            item_layout,
            dropper,
            data: NonNull::without_provenance(align),
        }
    }

    /// # Safety
    /// The column must not be allocated yet.
    pub(crate) unsafe fn alloc(&mut self, capacity: NonZeroUsize) {
        if !self.is_zst() {
            let new_layout = array_layout(self.item_layout, capacity.get());

            self.data = NonNull::new(unsafe { malloc::alloc(new_layout) })
                .unwrap_or_else(|| malloc::handle_alloc_error(new_layout));
        }
    }

    /// Grows or shrinks the allocation, keeping `min(current, new)` items.
    ///
    /// # Safety
    /// The column must be allocated with `current_capacity`.
    pub(crate) unsafe fn realloc(&mut self, current_capacity: NonZeroUsize, new_capacity: NonZeroUsize) {
        if !self.is_zst() {
            let new_layout = array_layout(self.item_layout, new_capacity.get());

            self.data = NonNull::new(unsafe {
                malloc::realloc(
                    self.data.as_ptr(),
                    array_layout_unchecked(self.item_layout, current_capacity.get()),
                    new_layout.size(),
                )
            })
            .unwrap_or_else(|| malloc::handle_alloc_error(new_layout));
        }
    }

    /// Frees the allocation without dropping anything.
    ///
    /// # Safety
    /// - `current_capacity` must be the allocated capacity.
    /// - Every item must already be dropped or moved out.
    pub(crate) unsafe fn dealloc(&mut self, current_capacity: usize) {
        if current_capacity != 0 && !self.is_zst() {
            unsafe {
                let layout = array_layout_unchecked(self.item_layout, current_capacity);
                malloc::dealloc(self.data.as_ptr(), layout);
            }
        }
    }

    #[inline(always)]
    const unsafe fn slot(&self, row: usize) -> NonNull<u8> {
        unsafe { self.data.add(row * self.item_layout.size()) }
    }

    /// Returns a pointer to the item at `row`, computed as `base + row * size`.
    ///
    /// # Safety
    /// `row` must be an initialized row.
    #[inline(always)]
    pub unsafe fn get(&self, row: usize) -> Ptr<'_> {
        unsafe { Ptr::new(self.slot(row)) }
    }

    /// # Safety
    /// `row` must be an initialized row.
    #[inline(always)]
    pub unsafe fn get_mut(&mut self, row: usize) -> PtrMut<'_> {
        unsafe { PtrMut::new(self.slot(row)) }
    }

    /// Views the first `len` items as a typed slice.
    ///
    /// # Safety
    /// - `T` must be the stored type.
    /// - The first `len` rows must be initialized.
    #[inline]
    pub unsafe fn as_slice<T>(&self, len: usize) -> &[T] {
        unsafe { core::slice::from_raw_parts(self.data.as_ptr().cast::<T>(), len) }
    }

    /// # Safety
    /// - `T` must be the stored type.
    /// - The first `len` rows must be initialized.
    #[inline]
    pub unsafe fn as_mut_slice<T>(&mut self, len: usize) -> &mut [T] {
        unsafe { core::slice::from_raw_parts_mut(self.data.as_ptr().cast::<T>(), len) }
    }

    /// Moves `value` into an uninitialized slot.
    ///
    /// # Safety
    /// - `row` must be within capacity and uninitialized.
    /// - `value` must point to a value of the stored type.
    #[inline]
    pub(crate) unsafe fn init_item(&mut self, row: usize, value: OwningPtr<'_>) {
        let size = self.item_layout.size();
        unsafe {
            ptr::copy_nonoverlapping::<u8>(value.as_ptr(), self.slot(row).as_ptr(), size);
        }
    }

    /// Writes the default value into an uninitialized slot.
    ///
    /// # Safety
    /// - `row` must be within capacity and uninitialized.
    /// - `default` must produce the stored type.
    #[inline]
    pub(crate) unsafe fn init_default(&mut self, row: usize, default: DefaultFn) {
        unsafe { default.call(self.slot(row)) }
    }

    /// # Safety
    /// `row` must be initialized, and is uninitialized afterwards.
    pub(crate) unsafe fn drop_item(&mut self, row: usize) {
        if let Some(dropper) = self.dropper {
            let guard = AbortOnPanic("a component destructor panicked");
            unsafe { dropper.call(self.get_mut(row).promote()) }
            core::mem::forget(guard);
        }
    }

    /// Drops the items `0..len`.
    ///
    /// # Safety
    /// The first `len` rows must be initialized.
    pub(crate) unsafe fn drop_slice(&mut self, len: usize) {
        if let Some(dropper) = self.dropper {
            let guard = AbortOnPanic("a component destructor panicked");
            (0..len).for_each(|row| unsafe { dropper.call(self.get_mut(row).promote()) });
            core::mem::forget(guard);
        }
    }

    /// Zero-fills `count` slots starting at `row`.
    ///
    /// # Safety
    /// The range must be within capacity and hold no live values.
    #[inline]
    pub(crate) unsafe fn zero(&mut self, row: usize, count: usize) {
        unsafe { ptr::write_bytes(self.slot(row).as_ptr(), 0, count * self.item_layout.size()) }
    }

    /// Fills `row` with the item at `last` and clears `last`.
    ///
    /// The item previously at `row` is forgotten.
    ///
    /// # Safety
    /// - `row <= last`, both within the initialized range.
    /// - The item at `row` must already be dropped or moved out.
    pub(crate) unsafe fn swap_forget(&mut self, row: usize, last: usize) {
        unsafe {
            if row != last {
                let size = self.item_layout.size();
                ptr::copy_nonoverlapping::<u8>(self.slot(last).as_ptr(), self.slot(row).as_ptr(), size);
            }
            self.zero(last, 1);
        }
    }

    /// Drops the item at `row`, then behaves like [`swap_forget`](Self::swap_forget).
    ///
    /// # Safety
    /// `row <= last`, both within the initialized range.
    pub(crate) unsafe fn swap_drop(&mut self, row: usize, last: usize) {
        unsafe {
            self.drop_item(row);
            self.swap_forget(row, last);
        }
    }

    /// Copies the bytes of `count` items into `other`, transferring ownership.
    ///
    /// # Safety
    /// - Both columns store the same type.
    /// - `src..src + count` is initialized in `self` and is treated as
    ///   uninitialized afterwards.
    /// - `dst..dst + count` is within capacity and uninitialized in `other`.
    pub(crate) unsafe fn move_to(&self, other: &mut Column, src: usize, dst: usize, count: usize) {
        debug_assert_eq!(self.item_layout, other.item_layout);
        let size = self.item_layout.size();
        unsafe {
            ptr::copy_nonoverlapping::<u8>(
                self.slot(src).as_ptr(),
                other.slot(dst).as_ptr(),
                size * count,
            );
        }
    }
}

// -----------------------------------------------------------------------------
// alloc helper

/// Layout of an array of `n` items, panicking on overflow.
#[inline]
const fn array_layout(layout: Layout, n: usize) -> Layout {
    #[cold]
    #[inline(never)]
    const fn invalid_size() -> ! {
        panic!("invalid size in `Layout::from_size_align`");
    }

    let Some(alloc_size) = layout.size().checked_mul(n) else {
        invalid_size();
    };

    if alloc_size > isize::MAX as usize {
        invalid_size();
    }

    unsafe { Layout::from_size_align_unchecked(alloc_size, layout.align()) }
}

/// # Safety
/// `layout.size() * n` must not overflow `isize::MAX`.
#[inline]
const unsafe fn array_layout_unchecked(layout: Layout, n: usize) -> Layout {
    unsafe { Layout::from_size_align_unchecked(layout.size() * n, layout.align()) }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Column;
    use crate::utils::{DefaultFn, Dropper};
    use alloc::string::String;
    use core::alloc::Layout;
    use core::num::NonZeroUsize;
    use strata_ptr::OwningPtr;

    fn column_of<T>(capacity: usize) -> Column {
        let mut column = unsafe { Column::new(Layout::new::<T>(), Dropper::of::<T>()) };
        unsafe { column.alloc(NonZeroUsize::new(capacity).unwrap()) };
        column
    }

    #[test]
    fn swap_forget_zero_fills_the_tail() {
        let mut column = column_of::<u32>(4);
        unsafe {
            for (row, value) in [10u32, 20, 30].into_iter().enumerate() {
                OwningPtr::make(value, |ptr| column.init_item(row, ptr));
            }
            column.swap_drop(0, 2);
            assert_eq!(column.as_slice::<u32>(2), &[30, 20]);
            assert_eq!(*column.get(2).as_ref::<u32>(), 0);
            column.dealloc(4);
        }
    }

    #[test]
    fn grows_and_moves_owned_values() {
        let mut src = column_of::<String>(2);
        let mut dst = column_of::<String>(1);
        unsafe {
            src.init_default(0, DefaultFn::of::<String>());
            OwningPtr::make(String::from("moved"), |ptr| src.init_item(1, ptr));

            dst.realloc(NonZeroUsize::new(1).unwrap(), NonZeroUsize::new(4).unwrap());
            src.move_to(&mut dst, 0, 2, 2);
            assert_eq!(dst.get(2).as_ref::<String>(), "");
            assert_eq!(dst.get(3).as_ref::<String>(), "moved");

            dst.drop_item(2);
            dst.drop_item(3);
            src.dealloc(2);
            dst.dealloc(4);
        }
    }

    #[test]
    fn zero_sized_items_never_allocate() {
        #[derive(Default)]
        struct Marker;

        let mut column = column_of::<Marker>(8);
        unsafe {
            column.init_default(5, DefaultFn::of::<Marker>());
            assert!(column.get(5).is_aligned::<Marker>());
            column.swap_forget(5, 5);
            column.dealloc(8);
        }
    }
}
