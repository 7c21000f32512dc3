use alloc::alloc as malloc;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::any::TypeId;
use core::fmt::Debug;
use core::num::NonZeroUsize;
use core::ptr::NonNull;

use strata_ptr::OwningPtr;

use crate::component::{Component, ComponentError, ComponentId, Components, Mask};
use crate::utils::{DebugCheckedUnwrap, Dropper};
use crate::world::{World, WorldError};

// -----------------------------------------------------------------------------
// ComponentBuffer

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ComponentId,
    type_id: TypeId,
    name: &'static str,
    offset: usize,
    layout: Layout,
    dropper: Option<Dropper>,
}

impl Entry {
    fn new<T: Component>(id: ComponentId, offset: usize) -> Self {
        Self {
            id,
            type_id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            offset,
            layout: Layout::new::<T>(),
            dropper: Dropper::of::<T>(),
        }
    }
}

/// An owned, type-erased set of component values.
///
/// Used to create or extend an entity with concrete values instead of
/// defaults. Values live in one aligned allocation until a world moves
/// them into table columns. Values never consumed are dropped with the
/// buffer.
///
/// Every value remembers its Rust type; a world refuses a buffer whose
/// ids map to other types in its own registry.
///
/// ```
/// use strata_ecs::component::{Component, ComponentBuffer};
/// use strata_ecs::world::World;
///
/// #[derive(Default)]
/// struct Name(String);
/// impl Component for Name {}
///
/// let mut world = World::new();
/// let mut values = ComponentBuffer::new();
/// values.push(&mut world, Name("crab".into())).unwrap();
/// assert_eq!(values.len(), 1);
/// ```
pub struct ComponentBuffer {
    data: NonNull<u8>,
    layout: Layout,
    len: usize,
    entries: Vec<Entry>,
    ids: Vec<ComponentId>,
    mask: Mask,
}

impl Debug for ComponentBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentBuffer")
            .field("components", &self.mask)
            .field("bytes", &self.len)
            .finish()
    }
}

impl Default for ComponentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ComponentBuffer {
    fn drop(&mut self) {
        self.clear();
        if self.layout.size() != 0 {
            unsafe { malloc::dealloc(self.data.as_ptr(), self.layout) };
        }
    }
}

impl ComponentBuffer {
    pub const fn new() -> Self {
        Self {
            data: NonNull::dangling(),
            layout: Layout::new::<()>(),
            len: 0,
            entries: Vec::new(),
            ids: Vec::new(),
            mask: Mask::EMPTY,
        }
    }

    /// Number of values held.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the held values, in insertion order.
    #[inline]
    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Adds `value`, registering `T` in `world` if needed.
    ///
    /// A second value of the same type replaces the first one.
    pub fn push<T: Component>(&mut self, world: &mut World, value: T) -> Result<&mut Self, WorldError> {
        let id = world.register_component::<T>()?;
        self.insert(id, value);
        Ok(self)
    }

    /// Adds `value` under `id`, replacing the value already held there.
    ///
    /// The pairing of `id` and `T` is checked when a world consumes the
    /// buffer.
    pub fn insert<T: Component>(&mut self, id: ComponentId, value: T) {
        let layout = Layout::new::<T>();
        let type_id = TypeId::of::<T>();

        if self.mask.get(id) {
            let index = self.entries.iter().position(|entry| entry.id == id);
            // SAFETY: the mask says the entry exists.
            let index = unsafe { index.debug_checked_unwrap() };
            let old = self.entries[index];
            if let Some(dropper) = old.dropper {
                // SAFETY: the slot holds an initialized value of the old type.
                unsafe { dropper.call(OwningPtr::new(self.entry_ptr(old))) };
            }

            let offset = if old.type_id == type_id { old.offset } else { self.reserve(layout) };
            let entry = Entry::new::<T>(id, offset);
            // SAFETY: the slot at `offset` fits `layout` and is uninitialized.
            unsafe { self.entry_ptr(entry).cast::<T>().write(value) };
            self.entries[index] = entry;
            return;
        }

        let offset = self.reserve(layout);
        let entry = Entry::new::<T>(id, offset);
        // SAFETY: `reserve` made room for `layout` at `offset`.
        unsafe { self.entry_ptr(entry).cast::<T>().write(value) };

        self.entries.push(entry);
        self.ids.push(id);
        self.mask.insert(id);
    }

    /// Fails if a held value is not of the type `components` registered
    /// under its id.
    pub(crate) fn check(&self, components: &Components) -> Result<(), ComponentError> {
        for entry in self.entries.iter() {
            match components.get(entry.id) {
                Some(info) if info.type_id() == entry.type_id => {}
                Some(_) => {
                    return Err(ComponentError::TypeMismatch {
                        id: entry.id,
                        value: entry.name,
                    });
                }
                None => return Err(ComponentError::Unregistered(entry.id)),
            }
        }
        Ok(())
    }

    /// Drops every held value, keeping the allocation.
    pub fn clear(&mut self) {
        for entry in self.entries.iter() {
            if let Some(dropper) = entry.dropper {
                unsafe { dropper.call(OwningPtr::new(self.entry_ptr(*entry))) };
            }
        }
        self.forget();
    }

    /// Hands each value to `f` by ownership, then empties the buffer.
    ///
    /// # Safety
    /// `f` must take ownership of every value it is given.
    pub(crate) unsafe fn take(&mut self, mut f: impl FnMut(ComponentId, OwningPtr<'_>)) {
        for entry in self.entries.iter() {
            f(entry.id, unsafe { OwningPtr::new(self.entry_ptr(*entry)) });
        }
        self.forget();
    }

    fn forget(&mut self) {
        self.entries.clear();
        self.ids.clear();
        self.mask = Mask::EMPTY;
        self.len = 0;
    }

    #[inline]
    fn entry_ptr(&self, entry: Entry) -> NonNull<u8> {
        if entry.layout.size() == 0 {
            // SAFETY: alignments are never zero.
            NonNull::without_provenance(unsafe { NonZeroUsize::new_unchecked(entry.layout.align()) })
        } else {
            // SAFETY: `offset` is inside the allocation.
            unsafe { self.data.add(entry.offset) }
        }
    }

    /// Returns the offset where a value of `layout` can be written.
    fn reserve(&mut self, layout: Layout) -> usize {
        if layout.size() == 0 {
            return 0;
        }

        let offset = self.len.next_multiple_of(layout.align());
        let end = offset + layout.size();
        if end > self.layout.size() || layout.align() > self.layout.align() {
            self.grow(end, layout.align());
        }
        self.len = end;
        offset
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, min_size: usize, align: usize) {
        let align = align.max(self.layout.align());
        let size = min_size.next_power_of_two().max(64);
        let Ok(new_layout) = Layout::from_size_align(size, align) else {
            panic!("component buffer of {size} bytes overflows");
        };

        let data = NonNull::new(unsafe { malloc::alloc(new_layout) })
            .unwrap_or_else(|| malloc::handle_alloc_error(new_layout));

        if self.layout.size() != 0 {
            unsafe {
                core::ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), self.len);
                malloc::dealloc(self.data.as_ptr(), self.layout);
            }
        }

        self.data = data;
        self.layout = new_layout;
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ComponentBuffer;
    use crate::component::{Component, ComponentError, ComponentId};
    use crate::world::World;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[derive(Default)]
    struct Counted(Option<Rc<Cell<u32>>>);
    impl Component for Counted {}

    impl Drop for Counted {
        fn drop(&mut self) {
            if let Some(count) = &self.0 {
                count.set(count.get() + 1);
            }
        }
    }

    #[derive(Default, Clone, Copy)]
    #[repr(align(32))]
    struct Wide([u8; 3]);
    impl Component for Wide {}

    #[derive(Default)]
    struct Marker;
    impl Component for Marker {}

    #[test]
    fn unconsumed_values_are_dropped() {
        let drops = Rc::new(Cell::new(0));
        let mut buffer = ComponentBuffer::new();
        buffer.insert(ComponentId::new(0), Counted(Some(drops.clone())));
        buffer.insert(ComponentId::new(0), Counted(Some(drops.clone())));
        assert_eq!(drops.get(), 1, "replaced value dropped");
        assert_eq!(buffer.len(), 1);
        drop(buffer);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn replacing_with_another_type_moves_the_slot() {
        let drops = Rc::new(Cell::new(0));
        let mut buffer = ComponentBuffer::new();
        buffer.insert(ComponentId::new(3), Counted(Some(drops.clone())));
        buffer.insert(ComponentId::new(3), Wide([9; 3]));
        assert_eq!(drops.get(), 1);
        assert_eq!(buffer.ids(), &[ComponentId::new(3)]);

        let mut world = World::new();
        world.register_component::<Counted>().unwrap();
        world.register_component::<Wide>().unwrap();
        // Id 0 belongs to `Counted`, id 1 to `Wide`; id 3 is unknown.
        assert_eq!(
            buffer.check(&world.components),
            Err(ComponentError::Unregistered(ComponentId::new(3)))
        );

        let mut buffer = ComponentBuffer::new();
        buffer.insert(ComponentId::new(0), Wide([1; 3]));
        assert!(matches!(
            buffer.check(&world.components),
            Err(ComponentError::TypeMismatch { id, .. }) if id == ComponentId::new(0)
        ));

        let mut buffer = ComponentBuffer::new();
        buffer.insert(ComponentId::new(1), Wide([1; 3]));
        assert_eq!(buffer.check(&world.components), Ok(()));
    }

    #[test]
    fn mixed_alignment_survives_growth() {
        let mut buffer = ComponentBuffer::new();
        buffer.insert(ComponentId::new(0), Marker);
        for i in 1..6u8 {
            buffer.insert(ComponentId::new(i as usize), Wide([i; 3]));
        }
        assert_eq!(buffer.ids().len(), 6);
        assert!(buffer.mask().get(ComponentId::new(5)));

        let mut seen = 0;
        unsafe {
            buffer.take(|id, ptr| {
                if id.index() == 0 {
                    return;
                }
                assert!(ptr.is_aligned::<Wide>());
                let value = ptr.read::<Wide>();
                assert_eq!(value.0, [id.index() as u8; 3]);
                seen += 1;
            });
        }
        assert_eq!(seen, 5);
        assert!(buffer.is_empty());
    }
}
