use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::num::NonZeroUsize;

use strata_ptr::{OwningPtr, Ptr, PtrMut};

use crate::archetype::ArcheId;
use crate::component::{ComponentId, Components, MAX_COMPONENTS, Mask};
use crate::entity::Entity;
use crate::relation::Relation;
use crate::storage::{Column, TableCol, TableId};
use crate::utils::AbortOnPanic;

// -----------------------------------------------------------------------------
// Table

/// Columnar storage for one archetype, or for one tuple of relation
/// targets within an archetype.
///
/// Every column and the entity column share one length. The capacity is
/// always a power of two and at least the length. Rows are removed by
/// swapping the last row into the hole, so row indices are not stable.
pub struct Table {
    id: TableId,
    archetype: ArcheId,
    columns: Box<[Column]>,
    idents: Box<[ComponentId]>,
    index: Box<[Option<TableCol>]>,
    entities: Vec<Entity>,
    relations: Box<[ComponentId]>,
    targets: Box<[Entity]>,
    capacity: usize,
    min_capacity: usize,
}

impl Debug for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("archetype", &self.archetype)
            .field("components", &self.idents)
            .field("targets", &self.targets)
            .field("len", &self.entities.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let len = self.entities.len();
        let capacity = self.capacity;
        self.columns.iter_mut().for_each(|c| unsafe {
            c.drop_slice(len);
            c.dealloc(capacity);
        });
    }
}

impl Table {
    /// Creates a table and allocates `capacity` rows up front.
    ///
    /// `relations` lists the relation components of `idents`, with one
    /// target each.
    ///
    /// # Safety
    /// `idents` must be sorted and registered in `components`.
    pub(crate) unsafe fn new(
        id: TableId,
        archetype: ArcheId,
        components: &Components,
        idents: &[ComponentId],
        relations: &[ComponentId],
        targets: &[Entity],
        capacity: usize,
    ) -> Self {
        debug_assert!(idents.is_sorted());
        debug_assert_eq!(relations.len(), targets.len());

        let capacity = capacity.max(1).next_power_of_two();
        let mut index = vec![None; MAX_COMPONENTS].into_boxed_slice();
        let columns = idents
            .iter()
            .enumerate()
            .map(|(col, &ident)| {
                index[ident.index()] = Some(TableCol(col as u8));
                let info = unsafe { components.get_unchecked(ident) };
                let mut column = unsafe { Column::new(info.layout(), info.dropper()) };
                unsafe { column.alloc(NonZeroUsize::new_unchecked(capacity)) };
                column
            })
            .collect::<Vec<_>>();

        Self {
            id,
            archetype,
            columns: columns.into_boxed_slice(),
            idents: idents.into(),
            index,
            entities: Vec::with_capacity(capacity),
            relations: relations.into(),
            targets: targets.into(),
            capacity,
            min_capacity: capacity,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[inline(always)]
    pub fn archetype(&self) -> ArcheId {
        self.archetype
    }

    /// Number of rows.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Allocated rows, always a power of two.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes reserved by the columns and the entity column.
    pub fn memory(&self) -> usize {
        let row_size = self
            .columns
            .iter()
            .map(|c| c.item_layout().size())
            .sum::<usize>()
            + size_of::<Entity>();
        row_size * self.capacity
    }

    /// The entity stored in each row.
    #[inline(always)]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The stored components, sorted by id.
    #[inline(always)]
    pub fn components(&self) -> &[ComponentId] {
        &self.idents
    }

    #[inline(always)]
    pub fn column_index(&self, id: ComponentId) -> Option<TableCol> {
        self.index[id.index()]
    }

    #[inline]
    pub fn has(&self, id: ComponentId) -> bool {
        self.column_index(id).is_some()
    }

    #[inline]
    pub fn column(&self, id: ComponentId) -> Option<&Column> {
        let col = self.column_index(id)?;
        Some(&self.columns[col.index()])
    }

    /// Returns the relation components of this table, in target order.
    #[inline]
    pub fn relations(&self) -> &[ComponentId] {
        &self.relations
    }

    /// One target per entry of [`relations`](Self::relations).
    #[inline]
    pub fn targets(&self) -> &[Entity] {
        &self.targets
    }

    /// Returns the target of relation `id`, `None` if `id` is not a
    /// relation of this table.
    pub fn target_of(&self, id: ComponentId) -> Option<Entity> {
        let slot = self.relations.iter().position(|&r| r == id)?;
        Some(self.targets[slot])
    }

    /// Returns `true` if any relation slot points at `target`.
    pub fn references(&self, target: Entity) -> bool {
        self.targets.contains(&target)
    }

    /// Returns `true` if every requested relation matches this table.
    ///
    /// [`Entity::WILDCARD`] matches any target, an empty request matches
    /// every table.
    pub fn matches(&self, relations: &[Relation]) -> bool {
        relations.iter().all(|rel| match self.target_of(rel.component) {
            Some(target) => rel.target.is_wildcard() || target == rel.target,
            None => false,
        })
    }

    /// Returns a pointer to component `id` of `row`.
    pub fn get(&self, id: ComponentId, row: usize) -> Option<Ptr<'_>> {
        if row >= self.entities.len() {
            return None;
        }
        let col = self.column_index(id)?;
        // SAFETY: the row is initialized.
        Some(unsafe { self.columns[col.index()].get(row) })
    }

    pub fn get_mut(&mut self, id: ComponentId, row: usize) -> Option<PtrMut<'_>> {
        if row >= self.entities.len() {
            return None;
        }
        let col = self.column_index(id)?;
        // SAFETY: the row is initialized.
        Some(unsafe { self.columns[col.index()].get_mut(row) })
    }

    /// Views the column of `id` as a typed slice.
    ///
    /// # Safety
    /// `T` must be the type registered under `id`.
    pub unsafe fn slice<T>(&self, id: ComponentId) -> Option<&[T]> {
        let col = self.column_index(id)?;
        Some(unsafe { self.columns[col.index()].as_slice(self.entities.len()) })
    }

    /// # Safety
    /// `T` must be the type registered under `id`.
    pub unsafe fn slice_mut<T>(&mut self, id: ComponentId) -> Option<&mut [T]> {
        let col = self.column_index(id)?;
        let len = self.entities.len();
        Some(unsafe { self.columns[col.index()].as_mut_slice(len) })
    }
}

// -----------------------------------------------------------------------------
// Row management

impl Table {
    /// Makes room for `additional` more rows.
    fn reserve(&mut self, additional: usize) {
        #[cold]
        #[inline(never)]
        fn grow(this: &mut Table, required: usize) {
            let abort_guard = AbortOnPanic("table allocation failed");

            let new_capacity = required.next_power_of_two().max(this.min_capacity);
            unsafe {
                let current = NonZeroUsize::new_unchecked(this.capacity);
                let new = NonZeroUsize::new_unchecked(new_capacity);
                this.columns
                    .iter_mut()
                    .for_each(|col| col.realloc(current, new));
            }
            this.entities
                .reserve_exact(new_capacity - this.entities.len());
            this.capacity = new_capacity;

            core::mem::forget(abort_guard);
        }

        let required = self.entities.len() + additional;
        if required > self.capacity {
            grow(self, required);
        }
    }

    /// Appends a row for `entity` and returns its index.
    ///
    /// # Safety
    /// The caller initializes every column at the returned row.
    pub(crate) unsafe fn add(&mut self, entity: Entity) -> u32 {
        self.reserve(1);
        let row = self.entities.len();
        self.entities.push(entity);
        row as u32
    }

    /// Appends one row per entity and returns the first new row.
    ///
    /// # Safety
    /// The caller initializes every column of the new rows.
    pub(crate) unsafe fn extend(&mut self, entities: &[Entity]) -> u32 {
        self.reserve(entities.len());
        let start = self.entities.len();
        self.entities.extend_from_slice(entities);
        start as u32
    }

    /// Moves a value into component `id` of an uninitialized row.
    ///
    /// # Safety
    /// - The slot must be uninitialized.
    /// - `value` must point to the type registered under `id`.
    pub(crate) unsafe fn init_item(&mut self, id: ComponentId, row: usize, value: OwningPtr<'_>) {
        debug_assert!(row < self.entities.len());
        if let Some(col) = self.column_index(id) {
            unsafe { self.columns[col.index()].init_item(row, value) }
        }
    }

    /// Writes defaults into `start..start + count` for every column not in `skip`.
    ///
    /// # Safety
    /// Those slots must be uninitialized.
    pub(crate) unsafe fn init_defaults(
        &mut self,
        components: &Components,
        skip: &Mask,
        start: usize,
        count: usize,
    ) {
        let guard = AbortOnPanic("a component default constructor panicked");
        for (&id, column) in self.idents.iter().zip(self.columns.iter_mut()) {
            if skip.get(id) {
                continue;
            }
            let default = unsafe { components.get_unchecked(id) }.default_fn();
            (start..start + count).for_each(|row| unsafe { column.init_default(row, default) });
        }
        core::mem::forget(guard);
    }

    /// Removes `row`, dropping its values, and fills the hole with the
    /// last row. The vacated slot is zero-filled.
    ///
    /// Returns the entity that now occupies `row`, if a swap happened.
    ///
    /// # Safety
    /// `row` must be within the table.
    pub(crate) unsafe fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        let last = self.entities.len() - 1;
        debug_assert!(row <= last);

        self.columns
            .iter_mut()
            .for_each(|c| unsafe { c.swap_drop(row, last) });
        self.entities.swap_remove(row);

        (row != last).then(|| self.entities[row])
    }

    /// Moves `row` into `other`, dropping values `other` has no column for.
    ///
    /// Returns the new row in `other` and the entity swapped into `row`.
    ///
    /// # Safety
    /// - `row` must be within the table.
    /// - The caller initializes the columns of `other` this table lacks.
    pub(crate) unsafe fn move_row(&mut self, row: usize, other: &mut Table) -> (u32, Option<Entity>) {
        let last = self.entities.len() - 1;
        debug_assert!(row <= last);

        let new_row = unsafe { other.add(self.entities[row]) } as usize;
        for (&id, col) in self.idents.iter().zip(self.columns.iter_mut()) {
            unsafe {
                match other.column_index(id) {
                    Some(dst) => {
                        col.move_to(&mut other.columns[dst.index()], row, new_row, 1);
                        col.swap_forget(row, last);
                    }
                    None => col.swap_drop(row, last),
                }
            }
        }
        self.entities.swap_remove(row);

        (new_row as u32, (row != last).then(|| self.entities[row]))
    }

    /// Moves every row into `other` and returns the first row they occupy.
    ///
    /// # Safety
    /// The caller initializes the columns of `other` this table lacks.
    pub(crate) unsafe fn move_all(&mut self, other: &mut Table) -> u32 {
        let count = self.entities.len();
        let start = unsafe { other.extend(&self.entities) } as usize;

        for (&id, col) in self.idents.iter().zip(self.columns.iter_mut()) {
            unsafe {
                match other.column_index(id) {
                    Some(dst) => col.move_to(&mut other.columns[dst.index()], 0, start, count),
                    None => col.drop_slice(count),
                }
                col.zero(0, count);
            }
        }
        self.entities.clear();

        start as u32
    }

    /// Drops every row, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        let len = self.entities.len();
        self.columns.iter_mut().for_each(|c| unsafe {
            c.drop_slice(len);
            c.zero(0, len);
        });
        self.entities.clear();
    }

    /// Drops every row and shrinks back to the initial capacity.
    pub(crate) fn reset(&mut self) {
        self.clear();
        if self.capacity > self.min_capacity {
            unsafe {
                let current = NonZeroUsize::new_unchecked(self.capacity);
                let new = NonZeroUsize::new_unchecked(self.min_capacity);
                self.columns
                    .iter_mut()
                    .for_each(|col| col.realloc(current, new));
            }
            self.entities.shrink_to(self.min_capacity);
            self.capacity = self.min_capacity;
        }
    }

    /// Points an empty table at a new tuple of relation targets.
    pub(crate) fn retarget(&mut self, targets: &[Entity]) {
        debug_assert!(self.entities.is_empty());
        self.targets.copy_from_slice(targets);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::archetype::ArcheId;
    use crate::component::{Component, ComponentId, Components, Mask};
    use crate::entity::Entity;
    use crate::relation::Relation;
    use crate::storage::TableId;
    use alloc::vec::Vec;

    #[derive(Default, Debug, PartialEq, Clone, Copy)]
    struct Pos(i32);
    impl Component for Pos {}

    #[derive(Default)]
    struct Tag;
    impl Component for Tag {}

    #[derive(Default)]
    struct ChildOf;
    impl Component for ChildOf {
        const RELATION: bool = true;
    }

    fn setup() -> (Components, ComponentId, ComponentId, ComponentId) {
        let mut components = Components::new();
        let pos = components.register::<Pos>().unwrap();
        let tag = components.register::<Tag>().unwrap();
        let child = components.register::<ChildOf>().unwrap();
        (components, pos, tag, child)
    }

    fn new_table(
        id: u32,
        components: &Components,
        idents: &[ComponentId],
        relations: &[ComponentId],
        targets: &[Entity],
        capacity: usize,
    ) -> Table {
        unsafe {
            Table::new(TableId::new(id), ArcheId::new(id), components, idents, relations, targets, capacity)
        }
    }

    fn push(table: &mut Table, components: &Components, entity: Entity) -> usize {
        unsafe {
            let row = table.add(entity) as usize;
            table.init_defaults(components, &Mask::EMPTY, row, 1);
            row
        }
    }

    fn pos_at(table: &Table, id: ComponentId, row: usize) -> i32 {
        unsafe { table.get(id, row).unwrap().as_ref::<Pos>().0 }
    }

    #[test]
    fn growth_keeps_power_of_two() {
        let (components, pos, tag, _) = setup();
        let mut table = new_table(1, &components, &[pos, tag], &[], &[], 3);
        assert_eq!(table.capacity(), 4);

        for i in 0..9 {
            let row = push(&mut table, &components, Entity::new(i + 2, 0));
            unsafe { table.get_mut(pos, row).unwrap().as_mut::<Pos>().0 = i as i32 };
        }
        assert_eq!(table.len(), 9);
        assert_eq!(table.capacity(), 16);
        assert!(table.capacity().is_power_of_two());
        assert_eq!(pos_at(&table, pos, 8), 8);
        assert_eq!(table.memory(), 16 * (size_of::<Pos>() + size_of::<Entity>()));

        table.reset();
        assert_eq!(table.capacity(), 4);
        assert!(table.is_empty());
    }

    #[test]
    fn swap_remove_reports_moved_entity() {
        let (components, pos, _, _) = setup();
        let mut table = new_table(1, &components, &[pos], &[], &[], 8);
        let entities: Vec<_> = (0..4).map(|i| Entity::new(i + 2, 0)).collect();
        for (i, e) in entities.iter().enumerate() {
            let row = push(&mut table, &components, *e);
            unsafe { table.get_mut(pos, row).unwrap().as_mut::<Pos>().0 = i as i32 };
        }

        let moved = unsafe { table.swap_remove(1) };
        assert_eq!(moved, Some(entities[3]));
        assert_eq!(table.len(), 3);
        assert_eq!(table.entities()[1], entities[3]);
        assert_eq!(pos_at(&table, pos, 1), 3);
        assert!(table.get(pos, 3).is_none());

        assert_eq!(unsafe { table.swap_remove(2) }, None);
        assert_eq!(table.entities(), &[entities[0], entities[3]]);
    }

    #[test]
    fn move_row_keeps_shared_columns() {
        let (components, pos, tag, _) = setup();
        let mut src = new_table(1, &components, &[pos], &[], &[], 4);
        let mut dst = new_table(2, &components, &[pos, tag], &[], &[], 4);
        let a = Entity::new(2, 0);
        let b = Entity::new(3, 0);
        for (e, v) in [(a, 10), (b, 20)] {
            let row = push(&mut src, &components, e);
            unsafe { src.get_mut(pos, row).unwrap().as_mut::<Pos>().0 = v };
        }

        let (new_row, moved) = unsafe { src.move_row(0, &mut dst) };
        unsafe { dst.init_defaults(&components, &Mask::from_ids(&[pos]), new_row as usize, 1) };
        assert_eq!(moved, Some(b));
        assert_eq!(pos_at(&dst, pos, new_row as usize), 10);
        assert_eq!(pos_at(&src, pos, 0), 20);
        assert!(dst.has(tag));
    }

    #[test]
    fn relation_matching() {
        let (components, pos, _, child) = setup();
        let parent = Entity::new(5, 0);
        let table = new_table(1, &components, &[pos, child], &[child], &[parent], 4);

        assert!(table.matches(&[]));
        assert!(table.matches(&[Relation::new(child, parent)]));
        assert!(table.matches(&[Relation::new(child, Entity::WILDCARD)]));
        assert!(!table.matches(&[Relation::new(child, Entity::new(6, 0))]));
        assert!(!table.matches(&[Relation::new(pos, parent)]));
        assert_eq!(table.target_of(child), Some(parent));
        assert!(table.references(parent));
    }
}
