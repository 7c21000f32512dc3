use alloc::vec::Vec;
use core::fmt::Debug;

use strata_ptr::{Ptr, PtrMut};

use crate::component::{Component, ComponentId};
use crate::entity::Entity;
use crate::storage::{Table, TableId};
use crate::world::World;

// -----------------------------------------------------------------------------
// Query

/// A lending cursor over the rows of a set of tables.
///
/// Holds one lock bit of the world until dropped, so the tables cannot
/// change shape while rows are visited.
///
/// ```
/// use strata_ecs::component::Component;
/// use strata_ecs::query::Filter;
/// use strata_ecs::world::World;
///
/// #[derive(Default)]
/// struct Hp(u32);
/// impl Component for Hp {}
///
/// let mut world = World::new();
/// let hp = world.register_component::<Hp>().unwrap();
/// world.new_entities(3, &[hp], &[], None).unwrap();
///
/// let mut query = world.query(&Filter::new(&[hp]), &[]).unwrap();
/// while query.next() {
///     query.get_mut::<Hp>().unwrap().0 += 10;
/// }
/// drop(query);
///
/// assert!(!world.is_locked());
/// ```
pub struct Query<'w> {
    world: &'w mut World,
    bit: u8,
    tables: Vec<TableId>,
    index: usize,
    row: usize,
    current: Option<(TableId, usize)>,
}

impl Debug for Query<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Query")
            .field("bit", &self.bit)
            .field("tables", &self.tables)
            .field("current", &self.current)
            .finish()
    }
}

impl Drop for Query<'_> {
    fn drop(&mut self) {
        let unlocked = self.world.lock.unlock(self.bit);
        debug_assert!(unlocked.is_ok());
    }
}

impl<'w> Query<'w> {
    pub(crate) fn new(world: &'w mut World, bit: u8, tables: Vec<TableId>) -> Self {
        Self {
            world,
            bit,
            tables,
            index: 0,
            row: 0,
            current: None,
        }
    }

    /// Advances to the next row, returns `false` once exhausted.
    pub fn next(&mut self) -> bool {
        while let Some(&id) = self.tables.get(self.index) {
            let len = unsafe { self.world.tables.get_unchecked(id) }.len();
            if self.row < len {
                self.current = Some((id, self.row));
                self.row += 1;
                return true;
            }
            self.index += 1;
            self.row = 0;
        }
        self.current = None;
        false
    }

    /// Total number of rows, regardless of the cursor position.
    pub fn count(&self) -> usize {
        self.tables
            .iter()
            .map(|&id| unsafe { self.world.tables.get_unchecked(id) }.len())
            .sum()
    }

    /// The matched tables.
    #[inline]
    pub fn tables(&self) -> &[TableId] {
        &self.tables
    }

    #[inline]
    fn current(&self) -> Option<(&Table, usize)> {
        let (id, row) = self.current?;
        Some((unsafe { self.world.tables.get_unchecked(id) }, row))
    }

    /// The table of the current row.
    #[inline]
    pub fn table(&self) -> Option<TableId> {
        self.current.map(|(id, _)| id)
    }

    pub fn entity(&self) -> Option<Entity> {
        let (table, row) = self.current()?;
        Some(table.entities()[row])
    }

    pub fn get_raw(&self, id: ComponentId) -> Option<Ptr<'_>> {
        let (table, row) = self.current()?;
        table.get(id, row)
    }

    pub fn get_raw_mut(&mut self, id: ComponentId) -> Option<PtrMut<'_>> {
        let (table, row) = self.current?;
        unsafe { self.world.tables.get_unchecked_mut(table) }.get_mut(id, row)
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        let id = self.world.components.id_of::<T>()?;
        // SAFETY: `id` was registered for `T`.
        self.get_raw(id).map(|ptr| unsafe { ptr.as_ref::<T>() })
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let id = self.world.components.id_of::<T>()?;
        // SAFETY: `id` was registered for `T`.
        self.get_raw_mut(id).map(|ptr| unsafe { ptr.consume::<T>() })
    }

    pub fn has(&self, id: ComponentId) -> bool {
        self.current().is_some_and(|(table, _)| table.has(id))
    }

    /// The target of relation `id` for the current row.
    pub fn relation(&self, id: ComponentId) -> Option<Entity> {
        self.current()?.0.target_of(id)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::entity::Entity;
    use crate::query::Filter;
    use crate::relation::Relation;
    use crate::world::{World, WorldError};
    use alloc::vec::Vec;

    #[derive(Default, Debug, PartialEq)]
    struct Score(u32);
    impl Component for Score {}

    #[derive(Default)]
    struct Team;
    impl Component for Team {
        const RELATION: bool = true;
    }

    #[test]
    fn visits_every_row_once() {
        let mut world = World::new();
        let score = world.register_component::<Score>().unwrap();
        let team = world.register_component::<Team>().unwrap();
        let red = world.new_entity(&[], &[]).unwrap();
        let blue = world.new_entity(&[], &[]).unwrap();
        world.new_entities(3, &[score, team], &[Relation::new(team, red)], None).unwrap();
        world.new_entities(2, &[score, team], &[Relation::new(team, blue)], None).unwrap();
        world.new_entities(4, &[score], &[], None).unwrap();

        let mut query = world.query(&Filter::new(&[score]), &[]).unwrap();
        assert_eq!(query.count(), 9);
        let mut seen = Vec::new();
        while query.next() {
            seen.push(query.entity().unwrap());
            query.get_mut::<Score>().unwrap().0 += 1;
        }
        assert!(!query.next());
        assert_eq!(query.entity(), None);
        drop(query);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 9);

        let mut query = world.query(&Filter::new(&[team]), &[Relation::new(team, blue)]).unwrap();
        let mut rows = 0;
        while query.next() {
            assert_eq!(query.relation(team), Some(blue));
            assert_eq!(query.get::<Score>(), Some(&Score(1)));
            assert!(query.has(score));
            rows += 1;
        }
        assert_eq!(rows, 2);
    }

    #[test]
    fn world_is_locked_while_querying() {
        let mut world = World::new();
        let score = world.register_component::<Score>().unwrap();
        world.new_entity(&[score], &[]).unwrap();

        let query = world.query(&Filter::new(&[score]), &[]).unwrap();
        let bit = query.world.lock.held();
        assert_eq!(bit, 1);
        drop(query);

        let held = world.lock().unwrap();
        assert_eq!(world.new_entity(&[score], &[]), Err(WorldError::Locked));
        assert_eq!(world.remove_entity(Entity::ZERO), Err(WorldError::Locked));
        world.unlock(held).unwrap();
        assert!(world.new_entity(&[score], &[]).is_ok());
    }
}
