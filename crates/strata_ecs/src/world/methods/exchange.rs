use alloc::vec::Vec;

use super::arche::targets_changed;
use crate::component::{ComponentBuffer, ComponentId};
use crate::entity::Entity;
use crate::query::Batch;
use crate::relation::Relation;
use crate::storage::TableId;
use crate::world::event::kind_of;
use crate::world::{EntityEvent, EventKind, World, WorldError};

impl World {
    /// Adds the default values of `add`, drops the values of `remove` and
    /// applies `relations`, moving the entity to its new table.
    ///
    /// Nothing changes if any part of the transition is invalid.
    pub fn exchange(
        &mut self,
        entity: Entity,
        add: &[ComponentId],
        remove: &[ComponentId],
        relations: &[Relation],
    ) -> Result<(), WorldError> {
        self.exchange_inner(entity, add, None, remove, relations)
    }

    /// Like [`exchange`](Self::exchange), with the added components taken
    /// from `values`.
    pub fn exchange_with(
        &mut self,
        entity: Entity,
        mut values: ComponentBuffer,
        remove: &[ComponentId],
        relations: &[Relation],
    ) -> Result<(), WorldError> {
        values.check(&self.components)?;
        let add: Vec<ComponentId> = values.ids().into();
        self.exchange_inner(entity, &add, Some(&mut values), remove, relations)
    }

    /// Adds default values of `ids`.
    #[inline]
    pub fn add(&mut self, entity: Entity, ids: &[ComponentId]) -> Result<(), WorldError> {
        self.exchange_inner(entity, ids, None, &[], &[])
    }

    /// Drops the values of `ids`.
    #[inline]
    pub fn remove(&mut self, entity: Entity, ids: &[ComponentId]) -> Result<(), WorldError> {
        self.exchange_inner(entity, &[], None, ids, &[])
    }

    pub(crate) fn exchange_inner(
        &mut self,
        entity: Entity,
        add: &[ComponentId],
        values: Option<&mut ComponentBuffer>,
        remove: &[ComponentId],
        relations: &[Relation],
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        self.check_alive(entity)?;
        self.components.check(add)?;
        self.components.check(remove)?;

        let src = self.locations.get(entity).table;
        let src_arche = unsafe { self.tables.get_unchecked(src) }.archetype();
        let start = unsafe { self.archetypes.get_unchecked(src_arche) }.node();

        let node = self.graph.find(start, add, remove)?;
        let arche = self.archetype_of(node);
        let targets = self.resolve_targets(arche, Some(unsafe { self.tables.get_unchecked(src) }), relations)?;
        let dst = self.table_for(arche, &targets);
        if dst == src {
            return Ok(());
        }

        let old_mask = *self.table_mask(src);
        let new_mask = *self.table_mask(dst);
        let mut kind = kind_of(&old_mask, &new_mask);
        let (src_table, dst_table) = unsafe { self.tables.get2_mut(src, dst) };
        if targets_changed(src_table, dst_table) {
            kind |= EventKind::RELATION_CHANGED;
        }

        unsafe {
            let row = self.move_entity(entity, dst) as usize;
            let table = self.tables.get_unchecked_mut(dst);
            let mut filled = old_mask;
            if let Some(values) = values {
                filled = filled.union(values.mask());
                values.take(|id, value| table.init_item(id, row, value));
            }
            table.init_defaults(&self.components, &filled, row, 1);
        }
        log::trace!("moved {entity} from table {src} to {dst}");

        self.notify(
            &[EntityEvent {
                entity,
                old_mask,
                new_mask,
                kind,
            }],
            None,
        )
    }

    /// Applies one exchange to every entity selected by `batch`.
    ///
    /// Destinations are resolved once per source table and validated before
    /// any entity moves; whole tables are then moved at once. `on_each` sees
    /// every moved entity, with the world locked. Returns the number of
    /// moved entities.
    pub fn exchange_batch(
        &mut self,
        batch: &Batch<'_>,
        add: &[ComponentId],
        remove: &[ComponentId],
        relations: &[Relation],
        on_each: Option<&mut dyn FnMut(Entity)>,
    ) -> Result<usize, WorldError> {
        self.check_unlocked()?;
        self.components.check(add)?;
        self.components.check(remove)?;

        let sources = self.matching_tables(batch.filter(), batch.targets())?;
        let mut plan: Vec<(TableId, TableId)> = Vec::with_capacity(sources.len());
        for src in sources {
            let table = unsafe { self.tables.get_unchecked(src) };
            if table.is_empty() {
                continue;
            }
            let start = unsafe { self.archetypes.get_unchecked(table.archetype()) }.node();
            let node = self.graph.find(start, add, remove)?;
            let arche = self.archetype_of(node);
            let targets = self.resolve_targets(arche, Some(unsafe { self.tables.get_unchecked(src) }), relations)?;
            let dst = self.table_for(arche, &targets);
            if dst != src {
                plan.push((src, dst));
            }
        }

        let listening = on_each.is_some() || self.listener.is_some();
        let mut events = Vec::new();
        let mut moved = 0;
        for (src, dst) in plan {
            let old_mask = *self.table_mask(src);
            let new_mask = *self.table_mask(dst);
            let (src_table, dst_table) = unsafe { self.tables.get2_mut(src, dst) };
            let count = src_table.len();
            if count == 0 {
                continue;
            }

            let mut kind = kind_of(&old_mask, &new_mask);
            if targets_changed(src_table, dst_table) {
                kind |= EventKind::RELATION_CHANGED;
            }

            let start = unsafe {
                let start = src_table.move_all(dst_table) as usize;
                dst_table.init_defaults(&self.components, &old_mask, start, count);
                start
            };
            let entities = &dst_table.entities()[start..start + count];
            self.locations.set_range(entities, dst, start as u32);
            if listening {
                events.extend(entities.iter().map(|&entity| EntityEvent {
                    entity,
                    old_mask,
                    new_mask,
                    kind,
                }));
            }
            log::trace!("moved {count} rows from table {src} to {dst}");
            moved += count;
        }

        self.notify(&events, on_each)?;
        Ok(moved)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::component::{Component, ComponentBuffer};
    use crate::graph::TransitionError;
    use crate::query::{Batch, Filter};
    use crate::world::{World, WorldError};
    use alloc::string::String;

    #[derive(Default, Debug, PartialEq)]
    struct A(i32);
    impl Component for A {}

    #[derive(Default, Debug, PartialEq)]
    struct B(String);
    impl Component for B {}

    #[derive(Default, Debug, PartialEq)]
    struct C(u8);
    impl Component for C {}

    #[test]
    fn values_survive_the_move() {
        let mut world = World::new();
        let a = world.register_component::<A>().unwrap();

        let mut values = ComponentBuffer::new();
        values.push(&mut world, A(1)).unwrap();
        let e = world.new_entity_with(values, &[]).unwrap();

        let mut values = ComponentBuffer::new();
        values.push(&mut world, B("two".into())).unwrap();
        world.exchange_with(e, values, &[], &[]).unwrap();
        assert_eq!(world.get::<A>(e).unwrap(), Some(&A(1)));
        assert_eq!(world.get::<B>(e).unwrap(), Some(&B("two".into())));

        world.remove(e, &[a]).unwrap();
        assert_eq!(world.has::<A>(e), Ok(false));
        assert_eq!(world.get::<B>(e).unwrap(), Some(&B("two".into())));
    }

    #[test]
    fn invalid_exchange_changes_nothing() {
        let mut world = World::new();
        let a = world.register_component::<A>().unwrap();
        let b = world.register_component::<B>().unwrap();
        let e = world.new_entity(&[a], &[]).unwrap();
        let location = world.locations.get(e);

        assert_eq!(
            world.exchange(e, &[b], &[b], &[]),
            Err(WorldError::Transition(TransitionError::AddAndRemove(b)))
        );
        assert_eq!(
            world.exchange(e, &[a], &[], &[]),
            Err(WorldError::Transition(TransitionError::AlreadyPresent(a)))
        );
        assert_eq!(
            world.remove(e, &[b]),
            Err(WorldError::Transition(TransitionError::NotPresent(b)))
        );
        assert_eq!(world.locations.get(e), location);
    }

    #[test]
    fn swapped_row_location_is_fixed() {
        let mut world = World::new();
        let a = world.register_component::<A>().unwrap();
        let c = world.register_component::<C>().unwrap();
        let first = world.new_entity(&[a], &[]).unwrap();
        let _second = world.new_entity(&[a], &[]).unwrap();
        let last = world.new_entity(&[a], &[]).unwrap();
        world.get_mut::<A>(last).unwrap().unwrap().0 = 9;

        world.add(first, &[c]).unwrap();
        assert_eq!(world.locations.get(last).row, 0);
        assert_eq!(world.get::<A>(last).unwrap(), Some(&A(9)));
        assert_eq!(world.get::<C>(first).unwrap(), Some(&C(0)));
    }

    #[test]
    fn batch_exchange_moves_whole_tables() {
        let mut world = World::new();
        let a = world.register_component::<A>().unwrap();
        let b = world.register_component::<B>().unwrap();
        let c = world.register_component::<C>().unwrap();
        world.new_entities(10, &[a], &[], None).unwrap();
        world.new_entities(5, &[a, b], &[], None).unwrap();
        world.new_entities(3, &[b], &[], None).unwrap();

        let filter = Filter::new(&[a]);
        let moved = world.exchange_batch(&Batch::new(&filter), &[c], &[], &[], None).unwrap();
        assert_eq!(moved, 15);

        let with_c = Filter::new(&[c]);
        let tables = world.matching_tables(&with_c, &[]).unwrap();
        let rows: usize = tables.iter().map(|&t| world.table(t).unwrap().len()).sum();
        assert_eq!(rows, 15);

        // Adding `c` again fails for every table before anything moves.
        let err = world.exchange_batch(&Batch::new(&filter), &[c], &[], &[], None);
        assert_eq!(err, Err(WorldError::Transition(TransitionError::AlreadyPresent(c))));
        assert_eq!(world.exchange_batch(&Batch::new(&with_c), &[], &[c], &[], None), Ok(15));
    }
}
