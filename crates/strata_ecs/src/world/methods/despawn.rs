use alloc::vec::Vec;

use crate::component::Mask;
use crate::entity::Entity;
use crate::query::Batch;
use crate::storage::TableId;
use crate::world::event::kind_of;
use crate::world::{EntityEvent, EventKind, World, WorldError};

impl World {
    /// Removes an entity and drops its values.
    ///
    /// Entities holding `entity` as a relation target keep their data; the
    /// target is reset to [`Entity::ZERO`].
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), WorldError> {
        self.check_unlocked()?;
        self.check_alive(entity)?;

        let location = self.locations.get(entity);
        let old_mask = *self.table_mask(location.table);
        let table = unsafe { self.tables.get_unchecked_mut(location.table) };
        if let Some(moved) = unsafe { table.swap_remove(location.row as usize) } {
            self.locations.set_row(moved, location.row);
        }
        self.locations.invalidate(entity);
        self.entities.recycle(entity)?;

        self.notify(
            &[EntityEvent {
                entity,
                old_mask,
                new_mask: Mask::EMPTY,
                kind: EventKind::ENTITY_REMOVED | kind_of(&old_mask, &Mask::EMPTY),
            }],
            None,
        )?;

        if self.targets.contains(entity.index()) {
            self.clear_target(entity)?;
        }
        Ok(())
    }

    /// Removes every entity selected by `batch`.
    ///
    /// `on_each` sees the entities before they are removed, with the world
    /// locked. Returns the number of removed entities.
    pub fn remove_entities(
        &mut self,
        batch: &Batch<'_>,
        on_each: Option<&mut dyn FnMut(Entity)>,
    ) -> Result<usize, WorldError> {
        self.check_unlocked()?;
        let tables = self.matching_tables(batch.filter(), batch.targets())?;

        if on_each.is_some() || self.listener.is_some() {
            let mut events = Vec::new();
            for &id in tables.iter() {
                let old_mask = *self.table_mask(id);
                let kind = EventKind::ENTITY_REMOVED | kind_of(&old_mask, &Mask::EMPTY);
                let table = unsafe { self.tables.get_unchecked(id) };
                events.extend(table.entities().iter().map(|&entity| EntityEvent {
                    entity,
                    old_mask,
                    new_mask: Mask::EMPTY,
                    kind,
                }));
            }
            self.notify(&events, on_each)?;
        }

        let mut removed = 0;
        let mut cleared = Vec::new();
        for id in tables {
            let table = unsafe { self.tables.get_unchecked_mut(id) };
            for &entity in table.entities() {
                self.locations.invalidate(entity);
                let recycled = self.entities.recycle(entity);
                debug_assert!(recycled.is_ok());
                if self.targets.contains(entity.index()) {
                    cleared.push(entity);
                }
            }
            removed += table.len();
            table.clear();
        }

        for target in cleared {
            self.clear_target(target)?;
        }
        Ok(removed)
    }

    /// Resets every relation slot pointing at a removed entity.
    ///
    /// Rows of each referencing table move to the table with the slot set
    /// to [`Entity::ZERO`], then the emptied table is deactivated.
    fn clear_target(&mut self, target: Entity) -> Result<(), WorldError> {
        self.targets.set(target.index(), false);

        let referencing: Vec<TableId> = self
            .archetypes
            .iter()
            .filter(|arche| arche.has_relations())
            .flat_map(|arche| arche.tables().iter().copied())
            .filter(|&id| unsafe { self.tables.get_unchecked(id) }.references(target))
            .collect();

        let listening = self.listener.is_some();
        let mut events = Vec::new();
        for src in referencing {
            let table = unsafe { self.tables.get_unchecked(src) };
            let arche = table.archetype();
            let targets: Vec<Entity> = table
                .targets()
                .iter()
                .map(|&t| if t == target { Entity::ZERO } else { t })
                .collect();

            let dst = self.table_for(arche, &targets);
            let mask = *self.table_mask(src);
            let (src_table, dst_table) = unsafe { self.tables.get2_mut(src, dst) };
            let count = src_table.len();
            let start = unsafe { src_table.move_all(dst_table) };
            let entities = &dst_table.entities()[start as usize..start as usize + count];
            self.locations.set_range(entities, dst, start);
            if listening {
                events.extend(entities.iter().map(|&entity| EntityEvent {
                    entity,
                    old_mask: mask,
                    new_mask: mask,
                    kind: EventKind::RELATION_CHANGED | EventKind::TARGET_REMOVED,
                }));
            }

            self.deactivate_table(src);
        }

        log::debug!("cleared relation target {target}");
        self.notify(&events, None)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::entity::{Entity, EntityError};
    use crate::query::{Batch, Filter};
    use crate::relation::Relation;
    use crate::world::{World, WorldError};
    use alloc::vec::Vec;

    #[derive(Default, Debug, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Default)]
    struct ChildOf;
    impl Component for ChildOf {
        const RELATION: bool = true;
    }

    #[test]
    fn removed_entities_are_dead() {
        let mut world = World::new();
        let health = world.register_component::<Health>().unwrap();
        let a = world.new_entity(&[health], &[]).unwrap();
        let b = world.new_entity(&[health], &[]).unwrap();

        world.remove_entity(a).unwrap();
        assert!(!world.alive(a));
        assert_eq!(world.remove_entity(a), Err(WorldError::Entity(EntityError::NotAlive(a))));
        assert_eq!(world.locations.get(b).row, 0);

        let c = world.new_entity(&[health], &[]).unwrap();
        assert_eq!(c.id(), a.id());
        assert_ne!(c, a);
        assert!(!world.alive(a));
    }

    #[test]
    fn batch_removal_clears_targets() {
        let mut world = World::new();
        let health = world.register_component::<Health>().unwrap();
        let child_of = world.register_component::<ChildOf>().unwrap();

        let parents: Vec<Entity> = (0..3).map(|_| world.new_entity(&[health], &[]).unwrap()).collect();
        let children: Vec<Entity> = parents
            .iter()
            .map(|&p| world.new_entity(&[child_of], &[Relation::new(child_of, p)]).unwrap())
            .collect();

        let filter = Filter::new(&[health]);
        let mut seen = 0;
        let removed = world
            .remove_entities(&Batch::new(&filter), Some(&mut |_: Entity| seen += 1))
            .unwrap();
        assert_eq!((removed, seen), (3, 3));

        for child in children {
            assert!(world.alive(child));
            assert_eq!(world.get_relation(child, child_of), Ok(Entity::ZERO));
        }
        let zero = Filter::new(&[child_of]);
        let tables = world.matching_tables(&zero, &[Relation::new(child_of, Entity::ZERO)]).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(world.table(tables[0]).unwrap().len(), 3);
    }
}
