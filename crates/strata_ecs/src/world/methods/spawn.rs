use alloc::vec::Vec;

use crate::component::{ComponentBuffer, ComponentId, Mask};
use crate::entity::{Entity, EntityLocation};
use crate::graph::NodeId;
use crate::relation::Relation;
use crate::storage::TableId;
use crate::world::event::kind_of;
use crate::world::{EntityEvent, EventKind, World, WorldError};

impl World {
    /// Creates an entity holding the default value of each component in `ids`.
    pub fn new_entity(&mut self, ids: &[ComponentId], relations: &[Relation]) -> Result<Entity, WorldError> {
        let table_id = self.spawn_table(ids, relations)?;

        let entity = self.entities.get();
        let table = unsafe { self.tables.get_unchecked_mut(table_id) };
        let row = unsafe {
            let row = table.add(entity);
            table.init_defaults(&self.components, &Mask::EMPTY, row as usize, 1);
            row
        };
        self.locations.set(entity, EntityLocation { table: table_id, row });

        self.emit_created(entity, table_id)?;
        Ok(entity)
    }

    /// Creates an entity from the values in `values`.
    ///
    /// ```
    /// use strata_ecs::component::{Component, ComponentBuffer};
    /// use strata_ecs::world::World;
    ///
    /// #[derive(Default, Debug, PartialEq)]
    /// struct Name(&'static str);
    /// impl Component for Name {}
    ///
    /// let mut world = World::new();
    /// let mut values = ComponentBuffer::new();
    /// values.push(&mut world, Name("crate")).unwrap();
    ///
    /// let entity = world.new_entity_with(values, &[]).unwrap();
    /// assert_eq!(world.get::<Name>(entity).unwrap(), Some(&Name("crate")));
    /// ```
    pub fn new_entity_with(
        &mut self,
        mut values: ComponentBuffer,
        relations: &[Relation],
    ) -> Result<Entity, WorldError> {
        values.check(&self.components)?;
        let table_id = self.spawn_table(values.ids(), relations)?;

        let entity = self.entities.get();
        let table = unsafe { self.tables.get_unchecked_mut(table_id) };
        let row = unsafe {
            let row = table.add(entity);
            values.take(|id, value| table.init_item(id, row as usize, value));
            row
        };
        self.locations.set(entity, EntityLocation { table: table_id, row });

        self.emit_created(entity, table_id)?;
        Ok(entity)
    }

    /// Creates `count` entities holding default values, in one table.
    ///
    /// Returns the table and the row of the first new entity; the others
    /// follow contiguously. `on_each` sees every new entity, with the world
    /// locked.
    pub fn new_entities(
        &mut self,
        count: usize,
        ids: &[ComponentId],
        relations: &[Relation],
        on_each: Option<&mut dyn FnMut(Entity)>,
    ) -> Result<(TableId, u32), WorldError> {
        let table_id = self.spawn_table(ids, relations)?;

        let entities: Vec<Entity> = (0..count).map(|_| self.entities.get()).collect();
        let table = unsafe { self.tables.get_unchecked_mut(table_id) };
        let start = unsafe {
            let start = table.extend(&entities);
            table.init_defaults(&self.components, &Mask::EMPTY, start as usize, count);
            start
        };
        self.locations.set_range(&entities, table_id, start);

        if on_each.is_some() || self.listener.is_some() {
            let mask = *self.table_mask(table_id);
            let events: Vec<_> = entities
                .iter()
                .map(|&entity| EntityEvent {
                    entity,
                    old_mask: Mask::EMPTY,
                    new_mask: mask,
                    kind: EventKind::ENTITY_CREATED | kind_of(&Mask::EMPTY, &mask),
                })
                .collect();
            self.notify(&events, on_each)?;
        }
        Ok((table_id, start))
    }

    /// Resolves and validates the table new entities go to.
    fn spawn_table(&mut self, ids: &[ComponentId], relations: &[Relation]) -> Result<TableId, WorldError> {
        self.check_unlocked()?;
        self.components.check(ids)?;

        let node = self.graph.find(NodeId::ROOT, ids, &[])?;
        let arche = self.archetype_of(node);
        let targets = self.resolve_targets(arche, None, relations)?;
        Ok(self.table_for(arche, &targets))
    }

    fn emit_created(&mut self, entity: Entity, table: TableId) -> Result<(), WorldError> {
        if self.listener.is_none() {
            return Ok(());
        }
        let mask = *self.table_mask(table);
        let mut kind = EventKind::ENTITY_CREATED | kind_of(&Mask::EMPTY, &mask);
        let table = unsafe { self.tables.get_unchecked(table) };
        if table.targets().iter().any(|t| !t.is_zero()) {
            kind |= EventKind::RELATION_CHANGED;
        }
        self.notify(
            &[EntityEvent {
                entity,
                old_mask: Mask::EMPTY,
                new_mask: mask,
                kind,
            }],
            None,
        )
    }
}

// -----------------------------------------------------------------------------
// Tests
