use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::archetype::{ArcheId, Archetype};
use crate::component::ComponentId;
use crate::entity::{Entity, EntityError};
use crate::graph::NodeId;
use crate::relation::{Relation, RelationError};
use crate::storage::{Table, TableId};
use crate::world::{World, WorldError};

impl World {
    /// Returns the archetype of a graph node, creating it if needed.
    pub(crate) fn archetype_of(&mut self, node: NodeId) -> ArcheId {
        #[cold]
        #[inline(never)]
        fn create(world: &mut World, node: NodeId) -> ArcheId {
            let mask = *unsafe { world.graph.get_unchecked(node) }.mask();
            let components: Box<[ComponentId]> = mask.iter().collect();
            let relations: Box<[ComponentId]> = mask.intersection(world.components.relations()).iter().collect();

            let id = world.archetypes.next_id();
            log::debug!("new archetype {id}: {mask:?}");
            world.archetypes.push(Archetype::new(id, node, mask, components, relations));
            world.graph.set_archetype(node, id);
            id
        }

        match unsafe { self.graph.get_unchecked(node) }.archetype() {
            Some(id) => id,
            None => create(self, node),
        }
    }

    /// Computes the relation targets of a row moving into `arche`.
    ///
    /// Each slot takes the last requested target for its component, else
    /// the target in `src`, else [`Entity::ZERO`].
    pub(crate) fn resolve_targets(
        &self,
        arche: ArcheId,
        src: Option<&Table>,
        relations: &[Relation],
    ) -> Result<Vec<Entity>, WorldError> {
        let arche = unsafe { self.archetypes.get_unchecked(arche) };
        let mut targets: Vec<Entity> = arche
            .relations()
            .iter()
            .map(|&comp| src.and_then(|table| table.target_of(comp)).unwrap_or(Entity::ZERO))
            .collect();

        for rel in relations {
            let Some(slot) = arche.relation_slot(rel.component) else {
                return Err(if arche.mask().get(rel.component) {
                    RelationError::NotRelation(rel.component).into()
                } else {
                    RelationError::NotDeclared(rel.component).into()
                });
            };
            if !rel.target.is_zero() && !self.entities.alive(rel.target) {
                return Err(EntityError::NotAlive(rel.target).into());
            }
            targets[slot] = rel.target;
        }
        Ok(targets)
    }

    /// Returns the active table of `arche` for `targets`, creating or
    /// recycling one if needed.
    pub(crate) fn table_for(&mut self, arche: ArcheId, targets: &[Entity]) -> TableId {
        match unsafe { self.archetypes.get_unchecked(arche) }.table_for(targets) {
            Some(id) => id,
            None => self.create_table(arche, targets),
        }
    }

    #[cold]
    #[inline(never)]
    fn create_table(&mut self, arche_id: ArcheId, targets: &[Entity]) -> TableId {
        let arche = unsafe { self.archetypes.get_unchecked_mut(arche_id) };

        let id = match arche.pop_free() {
            Some(id) => {
                unsafe { self.tables.get_unchecked_mut(id) }.retarget(targets);
                log::debug!("reused table {id} of archetype {arche_id} for {targets:?}");
                id
            }
            None => {
                let capacity = if arche.has_relations() {
                    self.config.relation_capacity()
                } else {
                    self.config.initial_capacity()
                };
                let id = self.tables.next_id();
                let table = unsafe {
                    Table::new(
                        id,
                        arche_id,
                        &self.components,
                        arche.components(),
                        arche.relations(),
                        targets,
                        capacity,
                    )
                };
                self.tables.push(table);
                log::debug!("new table {id} of archetype {arche_id} for {targets:?}");
                id
            }
        };

        arche.insert_table(targets, id);
        for target in targets.iter().filter(|t| !t.is_zero()) {
            self.targets.grow_and_insert(target.index());
        }
        let table = unsafe { self.tables.get_unchecked(id) };
        self.filters.on_table_added(table, arche.mask());
        id
    }

    /// Detaches a table from its archetype and from every cached filter.
    pub(crate) fn deactivate_table(&mut self, id: TableId) {
        let table = unsafe { self.tables.get_unchecked(id) };
        debug_assert!(table.is_empty());
        let arche = unsafe { self.archetypes.get_unchecked_mut(table.archetype()) };
        self.filters.on_table_removed(table, arche.mask());
        arche.deactivate(table.targets(), id);
        log::debug!("deactivated table {id}");
    }

    /// Moves `entity` out of its table into `dst` and fixes every location.
    ///
    /// # Safety
    /// - `entity` must be alive and `dst` must differ from its table.
    /// - The caller initializes the columns of `dst` the source lacks.
    pub(crate) unsafe fn move_entity(&mut self, entity: Entity, dst: TableId) -> u32 {
        let location = self.locations.get(entity);
        debug_assert_ne!(location.table, dst);

        let (src, dst_table) = unsafe { self.tables.get2_mut(location.table, dst) };
        let (row, moved) = unsafe { src.move_row(location.row as usize, dst_table) };
        if let Some(moved) = moved {
            self.locations.set_row(moved, location.row);
        }
        self.locations.set_range(&[entity], dst, row);
        row
    }
}

/// Returns `true` if a row moving from `src` to `dst` changes a target.
pub(crate) fn targets_changed(src: &Table, dst: &Table) -> bool {
    dst.relations()
        .iter()
        .zip(dst.targets())
        .any(|(&comp, &target)| src.target_of(comp).unwrap_or(Entity::ZERO) != target)
}
