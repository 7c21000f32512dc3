use crate::component::ComponentId;
use crate::entity::Entity;
use crate::query::Batch;
use crate::relation::{Relation, RelationError};
use crate::world::{World, WorldError};

impl World {
    /// Returns the target of relation `id` on `entity`.
    pub fn get_relation(&self, entity: Entity, id: ComponentId) -> Result<Entity, WorldError> {
        self.check_alive(entity)?;
        let table = unsafe { self.tables.get_unchecked(self.locations.get(entity).table) };
        if !table.has(id) {
            return Err(RelationError::NotDeclared(id).into());
        }
        table
            .target_of(id)
            .ok_or_else(|| RelationError::NotRelation(id).into())
    }

    /// Changes relation targets of `entity`, moving it to the table of the
    /// new target tuple.
    #[inline]
    pub fn set_relations(&mut self, entity: Entity, relations: &[Relation]) -> Result<(), WorldError> {
        self.exchange_inner(entity, &[], None, &[], relations)
    }

    /// Changes relation targets of every entity selected by `batch`.
    #[inline]
    pub fn set_relations_batch(
        &mut self,
        batch: &Batch<'_>,
        relations: &[Relation],
        on_each: Option<&mut dyn FnMut(Entity)>,
    ) -> Result<usize, WorldError> {
        self.exchange_batch(batch, &[], &[], relations, on_each)
    }
}

// -----------------------------------------------------------------------------
// Tests
