use alloc::vec::Vec;

use crate::entity::Entity;
use crate::storage::TableId;

// -----------------------------------------------------------------------------
// EntityLocation

/// Where the components of an alive entity are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub table: TableId,
    pub row: u32,
}

impl EntityLocation {
    /// Placeholder for slots without an alive entity.
    pub const INVALID: Self = Self {
        table: TableId::EMPTY,
        row: u32::MAX,
    };
}

// -----------------------------------------------------------------------------
// Locations

/// Entity id to location index, kept in step with every row move.
#[derive(Debug, Default)]
pub(crate) struct Locations(Vec<EntityLocation>);

impl Locations {
    #[inline]
    pub fn get(&self, entity: Entity) -> EntityLocation {
        self.0
            .get(entity.index())
            .copied()
            .unwrap_or(EntityLocation::INVALID)
    }

    pub fn set(&mut self, entity: Entity, location: EntityLocation) {
        let index = entity.index();
        if index >= self.0.len() {
            self.0.resize(index + 1, EntityLocation::INVALID);
        }
        self.0[index] = location;
    }

    /// Updates the row of an entity that was moved inside its table.
    #[inline]
    pub fn set_row(&mut self, entity: Entity, row: u32) {
        if let Some(location) = self.0.get_mut(entity.index()) {
            location.row = row;
        }
    }

    /// Updates `entities[i]` to `table`, row `start + i`.
    pub fn set_range(&mut self, entities: &[Entity], table: TableId, start: u32) {
        for (offset, entity) in entities.iter().enumerate() {
            self.set(
                *entity,
                EntityLocation {
                    table,
                    row: start + offset as u32,
                },
            );
        }
    }

    pub fn invalidate(&mut self, entity: Entity) {
        if let Some(location) = self.0.get_mut(entity.index()) {
            *location = EntityLocation::INVALID;
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
