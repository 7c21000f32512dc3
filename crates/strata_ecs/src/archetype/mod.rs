//! Archetypes: one per distinct component mask that has storage.

// -----------------------------------------------------------------------------
// Modules

mod ident;
mod info;

// -----------------------------------------------------------------------------
// Exports

pub use ident::ArcheId;
pub use info::Archetype;

// -----------------------------------------------------------------------------
// Archetypes

use alloc::vec::Vec;
use core::fmt::Debug;

/// Arena of every archetype in a world, indexed by [`ArcheId`].
///
/// Always holds [`ArcheId::EMPTY`], the archetype without components.
pub struct Archetypes {
    arches: Vec<Archetype>,
}

impl Debug for Archetypes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.arches, f)
    }
}

impl Archetypes {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self { arches: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arches.len()
    }

    /// The id the next pushed archetype will receive.
    #[inline]
    pub(crate) fn next_id(&self) -> ArcheId {
        ArcheId::new(self.arches.len() as u32)
    }

    #[inline(always)]
    pub fn get(&self, id: ArcheId) -> Option<&Archetype> {
        self.arches.get(id.index())
    }

    /// # Safety
    /// `id` must come from this arena.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, id: ArcheId) -> &Archetype {
        debug_assert!(id.index() < self.arches.len());
        unsafe { self.arches.get_unchecked(id.index()) }
    }

    /// # Safety
    /// `id` must come from this arena.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked_mut(&mut self, id: ArcheId) -> &mut Archetype {
        debug_assert!(id.index() < self.arches.len());
        unsafe { self.arches.get_unchecked_mut(id.index()) }
    }

    pub(crate) fn push(&mut self, arche: Archetype) -> ArcheId {
        debug_assert_eq!(arche.id(), self.next_id());
        let id = arche.id();
        self.arches.push(arche);
        id
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Archetype> {
        self.arches.iter()
    }

    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.arches.truncate(len);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ArcheId, Archetype, Archetypes};
    use crate::component::{ComponentId, Mask};
    use crate::entity::Entity;
    use crate::graph::NodeId;
    use crate::storage::TableId;

    #[test]
    fn relation_tables_are_recycled() {
        let pos = ComponentId::new(0);
        let child = ComponentId::new(1);
        let mut arches = Archetypes::new();
        let id = arches.next_id();
        arches.push(Archetype::new(
            id,
            NodeId::ROOT,
            Mask::from_ids(&[pos, child]),
            [pos, child].into(),
            [child].into(),
        ));

        let parent = Entity::new(4, 0);
        let arche = unsafe { arches.get_unchecked_mut(id) };
        assert!(arche.has_relations());
        assert_eq!(arche.relation_slot(child), Some(0));
        assert_eq!(arche.relation_slot(pos), None);

        arche.insert_table(&[parent], TableId::new(3));
        assert_eq!(arche.table_for(&[parent]), Some(TableId::new(3)));

        arche.deactivate(&[parent], TableId::new(3));
        assert!(arche.tables().is_empty());
        assert_eq!(arche.table_for(&[parent]), None);
        assert_eq!(arche.pop_free(), Some(TableId::new(3)));
        assert_eq!(arche.pop_free(), None);
        assert_eq!(arches.get(ArcheId::EMPTY).map(Archetype::id), Some(ArcheId::EMPTY));
    }
}
