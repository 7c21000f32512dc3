use alloc::boxed::Box;

use bitflags::bitflags;

use crate::component::Mask;
use crate::entity::Entity;

bitflags! {
    /// What happened to an entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKind: u8 {
        const ENTITY_CREATED     = 1 << 0;
        const ENTITY_REMOVED     = 1 << 1;
        const COMPONENTS_ADDED   = 1 << 2;
        const COMPONENTS_REMOVED = 1 << 3;
        /// A relation target of the entity changed.
        const RELATION_CHANGED   = 1 << 4;
        /// Set with `RELATION_CHANGED` when the old target was removed.
        const TARGET_REMOVED     = 1 << 5;
    }
}

// -----------------------------------------------------------------------------
// EntityEvent

/// A structural change of one entity, with its mask before and after.
///
/// Observers match their predicates against the two masks; the world
/// itself attaches no meaning to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEvent {
    pub entity: Entity,
    pub old_mask: Mask,
    pub new_mask: Mask,
    pub kind: EventKind,
}

impl EntityEvent {
    /// Components the entity gained.
    #[inline]
    pub fn added(&self) -> Mask {
        self.new_mask.difference(&self.old_mask)
    }

    /// Components the entity lost.
    #[inline]
    pub fn removed(&self) -> Mask {
        self.old_mask.difference(&self.new_mask)
    }

    #[inline]
    pub fn relation_changed(&self) -> bool {
        self.kind.contains(EventKind::RELATION_CHANGED)
    }
}

/// Receives every [`EntityEvent`] of a world.
pub type Listener = Box<dyn FnMut(&EntityEvent)>;

/// Derives the event kind of a mask change.
pub(crate) fn kind_of(old: &Mask, new: &Mask) -> EventKind {
    let mut kind = EventKind::empty();
    kind.set(EventKind::COMPONENTS_ADDED, !new.difference(old).is_zero());
    kind.set(EventKind::COMPONENTS_REMOVED, !old.difference(new).is_zero());
    kind
}
