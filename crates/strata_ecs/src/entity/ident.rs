use core::fmt::{Debug, Display};

// -----------------------------------------------------------------------------
// Entity

/// A lightweight `(id, generation)` handle for one logical record.
///
/// The `id` indexes a slot of the [`EntityPool`], the `generation` tells
/// apart successive occupants of that slot. Ids `0` and `1` are reserved:
///
/// - [`Entity::ZERO`] means "no entity", e.g. an unset relation target.
/// - [`Entity::WILDCARD`] matches any target in relation queries.
///
/// Neither is ever alive.
///
/// # Aliasing
///
/// Generations are `u32` and wrap after ~4 billion recycles of one slot.
/// A handle that old may then compare equal to a newer entity.
///
/// [`EntityPool`]: crate::entity::EntityPool
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: u32,
    generation: u32,
}

impl Entity {
    /// The null entity, also used as "no relation target".
    pub const ZERO: Entity = Entity::new(0, 0);

    /// Placeholder matching any relation target in queries.
    pub const WILDCARD: Entity = Entity::new(1, 0);

    /// Number of reserved leading slots.
    pub(crate) const RESERVED: u32 = 2;

    #[inline(always)]
    pub(crate) const fn new(id: u32, generation: u32) -> Self {
        Self { id, generation }
    }

    /// Returns the slot index of this entity.
    #[inline(always)]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Returns the slot index as `usize`.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.id as usize
    }

    #[inline(always)]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns `true` for [`Entity::ZERO`].
    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.id == 0
    }

    /// Returns `true` for [`Entity::WILDCARD`].
    #[inline(always)]
    pub const fn is_wildcard(self) -> bool {
        self.id == 1
    }

    /// Returns `true` if the id is one of the reserved slots.
    #[inline(always)]
    pub const fn is_reserved(self) -> bool {
        self.id < Self::RESERVED
    }
}

impl Debug for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.id {
            0 => f.write_str("Entity(ZERO)"),
            1 => f.write_str("Entity(WILDCARD)"),
            _ => write!(f, "Entity({}v{})", self.id, self.generation),
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}v{}", self.id, self.generation)
    }
}

// -----------------------------------------------------------------------------
// Tests
