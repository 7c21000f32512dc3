use alloc::vec::Vec;

use crate::entity::{Entity, EntityError};

// -----------------------------------------------------------------------------
// EntityPool

/// Generational id allocator.
///
/// Free slots form an implicit linked list: the `id` field of a free slot
/// holds the index of the next free slot, and `next` is the head. Taking a
/// slot and recycling one are both O(1).
///
/// ```
/// use strata_ecs::entity::EntityPool;
///
/// let mut pool = EntityPool::new();
/// let a = pool.get();
/// pool.recycle(a).unwrap();
///
/// let b = pool.get();
/// assert_eq!(a.id(), b.id());
/// assert!(!pool.alive(a));
/// assert!(pool.alive(b));
/// ```
#[derive(Debug, Clone)]
pub struct EntityPool {
    slots: Vec<Entity>,
    next: u32,
    available: u32,
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPool {
    /// Creates a pool holding only the reserved slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a pool with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + Entity::RESERVED as usize);
        slots.push(Entity::ZERO);
        slots.push(Entity::WILDCARD);
        Self {
            slots,
            next: 0,
            available: 0,
        }
    }

    /// Returns a fresh or recycled entity.
    pub fn get(&mut self) -> Entity {
        if self.available == 0 {
            let id = self.slots.len() as u32;
            let entity = Entity::new(id, 0);
            self.slots.push(entity);
            return entity;
        }

        let current = self.next;
        let slot = &mut self.slots[current as usize];
        self.next = slot.id();
        *slot = Entity::new(current, slot.generation());
        self.available -= 1;
        *slot
    }

    /// Bumps the generation of `entity` and returns its slot to the free list.
    ///
    /// Fails for reserved ids and for entities that are not alive.
    pub fn recycle(&mut self, entity: Entity) -> Result<(), EntityError> {
        if entity.is_reserved() {
            return Err(EntityError::Reserved(entity));
        }
        if !self.alive(entity) {
            return Err(EntityError::NotAlive(entity));
        }

        let (generation, wrapped) = entity.generation().overflowing_add(1);
        if wrapped {
            log::warn!("generation of entity slot {} wrapped, stale handles may alias", entity.id());
        }

        self.slots[entity.index()] = Entity::new(self.next, generation);
        self.next = entity.id();
        self.available += 1;
        Ok(())
    }

    /// Returns `true` if `entity` is the current occupant of its slot.
    #[inline]
    pub fn alive(&self, entity: Entity) -> bool {
        !entity.is_reserved()
            && self
                .slots
                .get(entity.index())
                .is_some_and(|slot| slot.generation() == entity.generation() && slot.id() == entity.id())
    }

    /// Number of alive entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - Entity::RESERVED as usize - self.available as usize
    }

    /// Number of slots ever handed out, alive or free.
    #[inline]
    pub fn total(&self) -> usize {
        self.slots.len() - Entity::RESERVED as usize
    }

    /// Number of free slots waiting to be reused.
    #[inline]
    pub fn available(&self) -> usize {
        self.available as usize
    }

    /// Forgets every slot, generations included.
    pub fn reset(&mut self) {
        self.slots.truncate(Entity::RESERVED as usize);
        self.next = 0;
        self.available = 0;
    }
}

// -----------------------------------------------------------------------------
// Tests
