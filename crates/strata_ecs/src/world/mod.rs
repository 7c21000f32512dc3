//! The [`World`]: owner of every entity, component, table and filter.

// -----------------------------------------------------------------------------
// Modules

mod config;
mod error;
mod event;
mod lock;
mod methods;

// -----------------------------------------------------------------------------
// Exports

pub use config::WorldConfig;
pub use error::WorldError;
pub use event::{EntityEvent, EventKind, Listener};
pub use lock::{Lock, LockError};

// -----------------------------------------------------------------------------
// World

use alloc::boxed::Box;
use core::fmt::Debug;

use fixedbitset::FixedBitSet;

use crate::archetype::{ArcheId, Archetype, Archetypes};
use crate::component::{Component, Components, Mask};
use crate::entity::{Entity, EntityError, EntityPool, Locations};
use crate::graph::{Graph, NodeId};
use crate::query::FilterCache;
use crate::storage::{Table, TableId, Tables};

/// An in-memory entity/component store.
///
/// Structural changes (creating or removing entities, adding or removing
/// components, changing relation targets, registering new component types)
/// fail with [`WorldError::Locked`] while any [`Lock`] bit is held.
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) entities: EntityPool,
    pub(crate) locations: Locations,
    pub(crate) components: Components,
    pub(crate) graph: Graph,
    pub(crate) archetypes: Archetypes,
    pub(crate) tables: Tables,
    pub(crate) filters: FilterCache,
    pub(crate) lock: Lock,
    // Ids of entities some active table uses as a relation target.
    pub(crate) targets: FixedBitSet,
    pub(crate) listener: Option<Listener>,
}

impl Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("entities", &self.entities)
            .field("components", &self.components)
            .field("archetypes", &self.archetypes)
            .field("tables", &self.tables)
            .field("filters", &self.filters)
            .field("lock", &self.lock)
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        let mut world = Self {
            config,
            entities: EntityPool::with_capacity(config.initial_capacity()),
            locations: Locations::default(),
            components: Components::new(),
            graph: Graph::new(),
            archetypes: Archetypes::new(),
            tables: Tables::new(),
            filters: FilterCache::new(),
            lock: Lock::new(),
            targets: FixedBitSet::new(),
            listener: None,
        };

        let table = unsafe {
            Table::new(
                TableId::EMPTY,
                ArcheId::EMPTY,
                &world.components,
                &[],
                &[],
                &[],
                config.initial_capacity(),
            )
        };
        world.tables.push(table);

        let mut arche = Archetype::new(ArcheId::EMPTY, NodeId::ROOT, Mask::EMPTY, Box::new([]), Box::new([]));
        arche.insert_table(&[], TableId::EMPTY);
        world.archetypes.push(arche);
        world.graph.set_archetype(NodeId::ROOT, ArcheId::EMPTY);

        world
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns `true` if `entity` was created by this world and not removed.
    #[inline]
    pub fn alive(&self, entity: Entity) -> bool {
        self.entities.alive(entity)
    }

    /// Number of alive entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.len() == 0
    }

    #[inline]
    pub fn components(&self) -> &Components {
        &self.components
    }

    #[inline]
    pub fn archetypes(&self) -> &Archetypes {
        &self.archetypes
    }

    #[inline]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    #[inline]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id)
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn filters(&self) -> &FilterCache {
        &self.filters
    }

    /// The rows of component `T` in `table`.
    pub fn column<T: Component>(&self, table: TableId) -> Option<&[T]> {
        let id = self.components.id_of::<T>()?;
        // SAFETY: `id` was registered for `T`.
        unsafe { self.tables.get(table)?.slice::<T>(id) }
    }

    /// The component mask of an alive entity.
    pub fn mask_of(&self, entity: Entity) -> Result<&Mask, WorldError> {
        self.check_alive(entity)?;
        let table = unsafe { self.tables.get_unchecked(self.locations.get(entity).table) };
        Ok(unsafe { self.archetypes.get_unchecked(table.archetype()) }.mask())
    }

    /// Storage counters, for reporting.
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entities: self.entities.len(),
            components: self.components.len(),
            archetypes: self.archetypes.len(),
            tables: self.tables.len(),
            active_tables: self.archetypes.iter().map(|a| a.tables().len()).sum(),
            filters: self.filters.len(),
            memory: self.tables.iter().map(Table::memory).sum(),
        }
    }

    /// Receives an [`EntityEvent`] for every structural change.
    ///
    /// The world is locked while the listener runs.
    pub fn set_listener(&mut self, listener: impl FnMut(&EntityEvent) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Removes every entity, archetype and table.
    ///
    /// Component ids and registered filters stay valid, the transition graph
    /// keeps its edges.
    pub fn reset(&mut self) -> Result<(), WorldError> {
        self.check_unlocked()?;

        self.entities.reset();
        self.locations.clear();
        self.targets.clear();

        self.tables.truncate(1);
        self.archetypes.truncate(1);
        self.graph.reset();

        let table = unsafe { self.tables.get_unchecked_mut(TableId::EMPTY) };
        table.reset();
        self.filters.clear_tables();
        self.filters.on_table_added(table, &Mask::EMPTY);

        log::debug!("world reset");
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Locking

impl World {
    /// Takes a lock bit, see [`Lock::lock`].
    #[inline]
    pub fn lock(&self) -> Result<u8, WorldError> {
        Ok(self.lock.lock()?)
    }

    #[inline]
    pub fn unlock(&self, bit: u8) -> Result<(), WorldError> {
        Ok(self.lock.unlock(bit)?)
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    #[inline]
    pub(crate) fn check_unlocked(&self) -> Result<(), WorldError> {
        if self.lock.is_locked() {
            return Err(WorldError::Locked);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn check_alive(&self, entity: Entity) -> Result<(), WorldError> {
        if !self.entities.alive(entity) {
            return Err(EntityError::NotAlive(entity).into());
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// WorldStats

/// Counters returned by [`World::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub entities: usize,
    pub components: usize,
    pub archetypes: usize,
    /// Every table, including deactivated ones.
    pub tables: usize,
    pub active_tables: usize,
    pub filters: usize,
    /// Bytes reserved by table storage.
    pub memory: usize,
}
