// -----------------------------------------------------------------------------
// WorldConfig

/// Storage tuning for a [`World`](crate::world::World).
///
/// Capacities are in rows and rounded up to a power of two.
///
/// ```
/// use strata_ecs::world::{World, WorldConfig};
///
/// let config = WorldConfig::new()
///     .with_initial_capacity(1000)
///     .with_relation_capacity(4);
/// assert_eq!(config.initial_capacity(), 1024);
///
/// let world = World::with_config(config);
/// assert_eq!(world.config().relation_capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    initial_capacity: usize,
    relation_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldConfig {
    pub const DEFAULT_INITIAL_CAPACITY: usize = 128;
    pub const DEFAULT_RELATION_CAPACITY: usize = 32;

    pub const fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            relation_capacity: Self::DEFAULT_RELATION_CAPACITY,
        }
    }

    /// Rows allocated for a new table of an archetype without relations.
    pub const fn with_initial_capacity(mut self, rows: usize) -> Self {
        self.initial_capacity = rows.next_power_of_two();
        self
    }

    /// Rows allocated for a new table of a relation archetype. These are
    /// usually many and small.
    pub const fn with_relation_capacity(mut self, rows: usize) -> Self {
        self.relation_capacity = rows.next_power_of_two();
        self
    }

    #[inline]
    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    #[inline]
    pub const fn relation_capacity(&self) -> usize {
        self.relation_capacity
    }
}
