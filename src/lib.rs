//! An archetype-based, in-memory entity/component store.
//!
//! This façade only re-exports the member crates:
//!
//! - [`ecs`]: entities, components, tables, filters and the [`World`](ecs::world::World).
//! - [`ptr`]: lifetime-carrying type-erased pointers used at the storage boundary.
//! - [`utils`]: hash containers and small numeric helpers.
#![no_std]

pub use strata_ecs as ecs;
pub use strata_ptr as ptr;
pub use strata_utils as utils;

/// The most commonly used items.
pub mod prelude {
    pub use strata_ecs::component::{Component, ComponentBuffer, ComponentId, Mask};
    pub use strata_ecs::entity::Entity;
    pub use strata_ecs::query::{Batch, CacheId, Filter};
    pub use strata_ecs::relation::Relation;
    pub use strata_ecs::world::{World, WorldConfig, WorldError};
}
