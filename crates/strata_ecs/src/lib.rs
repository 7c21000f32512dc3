//! An archetype-based, in-memory entity/component storage engine.
//!
//! Entities with the same set of components live in the same [`Table`],
//! one column per component. The set itself is a [`Mask`]; a graph over
//! masks resolves where an entity goes when components are added or
//! removed. Relation components further split an archetype into one table
//! per tuple of relation targets.
//!
//! The [`World`] ties everything together:
//!
//! ```
//! use strata_ecs::component::{Component, ComponentBuffer};
//! use strata_ecs::world::World;
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Position(f32, f32);
//! impl Component for Position {}
//!
//! let mut world = World::new();
//! let mut values = ComponentBuffer::new();
//! values.push(&mut world, Position(1.0, 2.0)).unwrap();
//!
//! let entity = world.new_entity_with(values, &[]).unwrap();
//! assert_eq!(world.get::<Position>(entity).unwrap(), Some(&Position(1.0, 2.0)));
//! ```
//!
//! [`Table`]: storage::Table
//! [`Mask`]: component::Mask
//! [`World`]: world::World
#![cfg_attr(docsrs, feature(doc_cfg))]
#![expect(unsafe_code, reason = "Columns are type-erased raw buffers.")]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod utils;

pub mod component;
pub mod entity;
pub mod storage;

pub mod archetype;
pub mod graph;
pub mod relation;

pub mod query;
pub mod world;
