//! Small shared building blocks for the `strata` crates.
//!
//! - [`hash`]: `hashbrown` containers with fixed, deterministic hashers.
//! - [`num`]: niche-optimized integers used for dense ids.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId).
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;
pub mod num;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
