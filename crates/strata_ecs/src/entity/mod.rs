//! Entity handles, the generational id pool and the location index.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod ident;
mod location;
mod pool;

// -----------------------------------------------------------------------------
// Exports

pub use error::EntityError;
pub use ident::Entity;
pub use location::EntityLocation;
pub use pool::EntityPool;

pub(crate) use location::Locations;
