//! Filters, the filter cache and the query cursor.

// -----------------------------------------------------------------------------
// Modules

mod batch;
mod cache;
mod cursor;
mod error;
mod filter;

// -----------------------------------------------------------------------------
// Exports

pub use batch::Batch;
pub use cache::{CacheEntry, CacheId, FilterCache};
pub use cursor::Query;
pub use error::FilterError;
pub use filter::Filter;
