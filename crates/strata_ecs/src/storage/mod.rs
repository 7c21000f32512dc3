//! Columnar storage: type-erased columns grouped into tables.

// -----------------------------------------------------------------------------
// Modules

mod column;
mod ident;
mod table;
mod tables;

// -----------------------------------------------------------------------------
// Exports

pub use column::Column;
pub use ident::{TableCol, TableId};
pub use table::Table;
pub use tables::Tables;
