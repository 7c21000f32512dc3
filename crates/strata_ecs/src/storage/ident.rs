use core::fmt::Debug;

use strata_utils::num::NonMaxU32;

// -----------------------------------------------------------------------------
// TableId

crate::utils::dense_id! {
    /// Index of a [`Table`](crate::storage::Table) in its world.
    TableId, "tables"
}

impl TableId {
    /// The table of the empty archetype, created with the world.
    pub const EMPTY: TableId = TableId(NonMaxU32::ZERO);
}

// -----------------------------------------------------------------------------
// TableCol

/// Column position within one table.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TableCol(pub u8);

impl TableCol {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for TableCol {
    #[inline(always)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}
