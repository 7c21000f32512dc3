use alloc::vec::Vec;
use core::fmt::Debug;

use super::{Table, TableId};
use crate::utils::DebugCheckedUnwrap;

// -----------------------------------------------------------------------------
// Tables

/// Arena of every table in a world, indexed by [`TableId`].
///
/// Tables are never removed individually; deactivated relation tables are
/// handed back to their archetype and reused. Only a world reset drops them.
pub struct Tables {
    tables: Vec<Table>,
}

impl Debug for Tables {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.tables.iter().map(|t| (t.id(), t)))
            .finish()
    }
}

impl Tables {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Number of tables, active or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// The id the next pushed table will receive.
    #[inline]
    pub(crate) fn next_id(&self) -> TableId {
        TableId::new(self.tables.len() as u32)
    }

    #[inline(always)]
    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.index())
    }

    /// # Safety
    /// `id` must come from this arena.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, id: TableId) -> &Table {
        debug_assert!(id.index() < self.tables.len());
        unsafe { self.tables.get_unchecked(id.index()) }
    }

    /// # Safety
    /// `id` must come from this arena.
    #[inline(always)]
    pub(crate) unsafe fn get_unchecked_mut(&mut self, id: TableId) -> &mut Table {
        debug_assert!(id.index() < self.tables.len());
        unsafe { self.tables.get_unchecked_mut(id.index()) }
    }

    /// Borrows two distinct tables mutably.
    ///
    /// # Safety
    /// Both ids must come from this arena and differ.
    #[inline]
    pub(crate) unsafe fn get2_mut(&mut self, a: TableId, b: TableId) -> (&mut Table, &mut Table) {
        let [a, b] = unsafe {
            self.tables
                .get_disjoint_mut([a.index(), b.index()])
                .debug_checked_unwrap()
        };
        (a, b)
    }

    /// Appends a table built with [`next_id`](Self::next_id).
    #[inline]
    pub(crate) fn push(&mut self, table: Table) -> TableId {
        debug_assert_eq!(table.id(), self.next_id());
        let id = table.id();
        self.tables.push(table);
        id
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    /// Drops every table from `len` on.
    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.tables.truncate(len);
    }
}
