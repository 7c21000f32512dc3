use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use slotmap::SlotMap;
use strata_utils::hash::HashMap;

use crate::component::Mask;
use crate::query::Filter;
use crate::relation::Relation;
use crate::storage::{Table, TableId};

slotmap::new_key_type! {
    /// Handle of a registered filter.
    pub struct CacheId;
}

// -----------------------------------------------------------------------------
// CacheEntry

/// The tables currently matching one registered filter.
pub struct CacheEntry {
    include: Mask,
    exclude: Option<Mask>,
    relations: Box<[Relation]>,
    tables: Vec<TableId>,
    // Built on the first removal, `tables[indices[t]] == t` afterwards.
    indices: Option<HashMap<TableId, usize>>,
}

impl Debug for CacheEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("relations", &self.relations)
            .field("tables", &self.tables)
            .finish()
    }
}

impl CacheEntry {
    /// Matching tables, in no particular order.
    #[inline]
    pub fn tables(&self) -> &[TableId] {
        &self.tables
    }

    /// Relation targets pinned at registration.
    #[inline]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    fn matches(&self, mask: &Mask, table: &Table) -> bool {
        mask.contains(&self.include)
            && !self.exclude.is_some_and(|ex| mask.contains_any(&ex))
            && table.matches(&self.relations)
    }

    fn push(&mut self, table: TableId) {
        if let Some(indices) = &mut self.indices {
            indices.insert(table, self.tables.len());
        }
        self.tables.push(table);
    }

    fn remove(&mut self, table: TableId) {
        let tables = &self.tables;
        let indices = self.indices.get_or_insert_with(|| {
            tables.iter().enumerate().map(|(i, &t)| (t, i)).collect()
        });
        if let Some(pos) = indices.remove(&table) {
            self.tables.swap_remove(pos);
            if let Some(&moved) = self.tables.get(pos) {
                indices.insert(moved, pos);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// FilterCache

/// Every registered filter of a world, kept in step with table creation
/// and deactivation.
#[derive(Default)]
pub struct FilterCache {
    entries: SlotMap<CacheId, CacheEntry>,
}

impl Debug for FilterCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl FilterCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn get(&self, id: CacheId) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CacheId, &CacheEntry)> {
        self.entries.iter()
    }

    /// Stores a filter with its current matching tables.
    pub(crate) fn register(
        &mut self,
        filter: &Filter,
        relations: &[Relation],
        tables: Vec<TableId>,
    ) -> CacheId {
        let id = self.entries.insert(CacheEntry {
            include: *filter.include(),
            exclude: filter.exclude().copied(),
            relations: relations.into(),
            tables,
            indices: None,
        });
        log::debug!("registered filter {id:?} for {filter:?}");
        id
    }

    pub(crate) fn unregister(&mut self, id: CacheId) -> Option<CacheEntry> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            log::debug!("unregistered filter {id:?}");
        }
        entry
    }

    /// Adds a new or reactivated table to every entry it matches.
    pub(crate) fn on_table_added(&mut self, table: &Table, mask: &Mask) {
        for entry in self.entries.values_mut() {
            if entry.matches(mask, table) {
                entry.push(table.id());
            }
        }
    }

    /// Removes a deactivated table from every entry it matched.
    ///
    /// Must run while `table` still carries the targets it was added with.
    pub(crate) fn on_table_removed(&mut self, table: &Table, mask: &Mask) {
        for entry in self.entries.values_mut() {
            if entry.matches(mask, table) {
                entry.remove(table.id());
            }
        }
    }

    /// Forgets every table but keeps the registrations.
    pub(crate) fn clear_tables(&mut self) {
        for entry in self.entries.values_mut() {
            entry.tables.clear();
            entry.indices = None;
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::CacheEntry;
    use crate::component::Mask;
    use crate::storage::TableId;
    use alloc::vec::Vec;

    fn entry(tables: &[u32]) -> CacheEntry {
        CacheEntry {
            include: Mask::EMPTY,
            exclude: None,
            relations: Default::default(),
            tables: tables.iter().map(|&t| TableId::new(t)).collect(),
            indices: None,
        }
    }

    fn sorted(entry: &CacheEntry) -> Vec<usize> {
        let mut tables: Vec<_> = entry.tables().iter().map(|t| t.index()).collect();
        tables.sort_unstable();
        tables
    }

    #[test]
    fn removal_builds_the_index_lazily() {
        let mut entry = entry(&[1, 2, 3, 4]);
        assert!(entry.indices.is_none());

        entry.remove(TableId::new(2));
        assert!(entry.indices.is_some());
        assert_eq!(sorted(&entry), [1, 3, 4]);

        entry.push(TableId::new(9));
        entry.remove(TableId::new(1));
        entry.remove(TableId::new(7));
        assert_eq!(sorted(&entry), [3, 4, 9]);

        let indices = entry.indices.as_ref().unwrap();
        for (pos, table) in entry.tables().iter().enumerate() {
            assert_eq!(indices[table], pos);
        }
    }
}
