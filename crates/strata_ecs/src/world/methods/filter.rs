use alloc::vec::Vec;

use crate::query::{CacheId, Filter, FilterError, Query};
use crate::relation::{Relation, RelationError};
use crate::storage::TableId;
use crate::world::{World, WorldError};

impl World {
    /// Returns the active tables matching `filter` and `relations`.
    ///
    /// Registered filters answer from their cache, others scan every
    /// archetype.
    pub fn matching_tables(&self, filter: &Filter, relations: &[Relation]) -> Result<Vec<TableId>, WorldError> {
        self.check_relations(filter, relations)?;

        let Some(cache) = filter.cache() else {
            return Ok(self.scan_tables(filter, relations));
        };
        let entry = self
            .filters
            .get(cache)
            .ok_or(FilterError::UnknownCache(cache))?;
        Ok(entry
            .tables()
            .iter()
            .copied()
            .filter(|&id| relations.is_empty() || unsafe { self.tables.get_unchecked(id) }.matches(relations))
            .collect())
    }

    /// The cached tables of a registered filter.
    pub fn cached_tables(&self, cache: CacheId) -> Result<&[TableId], WorldError> {
        match self.filters.get(cache) {
            Some(entry) => Ok(entry.tables()),
            None => Err(FilterError::UnknownCache(cache).into()),
        }
    }

    /// Starts keeping the matching tables of `filter` up to date.
    ///
    /// `relations` pins targets: only tables with those targets are cached.
    pub fn register_filter(&mut self, filter: &mut Filter, relations: &[Relation]) -> Result<CacheId, WorldError> {
        if let Some(id) = filter.cache() {
            return Err(FilterError::AlreadyRegistered(id).into());
        }
        self.check_relations(filter, relations)?;

        let tables = self.scan_tables(filter, relations);
        let id = self.filters.register(filter, relations, tables);
        filter.set_cache(Some(id));
        Ok(id)
    }

    pub fn unregister_filter(&mut self, filter: &mut Filter) -> Result<(), WorldError> {
        let id = filter.cache().ok_or(FilterError::NotRegistered)?;
        self.filters
            .unregister(id)
            .ok_or(FilterError::UnknownCache(id))?;
        filter.set_cache(None);
        Ok(())
    }

    /// Opens a cursor over the entities matching `filter` and `relations`.
    ///
    /// The world stays locked until the cursor is dropped.
    pub fn query(&mut self, filter: &Filter, relations: &[Relation]) -> Result<Query<'_>, WorldError> {
        let tables = self.matching_tables(filter, relations)?;
        let bit = self.lock.lock()?;
        Ok(Query::new(self, bit, tables))
    }

    fn check_relations(&self, filter: &Filter, relations: &[Relation]) -> Result<(), WorldError> {
        for rel in relations {
            if !filter.include().get(rel.component) {
                return Err(RelationError::NotDeclared(rel.component).into());
            }
            if !self.components.is_relation(rel.component) {
                return Err(RelationError::NotRelation(rel.component).into());
            }
        }
        Ok(())
    }

    /// Brute-force scan over every archetype.
    fn scan_tables(&self, filter: &Filter, relations: &[Relation]) -> Vec<TableId> {
        self.archetypes
            .iter()
            .filter(|arche| filter.matches(arche.mask()))
            .flat_map(|arche| arche.tables().iter().copied())
            .filter(|&id| relations.is_empty() || unsafe { self.tables.get_unchecked(id) }.matches(relations))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tests
