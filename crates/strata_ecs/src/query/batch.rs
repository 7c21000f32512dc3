use core::fmt::Debug;

use crate::query::Filter;
use crate::relation::Relation;

// -----------------------------------------------------------------------------
// Batch

/// Selects the entities of every table matching a filter and, optionally,
/// a set of relation targets.
#[derive(Clone, Copy)]
pub struct Batch<'a> {
    filter: &'a Filter,
    relations: &'a [Relation],
}

impl Debug for Batch<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Batch")
            .field("filter", self.filter)
            .field("relations", &self.relations)
            .finish()
    }
}

impl<'a> Batch<'a> {
    #[inline]
    pub const fn new(filter: &'a Filter) -> Self {
        Self {
            filter,
            relations: &[],
        }
    }

    /// Restricts the batch to tables with these relation targets.
    #[inline]
    pub const fn relations(mut self, relations: &'a [Relation]) -> Self {
        self.relations = relations;
        self
    }

    #[inline]
    pub const fn filter(&self) -> &'a Filter {
        self.filter
    }

    #[inline]
    pub const fn targets(&self) -> &'a [Relation] {
        self.relations
    }
}
