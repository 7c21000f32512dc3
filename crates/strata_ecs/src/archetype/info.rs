use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use strata_utils::hash::HashMap;

use crate::archetype::ArcheId;
use crate::component::{ComponentId, Mask};
use crate::entity::Entity;
use crate::graph::NodeId;
use crate::storage::TableId;

// -----------------------------------------------------------------------------
// Archetype

/// One distinct component set and the tables that store it.
///
/// An archetype without relation components owns exactly one table. With
/// relations, it owns one table per tuple of relation targets seen so far,
/// looked up through a tuple index. Tables whose tuple referenced a removed
/// entity are deactivated and kept on a free list for the next new tuple.
pub struct Archetype {
    id: ArcheId,
    node: NodeId,
    mask: Mask,
    components: Box<[ComponentId]>,
    relations: Box<[ComponentId]>,
    tables: Vec<TableId>,
    free: Vec<TableId>,
    index: HashMap<Box<[Entity]>, TableId>,
}

impl Debug for Archetype {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("components", &self.components)
            .field("relations", &self.relations)
            .field("tables", &self.tables)
            .field("free", &self.free)
            .finish()
    }
}

impl Archetype {
    pub(crate) fn new(
        id: ArcheId,
        node: NodeId,
        mask: Mask,
        components: Box<[ComponentId]>,
        relations: Box<[ComponentId]>,
    ) -> Self {
        debug_assert!(components.is_sorted());
        Self {
            id,
            node,
            mask,
            components,
            relations,
            tables: Vec::new(),
            free: Vec::new(),
            index: HashMap::default(),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ArcheId {
        self.id
    }

    /// The graph node of this archetype's mask.
    #[inline(always)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline(always)]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Sorted component ids.
    #[inline(always)]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// The relation components, in the order targets are stored in tables.
    #[inline(always)]
    pub fn relations(&self) -> &[ComponentId] {
        &self.relations
    }

    #[inline(always)]
    pub fn has_relations(&self) -> bool {
        !self.relations.is_empty()
    }

    /// The active tables.
    #[inline(always)]
    pub fn tables(&self) -> &[TableId] {
        &self.tables
    }

    /// Deactivated tables waiting for reuse.
    #[inline(always)]
    pub fn free_tables(&self) -> &[TableId] {
        &self.free
    }

    /// Returns the active table storing `targets`.
    #[inline]
    pub fn table_for(&self, targets: &[Entity]) -> Option<TableId> {
        self.index.get(targets).copied()
    }

    /// Slot of relation `id` inside a target tuple.
    #[inline]
    pub fn relation_slot(&self, id: ComponentId) -> Option<usize> {
        self.relations.iter().position(|&r| r == id)
    }

    pub(crate) fn insert_table(&mut self, targets: &[Entity], table: TableId) {
        debug_assert_eq!(targets.len(), self.relations.len());
        self.tables.push(table);
        self.index.insert(targets.into(), table);
    }

    /// Takes a table from the free list.
    #[inline]
    pub(crate) fn pop_free(&mut self) -> Option<TableId> {
        self.free.pop()
    }

    /// Detaches an active table and puts it on the free list.
    pub(crate) fn deactivate(&mut self, targets: &[Entity], table: TableId) {
        if let Some(pos) = self.tables.iter().position(|&t| t == table) {
            self.tables.swap_remove(pos);
        }
        self.index.remove(targets);
        self.free.push(table);
    }
}
