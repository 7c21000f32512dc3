use core::fmt::{Debug, Display};

use strata_utils::hash::NoOpHashMap;

use crate::archetype::ArcheId;
use crate::component::{ComponentId, Mask};

// -----------------------------------------------------------------------------
// NodeId

/// Index of a [`Node`] in the transition graph.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The node of the empty mask.
    pub const ROOT: NodeId = NodeId(0);

    #[inline(always)]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// Node

/// A distinct mask and its memoized single-component edges.
pub struct Node {
    mask: Mask,
    arche: Option<ArcheId>,
    pub(super) add: NoOpHashMap<ComponentId, NodeId>,
    pub(super) remove: NoOpHashMap<ComponentId, NodeId>,
}

impl Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("mask", &self.mask)
            .field("arche", &self.arche)
            .field("add", &self.add)
            .field("remove", &self.remove)
            .finish()
    }
}

impl Node {
    pub(super) fn new(mask: Mask) -> Self {
        Self {
            mask,
            arche: None,
            add: NoOpHashMap::default(),
            remove: NoOpHashMap::default(),
        }
    }

    #[inline(always)]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// The archetype storing this mask, once one was needed.
    #[inline(always)]
    pub fn archetype(&self) -> Option<ArcheId> {
        self.arche
    }

    #[inline(always)]
    pub(super) fn set_archetype(&mut self, arche: Option<ArcheId>) {
        self.arche = arche;
    }

    /// The memoized node reached by adding `id`.
    #[inline]
    pub fn add_edge(&self, id: ComponentId) -> Option<NodeId> {
        self.add.get(&id).copied()
    }

    /// The memoized node reached by removing `id`.
    #[inline]
    pub fn remove_edge(&self, id: ComponentId) -> Option<NodeId> {
        self.remove.get(&id).copied()
    }
}
