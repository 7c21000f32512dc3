//! The archetype transition graph.
//!
//! Nodes are the distinct masks seen so far. Each node memoizes where adding
//! or removing one component leads, so repeated transitions between the same
//! masks cost one hash lookup per component.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod node;

// -----------------------------------------------------------------------------
// Exports

pub use error::TransitionError;
pub use node::{Node, NodeId};

// -----------------------------------------------------------------------------
// Graph

use alloc::vec::Vec;
use core::fmt::Debug;

use strata_utils::hash::HashMap;

use crate::archetype::ArcheId;
use crate::component::{ComponentId, Mask};

/// Arena of [`Node`]s with a mask index for deduplication.
///
/// [`NodeId::ROOT`] is the empty mask and always exists.
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<Mask, NodeId>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

impl Graph {
    pub(crate) fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::default(),
        };
        graph.node_of(Mask::EMPTY);
        graph
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// # Safety
    /// `id` must come from this graph.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, id: NodeId) -> &Node {
        debug_assert!(id.index() < self.nodes.len());
        unsafe { self.nodes.get_unchecked(id.index()) }
    }

    /// Returns the node of `mask`, if it was ever reached.
    #[inline]
    pub fn find_mask(&self, mask: &Mask) -> Option<NodeId> {
        self.index.get(mask).copied()
    }

    /// Returns the node of `mask`, creating it if needed.
    pub fn node_of(&mut self, mask: Mask) -> NodeId {
        if let Some(&id) = self.index.get(&mask) {
            return id;
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(mask));
        self.index.insert(mask, id);
        id
    }

    /// Resolves the node reached from `start` by removing `remove` and then
    /// adding `add`.
    ///
    /// Fails without touching the graph if a removed id is absent, an added
    /// id is already present (or listed twice), or an id is in both lists.
    pub fn find(
        &mut self,
        start: NodeId,
        add: &[ComponentId],
        remove: &[ComponentId],
    ) -> Result<NodeId, TransitionError> {
        let start_mask = *self.nodes[start.index()].mask();

        if let Some(&id) = remove.iter().find(|id| add.contains(id)) {
            return Err(TransitionError::AddAndRemove(id));
        }
        let mut current = start_mask;
        for &id in remove {
            if !current.get(id) {
                return Err(TransitionError::NotPresent(id));
            }
            current.remove(id);
        }
        let mut added = Mask::EMPTY;
        for &id in add {
            if start_mask.get(id) || added.get(id) {
                return Err(TransitionError::AlreadyPresent(id));
            }
            added.insert(id);
        }

        let mut node = start;
        for &id in remove {
            node = self.step(node, id, false);
        }
        for &id in add {
            node = self.step(node, id, true);
        }
        Ok(node)
    }

    /// Follows or creates the edge toggling `id`, memoizing both directions.
    fn step(&mut self, from: NodeId, id: ComponentId, add: bool) -> NodeId {
        let node = &self.nodes[from.index()];
        let cached = if add { node.add_edge(id) } else { node.remove_edge(id) };
        if let Some(to) = cached {
            return to;
        }

        let mask = node.mask().toggled(id);
        let to = self.node_of(mask);
        if add {
            self.nodes[from.index()].add.insert(id, to);
            self.nodes[to.index()].remove.insert(id, from);
        } else {
            self.nodes[from.index()].remove.insert(id, to);
            self.nodes[to.index()].add.insert(id, from);
        }
        log::trace!("graph edge {from} -> {to} ({} {id})", if add { "add" } else { "remove" });
        to
    }

    pub(crate) fn set_archetype(&mut self, node: NodeId, arche: ArcheId) {
        self.nodes[node.index()].set_archetype(Some(arche));
    }

    /// Detaches every archetype except the empty one. Edges are kept.
    pub(crate) fn reset(&mut self) {
        self.nodes
            .iter_mut()
            .skip(1)
            .for_each(|node| node.set_archetype(None));
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Graph, NodeId, TransitionError};
    use crate::component::{ComponentId, Mask};

    const A: ComponentId = ComponentId::new(0);
    const B: ComponentId = ComponentId::new(1);
    const C: ComponentId = ComponentId::new(7);

    #[test]
    fn round_trip_returns_to_the_same_node() {
        let mut graph = Graph::new();
        let start = graph.find(NodeId::ROOT, &[A], &[]).unwrap();
        let there = graph.find(start, &[B, C], &[A]).unwrap();
        assert_eq!(graph.get(there).unwrap().mask(), &Mask::from_ids(&[B, C]));

        let back = graph.find(there, &[A], &[B, C]).unwrap();
        assert_eq!(back, start);
        assert_eq!(graph.get(back).unwrap().mask(), &Mask::from_ids(&[A]));
    }

    #[test]
    fn masks_are_deduplicated() {
        let mut graph = Graph::new();
        let ab = graph.find(NodeId::ROOT, &[A, B], &[]).unwrap();
        let ba = graph.find(NodeId::ROOT, &[B, A], &[]).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(graph.find_mask(&Mask::from_ids(&[A, B])), Some(ab));

        let before = graph.len();
        graph.find(NodeId::ROOT, &[A, B], &[]).unwrap();
        assert_eq!(graph.len(), before);
    }

    #[test]
    fn edges_are_memoized_both_ways() {
        let mut graph = Graph::new();
        let a = graph.find(NodeId::ROOT, &[A], &[]).unwrap();
        let root = graph.get(NodeId::ROOT).unwrap();
        assert_eq!(root.add_edge(A), Some(a));
        assert_eq!(graph.get(a).unwrap().remove_edge(A), Some(NodeId::ROOT));
    }

    #[test]
    fn invalid_transitions() {
        let mut graph = Graph::new();
        let a = graph.find(NodeId::ROOT, &[A], &[]).unwrap();
        let nodes = graph.len();

        assert_eq!(graph.find(a, &[], &[B]), Err(TransitionError::NotPresent(B)));
        assert_eq!(graph.find(a, &[], &[A, A]), Err(TransitionError::NotPresent(A)));
        assert_eq!(graph.find(a, &[A], &[]), Err(TransitionError::AlreadyPresent(A)));
        assert_eq!(graph.find(a, &[B, B], &[]), Err(TransitionError::AlreadyPresent(B)));
        assert_eq!(graph.find(a, &[A], &[A]), Err(TransitionError::AddAndRemove(A)));
        assert_eq!(graph.len(), nodes);
    }
}
