//! In-memory vessel tree.

use super::node::{PartId, PartNode};
use super::tree::VesselTree;

struct PartSlot {
    node: PartNode,
    parent: Option<PartId>,
    children: Vec<PartId>,
}

/// Growable in-memory [`VesselTree`] implementation.
///
/// Used by the test suite and the CLI demo vessel; a host embedding the
/// library can also use it as its tree model. Parts keep their insertion
/// order as the canonical ordering, matching the sorted ship list of the
/// original editor.
///
/// # Example
///
/// ```
/// use aptor::vessel::{PartNode, VesselGraph, VesselTree};
///
/// let mut graph = VesselGraph::new();
/// let pod = graph.add_part(None, PartNode::new("Command Pod", 0, 0.8));
/// let tank = graph.add_part(Some(pod), PartNode::new("Fuel Tank", 0, 0.25));
/// assert_eq!(graph.root(), Some(pod));
/// assert_eq!(graph.children(pod), &[tank]);
/// ```
#[derive(Default)]
pub struct VesselGraph {
    slots: Vec<Option<PartSlot>>,
    root: Option<PartId>,
}

impl VesselGraph {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part under `parent`, or as the root when `parent` is `None`.
    ///
    /// The first part added without a parent becomes the root.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in the tree, or if a second root is added;
    /// both indicate host-side bookkeeping bugs.
    pub fn add_part(&mut self, parent: Option<PartId>, node: PartNode) -> PartId {
        let id = PartId(self.slots.len() as u32);
        match parent {
            Some(parent_id) => {
                let slot = self
                    .slot_mut(parent_id)
                    .expect("parent part not in the tree");
                slot.children.push(id);
            }
            None => {
                assert!(self.root.is_none(), "tree already has a root");
                self.root = Some(id);
            }
        }
        self.slots.push(Some(PartSlot {
            node,
            parent,
            children: Vec::new(),
        }));
        id
    }

    /// Remove `id` and every part below it.
    ///
    /// Removed parts disappear from [`VesselTree::ordered_parts`]; their
    /// ids are never reused.
    pub fn remove_subtree(&mut self, id: PartId) {
        if let Some(slot) = self.slot(id) {
            if let Some(parent) = slot.parent {
                if let Some(parent_slot) = self.slot_mut(parent) {
                    parent_slot.children.retain(|c| *c != id);
                }
            }
        }
        self.drop_recursive(id);
        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Number of parts currently in the tree.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the tree has no parts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn drop_recursive(&mut self, id: PartId) {
        let children = match self.slot(id) {
            Some(slot) => slot.children.clone(),
            None => return,
        };
        for child in children {
            self.drop_recursive(child);
        }
        self.slots[id.0 as usize] = None;
    }

    fn slot(&self, id: PartId) -> Option<&PartSlot> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    fn slot_mut(&mut self, id: PartId) -> Option<&mut PartSlot> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
    }
}

impl VesselTree for VesselGraph {
    fn root(&self) -> Option<PartId> {
        self.root
    }

    fn node(&self, id: PartId) -> Option<&PartNode> {
        self.slot(id).map(|s| &s.node)
    }

    fn children(&self, id: PartId) -> &[PartId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    fn ordered_parts(&self) -> Vec<PartId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| PartId(i as u32)))
            .collect()
    }
}
