//! Read-only tree query trait.

use super::node::{PartId, PartNode};

/// Read-only view of the host-owned part tree.
///
/// The host guarantees that no mutation happens while a query runs;
/// attach/detach events and computation requests are serialized by the
/// host scheduler. Implementations therefore need no internal locking.
pub trait VesselTree {
    /// The root part, or `None` for an empty tree.
    fn root(&self) -> Option<PartId>;

    /// The node data for `id`, or `None` if the part is not in the tree.
    fn node(&self, id: PartId) -> Option<&PartNode>;

    /// Child parts of `id`, in attachment order.
    fn children(&self, id: PartId) -> &[PartId];

    /// All parts in the host's canonical traversal order.
    ///
    /// Leader election uses this ordering to pick the first attached
    /// device; it must be stable as long as the tree is not mutated.
    fn ordered_parts(&self) -> Vec<PartId>;
}
