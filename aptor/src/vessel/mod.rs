//! Vessel tree interface.
//!
//! The part tree is owned by the host (editor or flight scene); this module
//! only defines how the rest of the library reads it:
//!
//! - [`VesselTree`] - Read-only query trait over the host's tree handle
//! - [`PartNode`] - Per-part data: title, staging, mass, capabilities, resources
//! - [`PartCapability`] - Capability tags replacing dynamic module lookup
//! - [`VesselGraph`] - In-memory implementation for tests, the CLI demo and
//!   hosts without a tree of their own
//!
//! The canonical part ordering exposed by [`VesselTree::ordered_parts`] is
//! the host's traversal order. Leader election depends on it being stable
//! while no mutation is in flight; the tree itself is never mutated from
//! this library.

mod graph;
mod node;
mod tree;

pub use graph::VesselGraph;
pub use node::{EngineSpec, PartCapability, PartId, PartNode, PartResource};
pub use tree::VesselTree;
