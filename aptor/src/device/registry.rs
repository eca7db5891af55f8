//! Device instances and the leader recompute.

use tracing::{debug, info};

use crate::vessel::{PartId, VesselTree};

/// Stable identity of one device instance.
///
/// Assigned once, monotonically, when the host registers the device;
/// never reused, even after the device is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// One coordination participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInstance {
    /// Stable identity.
    pub id: DeviceId,
    /// The part this device is mounted on.
    pub part: PartId,
    /// Whether the part is currently connected to the shared tree.
    pub attached: bool,
    /// Whether this instance is the elected primary.
    pub is_primary: bool,
}

/// Promotion or demotion of a device, reported to the host.
///
/// `Gained` permits the host to raise the primary-only display surface and
/// create a computation session; `Lost` tears the surface down. Losing
/// leadership while a computation is in flight does not stop the worker by
/// itself - the host is expected to cancel the controller cooperatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadershipEvent {
    /// The device became primary.
    Gained(DeviceId),
    /// The device ceased to be primary.
    Lost(DeviceId),
}

/// Owns the device instances attached to one vessel tree.
///
/// The registry never owns the tree; every handler takes the host's tree
/// handle and queries it read-only. At any quiescent point at most one
/// attached instance is primary, and it is the one hosted on the earliest
/// part in [`VesselTree::ordered_parts`]; with nothing attached, none is
/// primary.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceInstance>,
    next_id: u64,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new device mounted on `part`.
    ///
    /// The instance starts detached and non-primary; the host reports
    /// connectivity separately via [`on_attach`](Self::on_attach).
    pub fn register(&mut self, part: PartId) -> DeviceId {
        let id = DeviceId(self.next_id);
        self.next_id += 1;
        self.devices.push(DeviceInstance {
            id,
            part,
            attached: false,
            is_primary: false,
        });
        debug!(%id, %part, "registered device");
        id
    }

    /// The current instance state, or `None` after destruction.
    pub fn device(&self, id: DeviceId) -> Option<&DeviceInstance> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// The current primary, if any.
    pub fn primary(&self) -> Option<DeviceId> {
        self.devices.iter().find(|d| d.is_primary).map(|d| d.id)
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no instances are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The device's part was connected into the tree.
    pub fn on_attach(&mut self, tree: &dyn VesselTree, id: DeviceId) -> Vec<LeadershipEvent> {
        if let Some(device) = self.device_mut(id) {
            device.attached = true;
            self.recompute(tree, id)
        } else {
            Vec::new()
        }
    }

    /// The device's part was disconnected from the tree.
    pub fn on_detach(&mut self, tree: &dyn VesselTree, id: DeviceId) -> Vec<LeadershipEvent> {
        if let Some(device) = self.device_mut(id) {
            device.attached = false;
            self.recompute(tree, id)
        } else {
            Vec::new()
        }
    }

    /// The device's part was destroyed. Implies detach.
    pub fn on_destroy(&mut self, tree: &dyn VesselTree, id: DeviceId) -> Vec<LeadershipEvent> {
        let events = self.on_detach(tree, id);
        self.devices.retain(|d| d.id != id);
        debug!(%id, "destroyed device");
        events
    }

    /// Full recompute from the perspective of the instigating device.
    ///
    /// Exactly the two-tier scheme: the instigator re-derives the global
    /// first-attached device; the one peer whose status may have become
    /// stale gets a local recheck that cannot cascade.
    fn recompute(&mut self, tree: &dyn VesselTree, instigator: DeviceId) -> Vec<LeadershipEvent> {
        let mut events = Vec::new();
        match self.first_attached(tree) {
            None => {
                // Nothing attached: leadership silently drops to none.
                self.set_primary(instigator, false, &mut events);
            }
            Some(first) if first == instigator => {
                self.set_primary(instigator, true, &mut events);
                // A previously-primary peer that is no longer first must
                // demote itself without re-scanning the whole tree.
                if let Some(other) = self.first_attached_other_than(tree, instigator) {
                    self.local_recheck(tree, other, &mut events);
                }
            }
            Some(first) => {
                self.set_primary(instigator, false, &mut events);
                if !self.is_primary(first) {
                    self.local_recheck(tree, first, &mut events);
                }
            }
        }
        events
    }

    /// Cheap local recheck: align `id`'s primary flag with the pure
    /// first-attached predicate. Never propagates further.
    fn local_recheck(&mut self, tree: &dyn VesselTree, id: DeviceId, events: &mut Vec<LeadershipEvent>) {
        let should_lead = self.first_attached(tree) == Some(id);
        self.set_primary(id, should_lead, events);
    }

    /// The attached device hosted on the earliest part in tree order.
    fn first_attached(&self, tree: &dyn VesselTree) -> Option<DeviceId> {
        tree.ordered_parts().into_iter().find_map(|part| {
            self.devices
                .iter()
                .find(|d| d.part == part && d.attached)
                .map(|d| d.id)
        })
    }

    fn first_attached_other_than(&self, tree: &dyn VesselTree, excluded: DeviceId) -> Option<DeviceId> {
        tree.ordered_parts().into_iter().find_map(|part| {
            self.devices
                .iter()
                .find(|d| d.part == part && d.attached && d.id != excluded)
                .map(|d| d.id)
        })
    }

    fn set_primary(&mut self, id: DeviceId, primary: bool, events: &mut Vec<LeadershipEvent>) {
        let Some(device) = self.device_mut(id) else {
            return;
        };
        if device.is_primary == primary {
            return;
        }
        device.is_primary = primary;
        if primary {
            info!(%id, "device gained leadership");
            events.push(LeadershipEvent::Gained(id));
        } else {
            info!(%id, "device lost leadership");
            events.push(LeadershipEvent::Lost(id));
        }
    }

    fn is_primary(&self, id: DeviceId) -> bool {
        self.device(id).map(|d| d.is_primary).unwrap_or(false)
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut DeviceInstance> {
        self.devices.iter_mut().find(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{PartNode, VesselGraph};

    fn vessel_with_parts(count: usize) -> (VesselGraph, Vec<PartId>) {
        let mut graph = VesselGraph::new();
        let mut parts = Vec::new();
        let mut parent = None;
        for i in 0..count {
            let id = graph.add_part(parent, PartNode::new(format!("part {i}"), 0, 1.0));
            parts.push(id);
            parent = Some(id);
        }
        (graph, parts)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let (_, parts) = vessel_with_parts(2);
        let mut registry = DeviceRegistry::new();
        let a = registry.register(parts[0]);
        let b = registry.register(parts[1]);
        assert!(a < b);
    }

    #[test]
    fn test_first_attach_gains_leadership() {
        let (graph, parts) = vessel_with_parts(1);
        let mut registry = DeviceRegistry::new();
        let dev = registry.register(parts[0]);

        let events = registry.on_attach(&graph, dev);

        assert_eq!(events, vec![LeadershipEvent::Gained(dev)]);
        assert_eq!(registry.primary(), Some(dev));
    }

    #[test]
    fn test_earlier_part_steals_leadership() {
        let (graph, parts) = vessel_with_parts(2);
        let mut registry = DeviceRegistry::new();
        let early = registry.register(parts[0]);
        let late = registry.register(parts[1]);

        registry.on_attach(&graph, late);
        assert_eq!(registry.primary(), Some(late));

        let events = registry.on_attach(&graph, early);

        assert_eq!(
            events,
            vec![LeadershipEvent::Gained(early), LeadershipEvent::Lost(late)]
        );
        assert_eq!(registry.primary(), Some(early));
    }

    #[test]
    fn test_later_attach_does_not_change_primary() {
        let (graph, parts) = vessel_with_parts(2);
        let mut registry = DeviceRegistry::new();
        let early = registry.register(parts[0]);
        let late = registry.register(parts[1]);

        registry.on_attach(&graph, early);
        let events = registry.on_attach(&graph, late);

        assert!(events.is_empty());
        assert_eq!(registry.primary(), Some(early));
    }

    #[test]
    fn test_detach_of_primary_hands_over() {
        let (graph, parts) = vessel_with_parts(2);
        let mut registry = DeviceRegistry::new();
        let early = registry.register(parts[0]);
        let late = registry.register(parts[1]);
        registry.on_attach(&graph, early);
        registry.on_attach(&graph, late);

        let events = registry.on_detach(&graph, early);

        assert_eq!(
            events,
            vec![LeadershipEvent::Lost(early), LeadershipEvent::Gained(late)]
        );
        assert_eq!(registry.primary(), Some(late));
    }

    #[test]
    fn test_last_detach_leaves_no_primary() {
        let (graph, parts) = vessel_with_parts(1);
        let mut registry = DeviceRegistry::new();
        let dev = registry.register(parts[0]);
        registry.on_attach(&graph, dev);

        let events = registry.on_detach(&graph, dev);

        assert_eq!(events, vec![LeadershipEvent::Lost(dev)]);
        assert_eq!(registry.primary(), None);
    }

    #[test]
    fn test_destroy_removes_instance_and_hands_over() {
        let (graph, parts) = vessel_with_parts(2);
        let mut registry = DeviceRegistry::new();
        let early = registry.register(parts[0]);
        let late = registry.register(parts[1]);
        registry.on_attach(&graph, early);
        registry.on_attach(&graph, late);

        let events = registry.on_destroy(&graph, early);

        assert_eq!(
            events,
            vec![LeadershipEvent::Lost(early), LeadershipEvent::Gained(late)]
        );
        assert!(registry.device(early).is_none());
        assert_eq!(registry.primary(), Some(late));
    }

    #[test]
    fn test_at_most_one_primary_under_churn() {
        let (graph, parts) = vessel_with_parts(4);
        let mut registry = DeviceRegistry::new();
        let devices: Vec<_> = parts.iter().map(|p| registry.register(*p)).collect();

        // Deterministic attach/detach churn; check the invariant at every
        // quiescent point.
        let script: &[(usize, bool)] = &[
            (2, true),
            (0, true),
            (3, true),
            (0, false),
            (1, true),
            (2, false),
            (1, false),
            (3, false),
            (0, true),
        ];
        for &(idx, attach) in script {
            if attach {
                registry.on_attach(&graph, devices[idx]);
            } else {
                registry.on_detach(&graph, devices[idx]);
            }

            let primaries: Vec<_> = devices
                .iter()
                .filter(|d| registry.device(**d).is_some_and(|i| i.is_primary))
                .collect();
            assert!(primaries.len() <= 1, "more than one primary");

            // The primary must be the first attached device in tree order.
            let expected = devices
                .iter()
                .find(|d| registry.device(**d).is_some_and(|i| i.attached))
                .copied();
            assert_eq!(registry.primary(), expected);
        }
    }
}
