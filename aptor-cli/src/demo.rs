//! The bundled two-stage demo vessel.
//!
//! A small stack rocket: command pod and upper stage on top of a
//! decoupler and a first-stage tank/engine pair. Enough to exercise
//! staging, fuel accounting and engine windows.

use aptor::vessel::{EngineSpec, PartCapability, PartId, PartNode, PartResource, VesselGraph};

/// Build the demo vessel; returns the tree and its root part.
pub fn demo_vessel() -> (VesselGraph, PartId) {
    let mut graph = VesselGraph::new();

    let pod = graph.add_part(None, PartNode::new("Command Pod Mk1", 1, 0.8));
    let upper_tank = graph.add_part(
        Some(pod),
        PartNode::new("FL-T400 Fuel Tank", 1, 0.25)
            .with_resource(PartResource::new(PartResource::LIQUID_FUEL, 180.0, 0.9))
            .with_resource(PartResource::new(PartResource::OXIDIZER, 220.0, 1.1)),
    );
    let upper_engine = graph.add_part(
        Some(upper_tank),
        PartNode::new("LV-909 Liquid Fuel Engine", 1, 0.5).with_capability(
            PartCapability::Engine(EngineSpec {
                max_thrust: 60.0,
                isp_sea_level: 85.0,
                isp_vacuum: 345.0,
            }),
        ),
    );
    let decoupler = graph.add_part(
        Some(upper_engine),
        PartNode::new("TR-18A Stack Decoupler", 0, 0.05)
            .with_capability(PartCapability::Decoupler),
    );
    let lower_tank = graph.add_part(
        Some(decoupler),
        PartNode::new("FL-T800 Fuel Tank", 0, 0.5)
            .with_resource(PartResource::new(PartResource::LIQUID_FUEL, 360.0, 1.8))
            .with_resource(PartResource::new(PartResource::OXIDIZER, 440.0, 2.2)),
    );
    graph.add_part(
        Some(lower_tank),
        PartNode::new("LV-T30 Liquid Fuel Engine", 0, 1.25).with_capability(
            PartCapability::Engine(EngineSpec {
                max_thrust: 215.0,
                isp_sea_level: 280.0,
                isp_vacuum: 300.0,
            }),
        ),
    );

    (graph, pod)
}
