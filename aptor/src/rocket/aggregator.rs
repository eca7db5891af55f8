//! Tree walk producing the per-stage rocket description.
//!
//! The walk carries a "current stage index" that starts at 0 at the root.
//! Engines keep their children in the current stage; decouplers move their
//! own mass and everything below them into the declared post-separation
//! stage. After the walk, stages are post-processed in increasing index
//! order: cumulative initial mass, burnable propellant from the fixed
//! mixture ratio, and the fixed drag coefficient.

use tracing::{debug, warn};

use crate::vessel::{PartId, PartNode, VesselTree};

use super::{Engine, Rocket, Stage, FUEL_RATIO, OXIDIZER_RATIO, STAGE_DRAG};

/// Part titles that count as massless for staging purposes.
///
/// These structural parts are physically massless in the host once
/// attached; their listed dry mass must not enter the stage totals.
const MASSLESS_PART_TITLES: [&str; 5] = [
    "FTX-2 External Fuel Duct",
    "EAS-4 Strut Connector",
    "Octagonal Strut",
    "Cubic Octagonal Strut",
    "TT18-A Launch Stability Enhancer",
];

/// Build the [`Rocket`] for the subtree rooted at `root`.
///
/// The walk is read-only and rebuilds both lists from scratch, so calling
/// it twice on an unchanged tree yields identical results. Parts that have
/// vanished from the tree mid-walk are skipped with a warning; the host
/// serializes mutations, so this indicates a bookkeeping bug upstream.
pub fn aggregate(tree: &dyn VesselTree, root: PartId) -> Rocket {
    let mut rocket = Rocket::default();
    walk(tree, root, 0, &mut rocket);

    let mut carried_mass = 0.0;
    for (index, stage) in rocket.stages.iter_mut().enumerate() {
        stage.drag = STAGE_DRAG;
        stage.initial_mass = stage.stage_mass + carried_mass;
        carried_mass = stage.initial_mass;
        stage.fuel_mass = (stage.fuel / FUEL_RATIO).min(stage.oxidizer / OXIDIZER_RATIO);
        debug!(
            stage = index,
            stage_mass = stage.stage_mass,
            initial_mass = stage.initial_mass,
            fuel_mass = stage.fuel_mass,
            "aggregated stage"
        );
    }

    rocket
}

fn walk(tree: &dyn VesselTree, id: PartId, current_stage: usize, rocket: &mut Rocket) {
    let Some(part) = tree.node(id) else {
        warn!(%id, "part disappeared during aggregation, skipping subtree");
        return;
    };

    // Engine capability wins over decoupler when a part declares both.
    let effective_stage = if let Some(spec) = part.engine() {
        rocket.engines.push(Engine {
            thrust: spec.max_thrust,
            isp_sea_level: spec.isp_sea_level,
            isp_vacuum: spec.isp_vacuum,
            ignition_stage: part.declared_stage,
            burnout_stage: current_stage,
        });
        current_stage
    } else if part.is_decoupler() {
        // A decoupler travels with the stages it releases.
        part.declared_stage + 1
    } else {
        current_stage
    };

    extend_stages(rocket, effective_stage);
    let stage = &mut rocket.stages[effective_stage];
    stage.stage_mass += dry_mass(part) + part.resource_mass();
    stage.fuel += part.liquid_fuel();
    stage.oxidizer += part.oxidizer();

    for child in tree.children(id).to_vec() {
        walk(tree, child, effective_stage, rocket);
    }
}

fn dry_mass(part: &PartNode) -> f64 {
    if MASSLESS_PART_TITLES.contains(&part.title.as_str()) {
        0.0
    } else {
        part.dry_mass
    }
}

fn extend_stages(rocket: &mut Rocket, stage: usize) {
    while rocket.stages.len() <= stage {
        rocket.stages.push(Stage::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{EngineSpec, PartCapability, PartResource, VesselGraph};

    fn engine_part(title: &str, declared_stage: usize, mass: f64) -> PartNode {
        PartNode::new(title, declared_stage, mass).with_capability(PartCapability::Engine(
            EngineSpec {
                max_thrust: 200.0,
                isp_sea_level: 280.0,
                isp_vacuum: 320.0,
            },
        ))
    }

    fn decoupler_part(declared_stage: usize, mass: f64) -> PartNode {
        PartNode::new("TR-18A Stack Decoupler", declared_stage, mass)
            .with_capability(PartCapability::Decoupler)
    }

    #[test]
    fn test_two_stage_scenario() {
        // Thrust node at stage 0 with mass 100, a decoupler whose
        // separation creates stage 1, and a child thrust node with mass 50.
        let mut graph = VesselGraph::new();
        let booster = graph.add_part(None, engine_part("booster", 0, 100.0));
        let sep = graph.add_part(Some(booster), decoupler_part(0, 0.0));
        graph.add_part(Some(sep), engine_part("upper", 1, 50.0));

        let rocket = aggregate(&graph, booster);

        assert_eq!(rocket.stages.len(), 2);
        assert_eq!(rocket.stages[0].stage_mass, 100.0);
        assert_eq!(rocket.stages[1].stage_mass, 50.0);
        assert_eq!(rocket.stages[0].initial_mass, 100.0);
        assert_eq!(rocket.stages[1].initial_mass, 150.0);
    }

    #[test]
    fn test_initial_mass_is_monotone() {
        let mut graph = VesselGraph::new();
        let root = graph.add_part(None, engine_part("core", 0, 10.0));
        let sep1 = graph.add_part(Some(root), decoupler_part(0, 0.5));
        let mid = graph.add_part(Some(sep1), engine_part("mid", 1, 4.0));
        let sep2 = graph.add_part(Some(mid), decoupler_part(1, 0.5));
        graph.add_part(Some(sep2), engine_part("top", 2, 2.0));

        let rocket = aggregate(&graph, root);

        for pair in rocket.stages.windows(2) {
            assert!(pair[1].initial_mass >= pair[0].initial_mass);
        }
    }

    #[test]
    fn test_fuel_mass_uses_mixture_ratio() {
        let mut graph = VesselGraph::new();
        let root = graph.add_part(
            None,
            PartNode::new("FL-T800 Fuel Tank", 0, 0.5)
                .with_resource(PartResource::new(PartResource::LIQUID_FUEL, 360.0, 1.8))
                .with_resource(PartResource::new(PartResource::OXIDIZER, 440.0, 2.2)),
        );

        let rocket = aggregate(&graph, root);

        let stage = &rocket.stages[0];
        assert_eq!(stage.fuel, 360.0);
        assert_eq!(stage.oxidizer, 440.0);
        assert_eq!(stage.fuel_mass, (360.0_f64 / 90.0).min(440.0 / 110.0));
        // 0.5 dry + 4.0 of resources
        assert!((stage.stage_mass - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_massless_titles_contribute_no_dry_mass() {
        let mut graph = VesselGraph::new();
        let root = graph.add_part(None, PartNode::new("Octagonal Strut", 0, 0.05));

        let rocket = aggregate(&graph, root);

        assert_eq!(rocket.stages[0].stage_mass, 0.0);
    }

    #[test]
    fn test_engine_window_spans_ignition_to_burnout() {
        // An engine declared at stage 2 but reached while walking stage 0
        // burns from stage 2 down to stage 0.
        let mut graph = VesselGraph::new();
        let root = graph.add_part(None, engine_part("sustainer", 2, 8.0));

        let rocket = aggregate(&graph, root);

        let engine = &rocket.engines[0];
        assert_eq!(engine.ignition_stage, 2);
        assert_eq!(engine.burnout_stage, 0);
        assert!(engine.fires_during(1));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut graph = VesselGraph::new();
        let root = graph.add_part(None, engine_part("core", 0, 10.0));
        let sep = graph.add_part(Some(root), decoupler_part(0, 0.5));
        graph.add_part(
            Some(sep),
            PartNode::new("FL-T400 Fuel Tank", 1, 0.25)
                .with_resource(PartResource::new(PartResource::LIQUID_FUEL, 180.0, 0.9)),
        );

        let first = aggregate(&graph, root);
        let second = aggregate(&graph, root);

        assert_eq!(first, second);
    }

    #[test]
    fn test_decoupler_mass_lands_post_separation() {
        let mut graph = VesselGraph::new();
        let root = graph.add_part(None, PartNode::new("pod", 0, 1.0));
        graph.add_part(Some(root), decoupler_part(0, 0.4));

        let rocket = aggregate(&graph, root);

        assert_eq!(rocket.stages.len(), 2);
        assert_eq!(rocket.stages[0].stage_mass, 1.0);
        assert_eq!(rocket.stages[1].stage_mass, 0.4);
    }
}
