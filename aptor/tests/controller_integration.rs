//! End-to-end computation test: aggregation, controller, real session
//! worker and a scripted solver behind a TCP socket.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::{Duration, Instant};

use aptor::ascent::{AscentConfig, ComputationController, ComputationOutcome, ComputationState};
use aptor::rocket::aggregate;
use aptor::solver::{SessionConfig, SolverEndpoint, TcpSessionFactory};
use aptor::vessel::{EngineSpec, PartCapability, PartNode, PartResource, VesselGraph};

// =============================================================================
// Test Helpers
// =============================================================================

/// A solver double speaking just enough of the protocol.
///
/// Setup commands get an `ok`; `GET_FINAL_TIMES` reports phase times with
/// a 3.5 s total; `GET_PITCH_THRUST t` answers a deterministic profile.
fn spawn_scripted_solver() -> (SocketAddr, thread::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut exchanges = 0usize;
        let (mut stream, _) = listener.accept().unwrap();
        let mut buffer = [0u8; 4096];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(len) => {
                    exchanges += 1;
                    let command = String::from_utf8_lossy(&buffer[..len]).into_owned();
                    let reply = if command.starts_with("GET_FINAL_TIMES") {
                        "0 1.25 2.5 3.5".to_string()
                    } else if let Some(t) = command.strip_prefix("GET_PITCH_THRUST ") {
                        let t: f64 = t.trim().parse().unwrap();
                        format!("{t} {} {}", 1.0 - t * 0.1, 90.0 - t * 10.0)
                    } else {
                        "ok".to_string()
                    };
                    if stream.write_all(reply.as_bytes()).is_err() {
                        break;
                    }
                }
            }
        }
        exchanges
    });
    (addr, handle)
}

fn demo_vessel() -> (VesselGraph, aptor::vessel::PartId) {
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

fn run_to_completion(controller: &mut ComputationController) {
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        controller.tick();
        if controller.state() == ComputationState::Waiting {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!(
        "computation did not finish, state = {}",
        controller.state()
    );
}

// =============================================================================
// Integration Tests
// =============================================================================

#[test]
fn test_full_computation_round_trip() {
    let (addr, solver) = spawn_scripted_solver();
    let endpoint = SolverEndpoint::new(addr.ip().to_string(), addr.port());
    let factory = TcpSessionFactory::with_config(
        endpoint,
        SessionConfig {
            idle_poll: Duration::from_millis(5),
            reply_buffer: 4096,
        },
    );

    let (graph, root) = demo_vessel();
    let rocket = aggregate(&graph, root);
    assert_eq!(rocket.stages.len(), 2);
    assert_eq!(rocket.engines.len(), 2);

    let mut controller =
        ComputationController::new(AscentConfig::default(), Box::new(factory));
    controller.start(&rocket).unwrap();
    assert_eq!(controller.state(), ComputationState::DoingComputation);

    run_to_completion(&mut controller);

    assert_eq!(controller.outcome(), Some(ComputationOutcome::Complete));
    assert!(controller.last_error().is_none());

    // total time 3.5 -> samples at t = 0, 1, 2, 3.
    let ascent = controller.ascent();
    assert_eq!(ascent.len(), 4);
    assert_eq!(ascent[0].time, 0.0);
    assert_eq!(ascent[0].thrust, 1.0);
    assert_eq!(ascent[0].pitch, 90.0);
    assert_eq!(ascent[3].time, 3.0);
    assert!((ascent[3].thrust - 0.7).abs() < 1e-9);
    assert!((ascent[3].pitch - 60.0).abs() < 1e-9);

    // A fresh computation may start once the worker was retired.
    assert!(controller.can_start());

    let exchanges = solver.join().unwrap();
    // Batch + GET_FINAL_TIMES + 4 samples, every one answered.
    assert!(exchanges > 10);
}

#[test]
fn test_start_against_dead_solver_aborts() {
    // A port with nothing listening: connect fails on the worker and the
    // controller aborts instead of hanging.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = SolverEndpoint::new(addr.ip().to_string(), addr.port());
    let factory = TcpSessionFactory::with_config(
        endpoint,
        SessionConfig {
            idle_poll: Duration::from_millis(5),
            reply_buffer: 4096,
        },
    );

    let (graph, root) = demo_vessel();
    let rocket = aggregate(&graph, root);
    let mut controller =
        ComputationController::new(AscentConfig::default(), Box::new(factory));
    controller.start(&rocket).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while controller.outcome().is_none() && Instant::now() < deadline {
        controller.tick();
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(controller.outcome(), Some(ComputationOutcome::Aborted));
    assert!(controller.ascent().is_empty());
}

#[test]
fn test_restart_rejected_only_while_in_flight() {
    let (addr, solver) = spawn_scripted_solver();
    let endpoint = SolverEndpoint::new(addr.ip().to_string(), addr.port());
    let factory = TcpSessionFactory::with_config(
        endpoint,
        SessionConfig {
            idle_poll: Duration::from_millis(5),
            reply_buffer: 4096,
        },
    );

    let (graph, root) = demo_vessel();
    let rocket = aggregate(&graph, root);
    let mut controller =
        ComputationController::new(AscentConfig::default(), Box::new(factory));

    controller.start(&rocket).unwrap();
    assert!(controller.start(&rocket).is_err(), "in-flight start rejected");

    run_to_completion(&mut controller);
    solver.join().unwrap();

    assert!(controller.can_start(), "fresh start allowed after retirement");
}
