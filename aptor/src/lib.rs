//! Aptor - ascent trajectory coordination for staged rockets
//!
//! This library coordinates peer device modules mounted on a shared vessel
//! tree so that exactly one of them drives a long-running ascent
//! optimization performed by an external solver over TCP.
//!
//! # High-Level Flow
//!
//! ```text
//! vessel mutation ──> device::DeviceRegistry ──> LeadershipEvent
//!                                                     │ (primary only)
//! user action ──> ascent::ComputationController ──────┤
//!                      │ aggregate               tick │
//!                      ▼                              ▼
//!                 rocket::Rocket ──commands──> solver::SolverSession
//!                                                     │ worker thread
//!                                                     ▼
//!                                              external solver (TCP)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use aptor::ascent::{AscentConfig, ComputationController};
//! use aptor::rocket::aggregate;
//! use aptor::solver::{SolverEndpoint, TcpSessionFactory};
//!
//! let rocket = aggregate(&tree, root)?;
//! let factory = TcpSessionFactory::new(SolverEndpoint::new(addr));
//! let mut controller = ComputationController::new(AscentConfig::default(), Box::new(factory));
//! controller.start(&rocket)?;
//! loop {
//!     controller.tick();
//!     // ... host scheduler delay ...
//! }
//! ```
//!
//! # Components
//!
//! - [`vessel`] - Read-only interface to the externally-owned part tree
//! - [`device`] - Peer device instances and leader election
//! - [`rocket`] - Per-stage mass/fuel/engine aggregation
//! - [`solver`] - Wire protocol and the blocking session worker
//! - [`ascent`] - The computation state machine driving a session

pub mod ascent;
pub mod device;
pub mod rocket;
pub mod solver;
pub mod vessel;

/// Version of the Aptor library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
