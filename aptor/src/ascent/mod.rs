//! Ascent computation - the state machine driving one solver session.
//!
//! A computation is a fixed conversation with the solver: describe the
//! planet and the rocket, ask for a trajectory, then harvest the
//! discretized pitch/thrust profile. The controller owns the sequencing;
//! the session worker owns the socket. The controller runs entirely on
//! the host's coordination tick and never blocks.
//!
//! # State Machine
//!
//! ```text
//! PreInit ──start──> Starting ──batch queued──> DoingComputation
//!                                                     │ queue drained
//!                                                     ▼
//!                        GettingResults <── GettingTimes
//!                             │ answers drained
//!                             ▼
//!                    ComputationFinished ──worker retired──> Waiting
//! ```
//!
//! A new computation may start from `PreInit`, `Starting`, `Waiting` or
//! `ComputationFinished`; starting anywhere else is rejected and reported,
//! never queued.

mod config;
mod controller;
mod state;

pub use config::{AscentConfig, LaunchSite, PlanetConfig};
pub use controller::{AscentError, ComputationController};
pub use state::{AscentPoint, ComputationOutcome, ComputationState};
