//! Core state types for the ascent computation.

use crate::solver::response::{parse_floats, ResponseError};

/// Phase of the computation conversation.
///
/// Owned exclusively by the controller; the session worker never touches
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputationState {
    /// No computation has run yet.
    #[default]
    PreInit,
    /// A computation is being set up and its command batch queued.
    Starting,
    /// The solver is working through the command batch.
    DoingComputation,
    /// Waiting for the answer to `GET_FINAL_TIMES`.
    GettingTimes,
    /// Harvesting the per-second `GET_PITCH_THRUST` answers.
    GettingResults,
    /// The computation ended; results (possibly partial) are readable.
    ComputationFinished,
    /// The worker has been retired; ready for a fresh computation.
    Waiting,
}

impl ComputationState {
    /// Whether a new computation may start from this state.
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            Self::PreInit | Self::Starting | Self::Waiting | Self::ComputationFinished
        )
    }

    /// Whether a computation is currently in flight.
    pub fn in_flight(&self) -> bool {
        matches!(
            self,
            Self::DoingComputation | Self::GettingTimes | Self::GettingResults
        )
    }
}

impl std::fmt::Display for ComputationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::PreInit => "pre-init",
            Self::Starting => "starting",
            Self::DoingComputation => "doing computation",
            Self::GettingTimes => "getting times",
            Self::GettingResults => "getting results",
            Self::ComputationFinished => "computation finished",
            Self::Waiting => "waiting",
        };
        f.write_str(label)
    }
}

/// How the last computation ended.
///
/// `ComputationFinished` alone does not say whether the ascent profile is
/// complete; this does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationOutcome {
    /// Every expected sample arrived and parsed.
    Complete,
    /// The computation was aborted or cancelled; the profile may be
    /// partial.
    Aborted,
}

/// One discretized sample of the computed ascent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AscentPoint {
    /// Sample time in seconds from liftoff.
    pub time: f64,
    /// Pitch angle in degrees.
    pub pitch: f64,
    /// Throttle as a 0-1 fraction of maximum thrust.
    pub thrust: f64,
    /// Altitude-track position in m, when the solver provides it.
    pub position: f64,
    /// Velocity in m/s, when the solver provides it.
    pub velocity: f64,
    /// Thrust vector angle in degrees, when the solver provides it.
    pub thrust_vector: f64,
    /// Vehicle mass in tonnes, when the solver provides it.
    pub mass: f64,
}

impl AscentPoint {
    /// Parse a `GET_PITCH_THRUST` answer.
    ///
    /// The first three fields are mandatory `time thrust pitch`; up to
    /// four optional trailing floats fill `position`, `velocity`,
    /// `thrust_vector` and `mass`, defaulting to 0 when the solver omits
    /// them. Field order is fixed by the protocol version; any malformed
    /// field is fatal for the computation.
    pub fn from_answer(answer: &str) -> Result<Self, ResponseError> {
        let fields = parse_floats(answer, 3)?;
        let field = |i: usize| fields.get(i).copied().unwrap_or(0.0);
        Ok(Self {
            time: fields[0],
            thrust: fields[1],
            pitch: fields[2],
            position: field(3),
            velocity: field(4),
            thrust_vector: field(5),
            mass: field(6),
        })
    }

    /// Human-readable one-line rendering, e.g. `12: 85.0% / 45.0°`.
    pub fn describe(&self) -> String {
        format!(
            "{}: {:.1}% / {:.1}°",
            self.time,
            self.thrust * 100.0,
            self.pitch
        )
    }
}
