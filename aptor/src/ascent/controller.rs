//! The computation controller.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::rocket::Rocket;
use crate::solver::response::{parse_final_times, ResponseError};
use crate::solver::{SessionError, SessionFactory, SolverCommand, SolverLink};

use super::config::AscentConfig;
use super::state::{AscentPoint, ComputationOutcome, ComputationState};

/// Why a computation could not start or did not complete.
#[derive(Debug, Error)]
pub enum AscentError {
    /// `start` was called during an ascent calculation.
    #[error("a computation is already in progress")]
    ComputationInProgress,

    /// The worker of the previous computation has not reported finished.
    #[error("the previous solver worker is still running")]
    WorkerStillRunning,

    /// The solver session ended before the expected answer arrived.
    #[error("the solver session ended before answering")]
    SessionEnded,

    /// Opening a session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A solver answer failed strict positional parsing.
    #[error("unparseable solver answer: {0}")]
    Response(#[from] ResponseError),
}

/// Sequences one solver conversation per computation.
///
/// Driven by the host's periodic coordination tick; every method is
/// non-blocking. The controller owns the [`ComputationState`] exclusively
/// and talks to the worker only through the [`SolverLink`] queues, so the
/// host can tick it from a single thread forever.
///
/// Only the primary device is entitled to own a controller; on losing
/// leadership mid-computation the host calls [`cancel`](Self::cancel),
/// which shuts the worker down cooperatively and keeps partial results
/// readable.
pub struct ComputationController {
    config: AscentConfig,
    factory: Box<dyn SessionFactory>,
    state: ComputationState,
    session: Option<Box<dyn SolverLink>>,
    ascent: Vec<AscentPoint>,
    outcome: Option<ComputationOutcome>,
    last_error: Option<AscentError>,
}

impl ComputationController {
    /// Create a controller that opens sessions through `factory`.
    pub fn new(config: AscentConfig, factory: Box<dyn SessionFactory>) -> Self {
        Self {
            config,
            factory,
            state: ComputationState::PreInit,
            session: None,
            ascent: Vec::new(),
            outcome: None,
            last_error: None,
        }
    }

    /// Current phase of the computation.
    pub fn state(&self) -> ComputationState {
        self.state
    }

    /// How the last computation ended, once one has.
    pub fn outcome(&self) -> Option<ComputationOutcome> {
        self.outcome
    }

    /// The error that aborted the last computation, if any.
    pub fn last_error(&self) -> Option<&AscentError> {
        self.last_error.as_ref()
    }

    /// The ascent profile computed so far.
    ///
    /// Append-only during a computation; cleared when the next one starts.
    pub fn ascent(&self) -> &[AscentPoint] {
        &self.ascent
    }

    /// Whether a new computation may start right now.
    pub fn can_start(&self) -> bool {
        self.state.can_start()
            && self
                .session
                .as_ref()
                .map(|s| s.is_finished())
                .unwrap_or(true)
    }

    /// Begin a new computation for `rocket`.
    ///
    /// Opens a fresh session, queues the whole command batch and enters
    /// `DoingComputation`. Rejected synchronously - with no state change
    /// and nothing enqueued - while a computation is in flight or while
    /// the previous worker is still running.
    pub fn start(&mut self, rocket: &Rocket) -> Result<(), AscentError> {
        if self.state.in_flight() {
            warn!(state = %self.state, "computation start rejected during ascent calculation");
            return Err(AscentError::ComputationInProgress);
        }
        if let Some(session) = &self.session {
            if !session.is_finished() {
                warn!("computation start rejected, previous worker still running");
                return Err(AscentError::WorkerStillRunning);
            }
        }

        // The previous worker has finished; retiring it joins quickly.
        self.session = None;
        let session = self.factory.open()?;

        self.state = ComputationState::Starting;
        self.ascent.clear();
        self.outcome = None;
        self.last_error = None;

        let batch = self.command_batch(rocket);
        let commands = batch.len();
        for command in batch {
            session.add_command(command.to_string());
        }
        self.session = Some(session);
        self.state = ComputationState::DoingComputation;
        info!(
            commands,
            stages = rocket.stages.len(),
            engines = rocket.engines.len(),
            "computation started"
        );
        Ok(())
    }

    /// Advance the state machine one step.
    ///
    /// Called once per coordination cycle by the host scheduler. Inspects
    /// the session's queue state and either pushes the next commands or
    /// harvests results; does nothing when there is nothing to do.
    pub fn tick(&mut self) {
        self.retire_finished_worker();
        match self.state {
            ComputationState::DoingComputation => self.tick_doing_computation(),
            ComputationState::GettingTimes => self.tick_getting_times(),
            ComputationState::GettingResults => self.tick_getting_results(),
            _ => {}
        }
    }

    /// Cancel an in-flight computation cooperatively.
    ///
    /// Called by the host when the owning device loses leadership (or on
    /// any other teardown). Partial results stay readable; the worker
    /// stops between exchanges.
    pub fn cancel(&mut self) {
        if self.state.in_flight() {
            info!(state = %self.state, "computation cancelled");
            self.finish(ComputationOutcome::Aborted);
        }
    }

    /// The full command batch for one computation.
    fn command_batch(&self, rocket: &Rocket) -> Vec<SolverCommand> {
        let planet = &self.config.planet;
        let site = &self.config.launch_site;
        let mut batch = vec![
            SolverCommand::PlanetMass(planet.mass),
            SolverCommand::PlanetRadius(planet.radius),
            SolverCommand::PlanetScaleHeight(planet.scale_height),
            SolverCommand::PlanetP0(planet.surface_pressure),
            SolverCommand::PlanetRotationPeriod(planet.rotation_period),
            SolverCommand::PlanetSoi(planet.soi),
        ];

        // Stages go out in firing order: highest index first, each stage
        // line followed by every engine firing during that stage.
        for index in (0..rocket.stages.len()).rev() {
            let stage = &rocket.stages[index];
            batch.push(SolverCommand::AddStage {
                initial_mass: stage.initial_mass,
                fuel_mass: stage.fuel_mass,
                drag: stage.drag,
            });
            for engine in rocket.engines_for_stage(index) {
                batch.push(SolverCommand::AddEngine {
                    thrust: engine.thrust,
                    isp_sea_level: engine.isp_sea_level,
                    isp_vacuum: engine.isp_vacuum,
                });
            }
        }

        batch.extend([
            SolverCommand::LaunchLatitude(site.latitude),
            SolverCommand::LaunchLongitude(site.longitude),
            SolverCommand::LaunchAltitude(site.altitude),
            SolverCommand::MaxVelocity(self.config.max_velocity),
            SolverCommand::Name(self.config.name.clone()),
            SolverCommand::TargetPeriapsis(self.config.target_periapsis),
            SolverCommand::Iterations(self.config.iterations),
            SolverCommand::SetNodes(self.config.nodes.0, self.config.nodes.1),
            SolverCommand::MeshRefinementManual,
            SolverCommand::NlpTolerance(self.config.nlp_tolerance),
            SolverCommand::Compute,
            SolverCommand::Postprocess,
        ]);
        batch
    }

    /// Retire a worker that has reported finished, enabling a fresh
    /// session on the next computation.
    fn retire_finished_worker(&mut self) {
        if self.state != ComputationState::ComputationFinished {
            return;
        }
        let finished = self
            .session
            .as_ref()
            .map(|s| s.is_finished())
            .unwrap_or(false);
        if finished {
            self.session = None;
            self.state = ComputationState::Waiting;
            debug!("solver worker retired");
        }
    }

    fn tick_doing_computation(&mut self) {
        enum Step {
            BatchDrained,
            WorkerDied,
        }
        let step = {
            let Some(session) = self.session.as_deref() else {
                return;
            };
            if session.input_queue_empty() {
                // Drop any answers to the setup batch so the next answer
                // read is really the reply to GET_FINAL_TIMES.
                session.clear_answers();
                session.add_command(SolverCommand::GetFinalTimes.to_string());
                Step::BatchDrained
            } else if session.is_finished() {
                Step::WorkerDied
            } else {
                return;
            }
        };
        match step {
            Step::BatchDrained => {
                self.state = ComputationState::GettingTimes;
                debug!("command batch drained, requesting final times");
            }
            Step::WorkerDied => self.abort(AscentError::SessionEnded),
        }
    }

    fn tick_getting_times(&mut self) {
        enum Step {
            Answer(String),
            WorkerDied,
        }
        let step = {
            let Some(session) = self.session.as_deref() else {
                return;
            };
            if session.input_queue_empty() {
                match session.next_answer() {
                    Some(answer) => Step::Answer(answer),
                    None if session.is_finished() => Step::WorkerDied,
                    None => return,
                }
            } else if session.is_finished() {
                Step::WorkerDied
            } else {
                return;
            }
        };

        let answer = match step {
            Step::Answer(answer) => answer,
            Step::WorkerDied => return self.abort(AscentError::SessionEnded),
        };
        match parse_final_times(&answer) {
            Ok(total) => {
                let total_secs = total.floor() as u64;
                if let Some(session) = self.session.as_deref() {
                    for t in 0..=total_secs {
                        session.add_command(SolverCommand::GetPitchThrust(t).to_string());
                    }
                }
                self.state = ComputationState::GettingResults;
                info!(total_time = total, samples = total_secs + 1, "requesting ascent profile");
            }
            Err(e) => self.abort(e.into()),
        }
    }

    fn tick_getting_results(&mut self) {
        let (worker_died, answers) = {
            let Some(session) = self.session.as_deref() else {
                return;
            };
            let drained = session.input_queue_empty();
            let finished = session.is_finished();
            if !drained && !finished {
                return;
            }
            let mut answers = Vec::new();
            while let Some(answer) = session.next_answer() {
                answers.push(answer);
            }
            (finished && !drained, answers)
        };

        for answer in answers {
            match AscentPoint::from_answer(&answer) {
                Ok(point) => self.ascent.push(point),
                Err(e) => return self.abort(e.into()),
            }
        }
        if worker_died {
            return self.abort(AscentError::SessionEnded);
        }
        info!(points = self.ascent.len(), "ascent profile complete");
        self.finish(ComputationOutcome::Complete);
    }

    /// Abort the current computation, keeping partial results.
    fn abort(&mut self, error: AscentError) {
        warn!(error = %error, points = self.ascent.len(), "computation aborted");
        self.last_error = Some(error);
        self.finish(ComputationOutcome::Aborted);
    }

    fn finish(&mut self, outcome: ComputationOutcome) {
        if let Some(session) = &self.session {
            session.request_shutdown();
        }
        self.outcome = Some(outcome);
        self.state = ComputationState::ComputationFinished;
    }
}
