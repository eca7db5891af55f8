//! Typed solver requests.

/// One request understood by the solver.
///
/// The `Display` impl renders the exact wire line; nothing is appended
/// beyond the transport's own framing.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverCommand {
    /// Planet mass in kg.
    PlanetMass(f64),
    /// Planet radius in m.
    PlanetRadius(f64),
    /// Atmospheric scale height in m.
    PlanetScaleHeight(f64),
    /// Surface pressure in atm.
    PlanetP0(f64),
    /// Sidereal rotation period in s.
    PlanetRotationPeriod(f64),
    /// Sphere-of-influence radius in m.
    PlanetSoi(f64),
    /// One stage: cumulative initial mass, burnable fuel mass, drag.
    AddStage {
        initial_mass: f64,
        fuel_mass: f64,
        drag: f64,
    },
    /// One engine firing during the most recently added stage.
    AddEngine {
        thrust: f64,
        isp_sea_level: f64,
        isp_vacuum: f64,
    },
    /// Launch site latitude in degrees.
    LaunchLatitude(f64),
    /// Launch site longitude in degrees.
    LaunchLongitude(f64),
    /// Launch site altitude in m.
    LaunchAltitude(f64),
    /// Velocity cap in m/s.
    MaxVelocity(f64),
    /// Free-form run name.
    Name(String),
    /// Target periapsis in m.
    TargetPeriapsis(f64),
    /// Optimizer iteration budget.
    Iterations(u32),
    /// Mesh node counts.
    SetNodes(u32, u32),
    /// Manual mesh refinement - the only mode ever sent.
    MeshRefinementManual,
    /// Optimizer convergence tolerance.
    NlpTolerance(f64),
    /// Start the optimization run.
    Compute,
    /// Post-process the converged trajectory.
    Postprocess,
    /// Ask for the per-phase end times; the last float is the total
    /// ascent time.
    GetFinalTimes,
    /// Ask for the discretized sample at second `t`.
    GetPitchThrust(u64),
}

impl std::fmt::Display for SolverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlanetMass(kg) => write!(f, "PLANET_MASS {kg}"),
            Self::PlanetRadius(m) => write!(f, "PLANET_RADIUS {m}"),
            Self::PlanetScaleHeight(m) => write!(f, "PLANET_SCALE_HEIGHT {m}"),
            Self::PlanetP0(atm) => write!(f, "PLANET_P0 {atm}"),
            Self::PlanetRotationPeriod(s) => write!(f, "PLANET_ROTATION_PERIOD {s}"),
            Self::PlanetSoi(m) => write!(f, "PLANET_SOI {m}"),
            Self::AddStage {
                initial_mass,
                fuel_mass,
                drag,
            } => write!(f, "ADD_STAGE {initial_mass} {fuel_mass} {drag}"),
            Self::AddEngine {
                thrust,
                isp_sea_level,
                isp_vacuum,
            } => write!(f, "ADD_ENGINE {thrust} {isp_sea_level} {isp_vacuum}"),
            Self::LaunchLatitude(deg) => write!(f, "LAUNCH_LATITUDE {deg}"),
            Self::LaunchLongitude(deg) => write!(f, "LAUNCH_LONGITUDE {deg}"),
            Self::LaunchAltitude(m) => write!(f, "LAUNCH_ALTITUDE {m}"),
            Self::MaxVelocity(ms) => write!(f, "MAX_VELOCITY {ms}"),
            Self::Name(name) => write!(f, "NAME {name}"),
            Self::TargetPeriapsis(m) => write!(f, "TARGET_PERIAPSIS {m}"),
            Self::Iterations(n) => write!(f, "ITERATIONS {n}"),
            Self::SetNodes(a, b) => write!(f, "SET_NODES {a} {b}"),
            Self::MeshRefinementManual => write!(f, "MESH_REFINEMENT manual"),
            Self::NlpTolerance(tol) => write!(f, "NLP_TOLERANCE {tol}"),
            Self::Compute => write!(f, "COMPUTE"),
            Self::Postprocess => write!(f, "POSTPROCESS"),
            Self::GetFinalTimes => write!(f, "GET_FINAL_TIMES"),
            Self::GetPitchThrust(t) => write!(f, "GET_PITCH_THRUST {t}"),
        }
    }
}
