//! Computation configuration.
//!
//! Groups the parameters sent ahead of every computation. Defaults match
//! the home planet and its space center pad; hosts targeting another body
//! override [`PlanetConfig`] wholesale.

/// Physical parameters of the body being launched from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetConfig {
    /// Mass in kg.
    pub mass: f64,
    /// Equatorial radius in m.
    pub radius: f64,
    /// Atmospheric scale height in m.
    pub scale_height: f64,
    /// Surface pressure in atm.
    pub surface_pressure: f64,
    /// Sidereal rotation period in s.
    pub rotation_period: f64,
    /// Sphere-of-influence radius in m.
    pub soi: f64,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            mass: 5.2915158e22,
            radius: 600_000.0,
            scale_height: 5_000.0,
            surface_pressure: 1.0,
            rotation_period: 21_600.0,
            soi: 84_159_286.0,
        }
    }
}

/// Where the rocket lifts off.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSite {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude above sea level in m.
    pub altitude: f64,
}

impl Default for LaunchSite {
    fn default() -> Self {
        // The space center launch pad.
        Self {
            latitude: -0.0972,
            longitude: -74.5577,
            altitude: 72.0,
        }
    }
}

/// Everything the solver needs besides the rocket itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AscentConfig {
    /// Launch body parameters.
    pub planet: PlanetConfig,
    /// Launch site coordinates.
    pub launch_site: LaunchSite,
    /// Velocity cap during ascent, in m/s.
    pub max_velocity: f64,
    /// Run name reported to the solver.
    pub name: String,
    /// Target periapsis in m.
    pub target_periapsis: f64,
    /// Optimizer iteration budget.
    pub iterations: u32,
    /// Mesh node counts for the two trajectory phases.
    pub nodes: (u32, u32),
    /// Optimizer convergence tolerance.
    pub nlp_tolerance: f64,
}

impl Default for AscentConfig {
    fn default() -> Self {
        Self {
            planet: PlanetConfig::default(),
            launch_site: LaunchSite::default(),
            max_velocity: 2_200.0,
            name: "ascent".to_string(),
            target_periapsis: 75_000.0,
            iterations: 200,
            nodes: (20, 20),
            nlp_tolerance: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_low_orbit() {
        let config = AscentConfig::default();
        assert!(config.target_periapsis > config.planet.scale_height);
        assert!(config.target_periapsis < config.planet.soi);
    }

    #[test]
    fn test_default_pad_is_near_the_equator() {
        let site = LaunchSite::default();
        assert!(site.latitude.abs() < 1.0);
    }
}
