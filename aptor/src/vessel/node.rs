//! Part node data model.

/// Handle to a part within a [`VesselTree`](super::VesselTree).
///
/// Only meaningful together with the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

/// Thrust and efficiency figures for an engine-capable part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSpec {
    /// Maximum thrust in kN.
    pub max_thrust: f64,
    /// Specific impulse at sea level (1 atm), in seconds.
    pub isp_sea_level: f64,
    /// Specific impulse in vacuum, in seconds.
    pub isp_vacuum: f64,
}

/// Capability tag for a part.
///
/// Replaces dynamic "does this part carry an engine/decoupler module"
/// lookups with an explicit enum the host fills in when building the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartCapability {
    /// The part produces thrust.
    Engine(EngineSpec),
    /// The part separates the stages above it from the stages below.
    Decoupler,
}

/// A resource carried by a part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartResource {
    /// Resource name, e.g. [`PartResource::LIQUID_FUEL`].
    pub name: String,
    /// Amount in resource units.
    pub amount: f64,
    /// Mass of the carried amount, in tonnes.
    pub mass: f64,
}

impl PartResource {
    /// Resource name of liquid fuel.
    pub const LIQUID_FUEL: &'static str = "LiquidFuel";
    /// Resource name of oxidizer.
    pub const OXIDIZER: &'static str = "Oxidizer";

    /// Create a resource entry.
    pub fn new(name: impl Into<String>, amount: f64, mass: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            mass,
        }
    }
}

/// One part of the vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct PartNode {
    /// Human-readable part title. Matched exactly against the
    /// structural-part denylist during aggregation.
    pub title: String,
    /// Stage index declared by the host staging UI. For engines this is the
    /// ignition stage; for decouplers the stage being separated.
    pub declared_stage: usize,
    /// Dry mass in tonnes.
    pub dry_mass: f64,
    /// Capability tags. Empty for plain structural parts.
    pub capabilities: Vec<PartCapability>,
    /// Resources carried by this part.
    pub resources: Vec<PartResource>,
}

impl PartNode {
    /// Create a plain part with no capabilities or resources.
    pub fn new(title: impl Into<String>, declared_stage: usize, dry_mass: f64) -> Self {
        Self {
            title: title.into(),
            declared_stage,
            dry_mass,
            capabilities: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Add a capability tag.
    pub fn with_capability(mut self, capability: PartCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a carried resource.
    pub fn with_resource(mut self, resource: PartResource) -> Self {
        self.resources.push(resource);
        self
    }

    /// The engine spec, if this part produces thrust.
    pub fn engine(&self) -> Option<&EngineSpec> {
        self.capabilities.iter().find_map(|c| match c {
            PartCapability::Engine(spec) => Some(spec),
            PartCapability::Decoupler => None,
        })
    }

    /// Whether this part separates stages.
    pub fn is_decoupler(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| matches!(c, PartCapability::Decoupler))
    }

    /// Total mass of carried resources, in tonnes.
    pub fn resource_mass(&self) -> f64 {
        self.resources.iter().map(|r| r.mass).sum()
    }

    /// Carried liquid fuel, in resource units.
    pub fn liquid_fuel(&self) -> f64 {
        self.resource_amount(PartResource::LIQUID_FUEL)
    }

    /// Carried oxidizer, in resource units.
    pub fn oxidizer(&self) -> f64 {
        self.resource_amount(PartResource::OXIDIZER)
    }

    fn resource_amount(&self, name: &str) -> f64 {
        self.resources
            .iter()
            .filter(|r| r.name == name)
            .map(|r| r.amount)
            .sum()
    }
}
