//! Physical models, one per simulation kind.
//!
//! Every kind implements [`Dynamics`]: equations of motion, event detection,
//! event resolution and observation over a flat state vector laid out as
//! `[positions..., velocities...]`. [`System`] is the tagged variant the
//! engine dispatches through.

pub mod atwood;
pub mod collision;
pub mod harmonic;
pub mod projectile;
pub mod rotation;

pub use atwood::Atwood;
pub use collision::Collision;
pub use harmonic::Harmonic;
pub use projectile::Projectile;
pub use rotation::{Rotation, Shape};

use crate::error::{Result, SimError};
use crate::event::Event;
use crate::integrator::Method;
use crate::params::{find_spec, ParamSpec, ParameterSet};
use crate::snapshot::Observation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The simulation kinds offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationKind {
    #[serde(rename = "projectile")]
    Projectile,
    #[serde(rename = "sho", alias = "harmonic")]
    Sho,
    #[serde(rename = "collision", alias = "collision1d")]
    Collision1D,
    #[serde(rename = "atwood")]
    Atwood,
    #[serde(rename = "rotation", alias = "rigid_rotation")]
    RigidRotation,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 5] = [
        SimulationKind::Projectile,
        SimulationKind::Sho,
        SimulationKind::Collision1D,
        SimulationKind::Atwood,
        SimulationKind::RigidRotation,
    ];

    /// Length of the state vector for this kind.
    pub fn dimension(self) -> usize {
        match self {
            SimulationKind::Projectile => 4,
            SimulationKind::Sho => 2,
            SimulationKind::Collision1D => 4,
            SimulationKind::Atwood => 4,
            SimulationKind::RigidRotation => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimulationKind::Projectile => "projectile",
            SimulationKind::Sho => "sho",
            SimulationKind::Collision1D => "collision",
            SimulationKind::Atwood => "atwood",
            SimulationKind::RigidRotation => "rotation",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SimulationKind::Projectile => "Projectile Motion",
            SimulationKind::Sho => "Simple Harmonic Motion",
            SimulationKind::Collision1D => "Elastic Collisions",
            SimulationKind::Atwood => "Atwood's Machine",
            SimulationKind::RigidRotation => "Rigid Body Rotation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SimulationKind::Projectile => "Simulate projectile trajectories with adjustable parameters",
            SimulationKind::Sho => "Simulate a mass-spring system with energy readouts",
            SimulationKind::Collision1D => {
                "Study conservation of energy and momentum in 1-D collisions"
            }
            SimulationKind::Atwood => "Two masses connected by a string over a pulley",
            SimulationKind::RigidRotation => {
                "Rotational motion of objects with different mass distributions"
            }
        }
    }

    /// Parameter catalogue of this kind.
    pub fn specs(self) -> &'static [ParamSpec] {
        match self {
            SimulationKind::Projectile => projectile::SPECS,
            SimulationKind::Sho => harmonic::SPECS,
            SimulationKind::Collision1D => collision::SPECS,
            SimulationKind::Atwood => atwood::SPECS,
            SimulationKind::RigidRotation => rotation::SPECS,
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "projectile" => Ok(SimulationKind::Projectile),
            "sho" | "harmonic" | "shm" => Ok(SimulationKind::Sho),
            "collision" | "collision1d" => Ok(SimulationKind::Collision1D),
            "atwood" => Ok(SimulationKind::Atwood),
            "rotation" | "rigid_rotation" => Ok(SimulationKind::RigidRotation),
            other => Err(SimError::Config(format!("unknown simulation kind '{other}'"))),
        }
    }
}

/// Uniform capability every simulation kind provides to the engine.
pub trait Dynamics {
    fn kind(&self) -> SimulationKind;

    fn specs(&self) -> &'static [ParamSpec] {
        self.kind().specs()
    }

    /// Current value of a named parameter.
    fn get(&self, name: &str) -> Option<f64>;

    /// Store a parameter value. Domain checks happen in [`set_checked`].
    fn set(&mut self, name: &str, value: f64) -> Result<()>;

    /// Cross-field checks and anything the derivative would divide by.
    fn validate(&self) -> Result<()>;

    /// State vector at time zero for the current parameters.
    fn initial_state(&self) -> Vec<f64>;

    fn default_method(&self) -> Method;

    fn default_step_size(&self) -> f64;

    /// Fastest natural rate of the system in rad/s, if it has one.
    fn characteristic_frequency(&self) -> Option<f64> {
        None
    }

    /// Time derivative of `state`, written into `out`.
    fn derivative(&self, state: &[f64], out: &mut [f64]);

    /// Events that happened between `prev` and `next`. Must not mutate.
    fn detect(&self, prev: &[f64], next: &[f64], dt: f64) -> Vec<Event>;

    /// Apply the instantaneous correction for one event.
    fn resolve(&mut self, state: &mut [f64], event: &Event, time: f64) -> Result<()>;

    /// Whether total energy should stay constant for the current parameters.
    fn tracks_energy_drift(&self) -> bool {
        false
    }

    fn observe(&self, state: &[f64]) -> Observation;
}

/// Validate `value` against the spec for `name`, then store it.
pub fn set_checked(dynamics: &mut dyn Dynamics, name: &str, value: f64) -> Result<()> {
    find_spec(dynamics.specs(), name)?.validate(value)?;
    dynamics.set(name, value)
}

/// Snapshot of every parameter by name.
pub fn parameter_set(dynamics: &dyn Dynamics) -> ParameterSet {
    dynamics
        .specs()
        .iter()
        .filter_map(|s| dynamics.get(s.name).map(|v| (s.name.to_string(), v)))
        .collect()
}

pub(crate) fn unexpected_event(kind: SimulationKind, event: &Event) -> SimError {
    SimError::UnresolvableEvent(format!("{kind} cannot resolve {} event {event:?}", event.label()))
}

/// Tagged variant over the simulation kinds.
#[derive(Debug, Clone)]
pub enum System {
    Projectile(Projectile),
    Sho(Harmonic),
    Collision1D(Collision),
    Atwood(Atwood),
    RigidRotation(Rotation),
}

impl System {
    /// A system of `kind` with default parameters.
    pub fn new(kind: SimulationKind) -> Self {
        match kind {
            SimulationKind::Projectile => System::Projectile(Projectile::default()),
            SimulationKind::Sho => System::Sho(Harmonic::default()),
            SimulationKind::Collision1D => System::Collision1D(Collision::default()),
            SimulationKind::Atwood => System::Atwood(Atwood::default()),
            SimulationKind::RigidRotation => System::RigidRotation(Rotation::default()),
        }
    }

    /// Defaults overlaid with `params`, validated as a whole.
    pub fn with_parameters(kind: SimulationKind, params: &ParameterSet) -> Result<Self> {
        let mut system = System::new(kind);
        for (name, value) in params {
            set_checked(system.dynamics_mut(), name, *value)?;
        }
        system.dynamics().validate()?;
        Ok(system)
    }

    pub fn dynamics(&self) -> &dyn Dynamics {
        match self {
            System::Projectile(s) => s,
            System::Sho(s) => s,
            System::Collision1D(s) => s,
            System::Atwood(s) => s,
            System::RigidRotation(s) => s,
        }
    }

    pub fn dynamics_mut(&mut self) -> &mut dyn Dynamics {
        match self {
            System::Projectile(s) => s,
            System::Sho(s) => s,
            System::Collision1D(s) => s,
            System::Atwood(s) => s,
            System::RigidRotation(s) => s,
        }
    }

    pub fn kind(&self) -> SimulationKind {
        self.dynamics().kind()
    }
}
