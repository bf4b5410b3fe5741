//! Read-only per-frame state handed to the presentation layer.

use crate::event::Event;
use crate::models::SimulationKind;
use glam::DVec2;

/// Render-facing view of one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub label: &'static str,
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: f64,
    pub angular_velocity: f64,
}

impl Body {
    /// A body moving along a straight line.
    pub fn linear(label: &'static str, position: DVec2, velocity: DVec2) -> Self {
        Self {
            label,
            position,
            velocity,
            angle: 0.0,
            angular_velocity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy {
    pub kinetic: f64,
    pub potential: f64,
}

impl Energy {
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }
}

/// Named kind-specific readout (tension, period, revolutions...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub name: &'static str,
    pub unit: &'static str,
    pub value: f64,
}

impl Quantity {
    pub fn new(name: &'static str, unit: &'static str, value: f64) -> Self {
        Self { name, unit, value }
    }
}

/// Non-fatal conditions observed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    NumericInstability { magnitude: f64 },
    StepClamped { from: f64, to: f64 },
    EnergyDrift { relative: f64 },
    RejectedUpdate { name: String, reason: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NumericInstability { magnitude } => {
                write!(f, "numeric instability: state magnitude {magnitude:.3e}")
            }
            Warning::StepClamped { from, to } => {
                write!(f, "step size clamped from {from:.5} s to {to:.5} s")
            }
            Warning::EnergyDrift { relative } => {
                write!(f, "total energy drifted by {:.2}%", relative * 100.0)
            }
            Warning::RejectedUpdate { name, reason } => write!(f, "rejected '{name}': {reason}"),
        }
    }
}

/// What a model reports about a state, before the runner adds bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub bodies: Vec<Body>,
    pub energy: Energy,
    pub momentum: DVec2,
    pub quantities: Vec<Quantity>,
}

/// Immutable copy of a simulation at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub kind: SimulationKind,
    pub time: f64,
    pub step: u64,
    pub state: Vec<f64>,
    pub bodies: Vec<Body>,
    pub energy: Energy,
    pub momentum: DVec2,
    pub quantities: Vec<Quantity>,
    /// Events resolved during the tick that produced this snapshot.
    pub events: Vec<Event>,
    pub warnings: Vec<Warning>,
}

impl Snapshot {
    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.quantities.iter().find(|q| q.name == name).map(|q| q.value)
    }
}
