//! A rigid body spun up by a constant torque about a fixed axis.

use super::{unexpected_event, Dynamics, SimulationKind};
use crate::error::{Result, SimError};
use crate::event::{Axis, Event};
use crate::integrator::Method;
use crate::params::{Domain, Effect, ParamSpec};
use crate::snapshot::{Body, Energy, Observation, Quantity};
use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Mass distributions with a closed-form moment of inertia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    #[default]
    Disk,
    Ring,
    /// Thin rod of length 2r spinning about one end.
    Rod,
    Sphere,
}

/// Display names of the shapes, in index order.
pub const SHAPE_LABELS: &[&str] = &["Disk", "Ring", "Rod", "Sphere"];

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Disk, Shape::Ring, Shape::Rod, Shape::Sphere];

    pub fn from_index(index: f64) -> Option<Shape> {
        Shape::ALL.get(index as usize).copied().filter(|_| index >= 0.0)
    }

    pub fn index(self) -> usize {
        match self {
            Shape::Disk => 0,
            Shape::Ring => 1,
            Shape::Rod => 2,
            Shape::Sphere => 3,
        }
    }

    pub fn label(self) -> &'static str {
        SHAPE_LABELS[self.index()]
    }

    pub fn inertia(self, mass: f64, radius: f64) -> f64 {
        match self {
            Shape::Disk => 0.5 * mass * radius * radius,
            Shape::Ring => mass * radius * radius,
            Shape::Rod => mass * (2.0 * radius).powi(2) / 3.0,
            Shape::Sphere => 0.4 * mass * radius * radius,
        }
    }
}

pub const SPECS: &[ParamSpec] = &[
    ParamSpec {
        name: "mass",
        label: "Mass",
        unit: "kg",
        default: 1.0,
        domain: Domain::Positive,
        slider: (0.1, 10.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "radius",
        label: "Radius",
        unit: "m",
        default: 0.5,
        domain: Domain::Positive,
        slider: (0.1, 2.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "torque",
        label: "Torque",
        unit: "N·m",
        default: 1.0,
        domain: Domain::Range {
            min: -100.0,
            max: 100.0,
        },
        slider: (0.1, 5.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "shape",
        label: "Shape",
        unit: "",
        default: 0.0,
        domain: Domain::Choice(SHAPE_LABELS),
        slider: (0.0, 3.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "inertia",
        label: "Moment of Inertia",
        unit: "kg·m²",
        default: 0.0,
        domain: Domain::NonNegative,
        slider: (0.0, 5.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "friction",
        label: "Friction",
        unit: "N·m·s",
        default: 0.0,
        domain: Domain::NonNegative,
        slider: (0.0, 1.0),
        effect: Effect::Live,
    },
];

/// Turns kept on the dial before the angle is wrapped.
const WRAP_LIMIT: f64 = 4.0 * PI;

#[derive(Debug, Clone)]
pub struct Rotation {
    pub mass: f64,
    pub radius: f64,
    pub torque: f64,
    pub shape: Shape,
    /// Explicit moment of inertia; zero means use the shape formula.
    pub inertia: f64,
    pub friction: f64,
    turns: i64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.5,
            torque: 1.0,
            shape: Shape::Disk,
            inertia: 0.0,
            friction: 0.0,
            turns: 0,
        }
    }
}

impl Rotation {
    pub fn moment_of_inertia(&self) -> f64 {
        if self.inertia > 0.0 {
            self.inertia
        } else {
            self.shape.inertia(self.mass, self.radius)
        }
    }

    pub fn angular_acceleration(&self, omega: f64) -> f64 {
        (self.torque - self.friction * omega) / self.moment_of_inertia()
    }

    /// Total revolutions including the turns removed by wrapping.
    pub fn revolutions(&self, theta: f64) -> f64 {
        self.turns as f64 + theta / TAU
    }
}

impl Dynamics for Rotation {
    fn kind(&self) -> SimulationKind {
        SimulationKind::RigidRotation
    }

    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "mass" => self.mass,
            "radius" => self.radius,
            "torque" => self.torque,
            "shape" => self.shape.index() as f64,
            "inertia" => self.inertia,
            "friction" => self.friction,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "mass" => self.mass = value,
            "radius" => self.radius = value,
            "torque" => self.torque = value,
            "shape" => {
                self.shape = Shape::from_index(value)
                    .ok_or_else(|| SimError::invalid("shape", "unknown shape index"))?
            }
            "inertia" => self.inertia = value,
            "friction" => self.friction = value,
            _ => return Err(SimError::invalid(name, "unknown parameter")),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.inertia < 0.0 {
            return Err(SimError::invalid("inertia", "must be >= 0"));
        }
        if self.moment_of_inertia() <= 0.0 {
            return Err(SimError::invalid("mass", "moment of inertia must be > 0"));
        }
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        vec![0.0, 0.0]
    }

    fn default_method(&self) -> Method {
        Method::Rk4
    }

    fn default_step_size(&self) -> f64 {
        0.02
    }

    fn characteristic_frequency(&self) -> Option<f64> {
        (self.friction > 0.0).then(|| self.friction / self.moment_of_inertia())
    }

    fn derivative(&self, state: &[f64], out: &mut [f64]) {
        out[0] = state[1];
        out[1] = self.angular_acceleration(state[1]);
    }

    fn detect(&self, _prev: &[f64], next: &[f64], _dt: f64) -> Vec<Event> {
        let theta = next[0];
        if theta.abs() > WRAP_LIMIT {
            vec![Event::BoundaryCross {
                body: 0,
                axis: Axis::Angle,
                value: WRAP_LIMIT.copysign(theta),
            }]
        } else {
            Vec::new()
        }
    }

    fn resolve(&mut self, state: &mut [f64], event: &Event, _time: f64) -> Result<()> {
        match *event {
            Event::BoundaryCross {
                body: 0,
                axis: Axis::Angle,
                ..
            } => {
                let theta = state[0];
                let wrapped = theta.rem_euclid(TAU);
                self.turns += ((theta - wrapped) / TAU).round() as i64;
                state[0] = wrapped;
                Ok(())
            }
            _ => Err(unexpected_event(self.kind(), event)),
        }
    }

    fn tracks_energy_drift(&self) -> bool {
        false
    }

    fn observe(&self, state: &[f64]) -> Observation {
        let (theta, omega) = (state[0], state[1]);
        let inertia = self.moment_of_inertia();
        let rim = DVec2::from_angle(theta) * self.radius;
        let body = Body {
            label: self.shape.label(),
            position: DVec2::ZERO,
            velocity: rim.perp() * omega,
            angle: theta,
            angular_velocity: omega,
        };
        Observation {
            bodies: vec![body],
            energy: Energy {
                kinetic: 0.5 * inertia * omega * omega,
                potential: 0.0,
            },
            momentum: DVec2::ZERO,
            quantities: vec![
                Quantity::new("inertia", "kg·m²", inertia),
                Quantity::new("angular_acceleration", "rad/s²", self.angular_acceleration(omega)),
                Quantity::new("angular_momentum", "kg·m²/s", inertia * omega),
                Quantity::new("revolutions", "", self.revolutions(theta)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_inertia_factors() {
        assert_eq!(Shape::Disk.inertia(2.0, 1.0), 1.0);
        assert_eq!(Shape::Ring.inertia(2.0, 1.0), 2.0);
        assert!((Shape::Rod.inertia(3.0, 0.5) - 1.0).abs() < 1e-12);
        assert!((Shape::Sphere.inertia(1.0, 1.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn shape_parameter_labels_match_shapes() {
        let spec = SPECS.iter().find(|s| s.name == "shape").unwrap();
        for shape in Shape::ALL {
            assert_eq!(spec.domain.option_label(shape.index() as f64), Some(shape.label()));
        }
    }

    #[test]
    fn explicit_inertia_overrides_shape() {
        let r = Rotation {
            inertia: 2.0,
            ..Rotation::default()
        };
        assert_eq!(r.moment_of_inertia(), 2.0);
        assert_eq!(r.angular_acceleration(0.0), 0.5);
    }

    #[test]
    fn friction_reduces_angular_acceleration() {
        let r = Rotation {
            friction: 0.5,
            ..Rotation::default()
        };
        // I = 0.125
        assert!((r.angular_acceleration(2.0) - 0.0).abs() < 1e-12);
        assert_eq!(r.characteristic_frequency(), Some(4.0));
    }

    #[test]
    fn wrapping_keeps_revolution_count() {
        let mut r = Rotation::default();
        let mut state = vec![5.0 * PI, 10.0];
        let events = r.detect(&[3.9 * PI, 10.0], &state, 0.02);
        assert_eq!(events.len(), 1);
        r.resolve(&mut state, &events[0], 0.0).unwrap();
        assert!((state[0] - PI).abs() < 1e-12);
        assert!((r.revolutions(state[0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn shape_index_is_validated() {
        let mut r = Rotation::default();
        assert!(r.set("shape", 2.0).is_ok());
        assert_eq!(r.shape, Shape::Rod);
        assert!(Shape::from_index(7.0).is_none());
    }
}
