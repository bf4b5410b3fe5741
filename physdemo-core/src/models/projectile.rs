//! Ballistic flight over a flat ground plane at y = 0.

use super::{unexpected_event, Dynamics, SimulationKind};
use crate::error::{Result, SimError};
use crate::event::{Axis, Constraint, Event};
use crate::integrator::Method;
use crate::params::{Domain, Effect, ParamSpec};
use crate::resolver::bounce;
use crate::snapshot::{Body, Energy, Observation, Quantity};
use glam::DVec2;

pub const SPECS: &[ParamSpec] = &[
    ParamSpec {
        name: "speed",
        label: "Initial Velocity",
        unit: "m/s",
        default: 20.0,
        domain: Domain::NonNegative,
        slider: (1.0, 50.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "angle",
        label: "Launch Angle",
        unit: "deg",
        default: 45.0,
        domain: Domain::Range { min: 0.0, max: 90.0 },
        slider: (0.0, 90.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "height",
        label: "Initial Height",
        unit: "m",
        default: 0.0,
        domain: Domain::NonNegative,
        slider: (0.0, 20.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "gravity",
        label: "Gravity",
        unit: "m/s²",
        default: 9.81,
        domain: Domain::Positive,
        slider: (1.0, 25.0),
        effect: Effect::Live,
    },
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
        name: "bounce",
        label: "Bounce",
        unit: "",
        default: 0.0,
        domain: Domain::Flag,
        slider: (0.0, 1.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "restitution",
        label: "Restitution",
        unit: "",
        default: 0.7,
        domain: Domain::Range { min: 0.0, max: 1.0 },
        slider: (0.0, 1.0),
        effect: Effect::Live,
    },
];

#[derive(Debug, Clone)]
pub struct Projectile {
    pub speed: f64,
    pub angle: f64,
    pub height: f64,
    pub gravity: f64,
    pub mass: f64,
    pub bounce: bool,
    pub restitution: f64,
    resting: bool,
    bounces: u32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            speed: 20.0,
            angle: 45.0,
            height: 0.0,
            gravity: 9.81,
            mass: 1.0,
            bounce: false,
            restitution: 0.7,
            resting: false,
            bounces: 0,
        }
    }
}

impl Projectile {
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    fn launch_velocity(&self) -> DVec2 {
        let theta = self.angle.to_radians();
        DVec2::new(self.speed * theta.cos(), self.speed * theta.sin())
    }

    /// Time to first reach the ground from the launch point.
    pub fn time_of_flight(&self) -> f64 {
        let v0y = self.launch_velocity().y;
        (v0y + (v0y * v0y + 2.0 * self.gravity * self.height).sqrt()) / self.gravity
    }

    pub fn max_height(&self) -> f64 {
        let v0y = self.launch_velocity().y;
        self.height + v0y * v0y / (2.0 * self.gravity)
    }

    /// Horizontal distance to the first landing.
    pub fn range(&self) -> f64 {
        self.launch_velocity().x * self.time_of_flight()
    }
}

impl Dynamics for Projectile {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Projectile
    }

    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "speed" => self.speed,
            "angle" => self.angle,
            "height" => self.height,
            "gravity" => self.gravity,
            "mass" => self.mass,
            "bounce" => f64::from(u8::from(self.bounce)),
            "restitution" => self.restitution,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "speed" => self.speed = value,
            "angle" => self.angle = value,
            "height" => self.height = value,
            "gravity" => self.gravity = value,
            "mass" => self.mass = value,
            "bounce" => self.bounce = value != 0.0,
            "restitution" => self.restitution = value,
            _ => return Err(SimError::invalid(name, "unknown parameter")),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.gravity <= 0.0 {
            return Err(SimError::invalid("gravity", "must be > 0"));
        }
        if self.mass <= 0.0 {
            return Err(SimError::invalid("mass", "must be > 0"));
        }
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        let v = self.launch_velocity();
        vec![0.0, self.height, v.x, v.y]
    }

    fn default_method(&self) -> Method {
        Method::SemiImplicitEuler
    }

    fn default_step_size(&self) -> f64 {
        0.05
    }

    fn derivative(&self, state: &[f64], out: &mut [f64]) {
        if self.resting {
            out.fill(0.0);
            return;
        }
        out[0] = state[2];
        out[1] = state[3];
        out[2] = 0.0;
        out[3] = -self.gravity;
    }

    fn detect(&self, _prev: &[f64], next: &[f64], dt: f64) -> Vec<Event> {
        let (y, vy) = (next[1], next[3]);
        if self.resting || y > 0.0 || vy >= 0.0 {
            return Vec::new();
        }
        // A rebound slower than one step of gravity would land again at once.
        let rebound = bounce(vy, self.restitution);
        if self.bounce && rebound > self.gravity * dt {
            vec![Event::BoundaryCross {
                body: 0,
                axis: Axis::Y,
                value: 0.0,
            }]
        } else {
            vec![Event::ConstraintTransition {
                body: 0,
                from: Constraint::Moving,
                to: Constraint::Resting,
                at: 0.0,
            }]
        }
    }

    fn resolve(&mut self, state: &mut [f64], event: &Event, _time: f64) -> Result<()> {
        match *event {
            Event::BoundaryCross {
                body: 0,
                axis: Axis::Y,
                value,
            } => {
                state[1] = value;
                if state[3] < 0.0 {
                    state[3] = bounce(state[3], self.restitution);
                }
                self.bounces += 1;
            }
            Event::ConstraintTransition {
                body: 0,
                to: Constraint::Resting,
                at,
                ..
            } => {
                state[1] = at;
                state[2] = 0.0;
                state[3] = 0.0;
                self.resting = true;
            }
            Event::ConstraintTransition {
                body: 0,
                to: Constraint::Moving,
                ..
            } => self.resting = false,
            _ => return Err(unexpected_event(self.kind(), event)),
        }
        Ok(())
    }

    fn observe(&self, state: &[f64]) -> Observation {
        let position = DVec2::new(state[0], state[1]);
        let velocity = DVec2::new(state[2], state[3]);
        let mut body = Body::linear("projectile", position, velocity);
        if velocity != DVec2::ZERO {
            body.angle = velocity.y.atan2(velocity.x);
        }
        Observation {
            bodies: vec![body],
            energy: Energy {
                kinetic: 0.5 * self.mass * velocity.length_squared(),
                potential: self.mass * self.gravity * position.y,
            },
            momentum: velocity * self.mass,
            quantities: vec![
                Quantity::new("time_of_flight", "s", self.time_of_flight()),
                Quantity::new("max_height", "m", self.max_height()),
                Quantity::new("range", "m", self.range()),
                Quantity::new("bounces", "", f64::from(self.bounces)),
            ],
        }
    }
}
