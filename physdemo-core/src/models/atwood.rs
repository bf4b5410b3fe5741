//! Two masses hanging from an inextensible string over a fixed pulley.
//!
//! Heights are measured from the pulley axle, positive up, so both masses
//! start at negative `y`. Mass 1 hangs on the left at `x = -r`, mass 2 on the
//! right at `x = r`. The string never goes slack: the constraint
//! `y1 + y2 = -(L - pi r)` is built into the accelerations. When a rising mass
//! reaches the pulley rim the machine jams until the masses are changed so
//! that it would pull away again.

use super::{unexpected_event, Dynamics, SimulationKind};
use crate::error::{Result, SimError};
use crate::event::{Constraint, Event};
use crate::integrator::Method;
use crate::params::{Domain, Effect, ParamSpec};
use crate::snapshot::{Body, Energy, Observation, Quantity};
use glam::DVec2;
use std::f64::consts::PI;

pub const SPECS: &[ParamSpec] = &[
    ParamSpec {
        name: "mass1",
        label: "Mass 1",
        unit: "kg",
        default: 1.0,
        domain: Domain::Positive,
        slider: (0.1, 10.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "mass2",
        label: "Mass 2",
        unit: "kg",
        default: 2.0,
        domain: Domain::Positive,
        slider: (0.1, 10.0),
        effect: Effect::Live,
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
        name: "string_length",
        label: "String Length",
        unit: "m",
        default: 4.0,
        domain: Domain::Positive,
        slider: (2.0, 10.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "pulley_radius",
        label: "Pulley Radius",
        unit: "m",
        default: 0.3,
        domain: Domain::Positive,
        slider: (0.05, 1.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "drop1",
        label: "Initial Drop 1",
        unit: "m",
        default: 1.5,
        domain: Domain::Positive,
        slider: (0.3, 5.0),
        effect: Effect::Initial,
    },
];

#[derive(Debug, Clone)]
pub struct Atwood {
    pub mass1: f64,
    pub mass2: f64,
    pub gravity: f64,
    pub string_length: f64,
    pub pulley_radius: f64,
    pub drop1: f64,
    jammed: Option<usize>,
    jams: u32,
}

impl Default for Atwood {
    fn default() -> Self {
        Self {
            mass1: 1.0,
            mass2: 2.0,
            gravity: 9.81,
            string_length: 4.0,
            pulley_radius: 0.3,
            drop1: 1.5,
            jammed: None,
            jams: 0,
        }
    }
}

impl Atwood {
    /// Acceleration of mass 1, positive up. Mass 2 moves with the opposite sign.
    pub fn acceleration(&self) -> f64 {
        self.gravity * (self.mass2 - self.mass1) / (self.mass1 + self.mass2)
    }

    pub fn tension(&self) -> f64 {
        2.0 * self.mass1 * self.mass2 * self.gravity / (self.mass1 + self.mass2)
    }

    /// String hanging below the pulley, shared by both sides.
    fn hanging_length(&self) -> f64 {
        self.string_length - PI * self.pulley_radius
    }

    /// Initial depth of mass 2 below the axle.
    pub fn drop2(&self) -> f64 {
        self.hanging_length() - self.drop1
    }

    /// Index of the mass stuck against the pulley, if any.
    pub fn jammed(&self) -> Option<usize> {
        self.jammed
    }

    fn body_acceleration(&self, body: usize) -> f64 {
        if body == 0 {
            self.acceleration()
        } else {
            -self.acceleration()
        }
    }
}

impl Dynamics for Atwood {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Atwood
    }

    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "mass1" => self.mass1,
            "mass2" => self.mass2,
            "gravity" => self.gravity,
            "string_length" => self.string_length,
            "pulley_radius" => self.pulley_radius,
            "drop1" => self.drop1,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "mass1" => self.mass1 = value,
            "mass2" => self.mass2 = value,
            "gravity" => self.gravity = value,
            "string_length" => self.string_length = value,
            "pulley_radius" => self.pulley_radius = value,
            "drop1" => self.drop1 = value,
            _ => return Err(SimError::invalid(name, "unknown parameter")),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.mass1 + self.mass2 <= 0.0 {
            return Err(SimError::invalid("mass1", "total mass must be > 0"));
        }
        if self.drop1 < self.pulley_radius {
            return Err(SimError::invalid(
                "drop1",
                "mass 1 must hang at least one pulley radius below the axle",
            ));
        }
        if self.drop2() < self.pulley_radius {
            return Err(SimError::invalid(
                "string_length",
                "string too short for mass 2 to clear the pulley",
            ));
        }
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        vec![-self.drop1, -self.drop2(), 0.0, 0.0]
    }

    fn default_method(&self) -> Method {
        Method::Rk4
    }

    fn default_step_size(&self) -> f64 {
        0.02
    }

    fn derivative(&self, state: &[f64], out: &mut [f64]) {
        if self.jammed.is_some() {
            out.fill(0.0);
            return;
        }
        let a = self.acceleration();
        out[0] = state[2];
        out[1] = state[3];
        out[2] = a;
        out[3] = -a;
    }

    fn detect(&self, _prev: &[f64], next: &[f64], _dt: f64) -> Vec<Event> {
        let rim = -self.pulley_radius;
        match self.jammed {
            Some(body) if self.body_acceleration(body) < 0.0 => vec![Event::ConstraintTransition {
                body,
                from: Constraint::Resting,
                to: Constraint::Moving,
                at: next[body],
            }],
            Some(_) => Vec::new(),
            None => (0..2)
                .find(|&body| next[body] >= rim && next[2 + body] > 0.0)
                .map(|body| Event::ConstraintTransition {
                    body,
                    from: Constraint::Moving,
                    to: Constraint::Resting,
                    at: rim,
                })
                .into_iter()
                .collect(),
        }
    }

    fn resolve(&mut self, state: &mut [f64], event: &Event, _time: f64) -> Result<()> {
        match *event {
            Event::ConstraintTransition {
                body,
                to: Constraint::Resting,
                at,
                ..
            } if body < 2 => {
                // Keep the string length the masses are actually on; a
                // string_length update only applies from the next reset.
                let other = 1 - body;
                let total = state[0] + state[1];
                state[body] = at;
                state[other] = total - at;
                state[2] = 0.0;
                state[3] = 0.0;
                self.jammed = Some(body);
                self.jams += 1;
            }
            Event::ConstraintTransition {
                body,
                to: Constraint::Moving,
                ..
            } if self.jammed == Some(body) => self.jammed = None,
            _ => return Err(unexpected_event(self.kind(), event)),
        }
        Ok(())
    }

    fn tracks_energy_drift(&self) -> bool {
        self.jams == 0
    }

    fn observe(&self, state: &[f64]) -> Observation {
        let (y1, y2, v1, v2) = (state[0], state[1], state[2], state[3]);
        let r = self.pulley_radius;
        let a = if self.jammed.is_some() {
            0.0
        } else {
            self.acceleration()
        };
        Observation {
            bodies: vec![
                Body::linear("mass 1", DVec2::new(-r, y1), DVec2::new(0.0, v1)),
                Body::linear("mass 2", DVec2::new(r, y2), DVec2::new(0.0, v2)),
            ],
            energy: Energy {
                kinetic: 0.5 * self.mass1 * v1 * v1 + 0.5 * self.mass2 * v2 * v2,
                potential: self.gravity * (self.mass1 * y1 + self.mass2 * y2),
            },
            momentum: DVec2::new(0.0, self.mass1 * v1 + self.mass2 * v2),
            quantities: vec![
                Quantity::new("acceleration", "m/s²", a),
                Quantity::new("acceleration_magnitude", "m/s²", a.abs()),
                Quantity::new("tension", "N", self.tension()),
                Quantity::new(
                    "net_force",
                    "N",
                    (self.mass2 - self.mass1).abs() * self.gravity,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceleration_and_tension_match_closed_form() {
        let a = Atwood {
            mass1: 2.0,
            mass2: 1.0,
            gravity: 9.8,
            ..Atwood::default()
        };
        assert!((a.acceleration() + 9.8 / 3.0).abs() < 1e-12);
        assert!((a.tension() - 4.0 * 9.8 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn string_length_is_conserved_by_initial_state() {
        let a = Atwood::default();
        let s = a.initial_state();
        assert!((s[0] + s[1] + a.hanging_length()).abs() < 1e-12);
    }

    #[test]
    fn rising_mass_jams_at_rim() {
        let mut a = Atwood::default();
        // mass 2 is heavier, so mass 1 rises
        let next = [-0.29, -2.85, 3.0, -3.0];
        let events = a.detect(&[-0.35, -2.79, 2.9, -2.9], &next, 0.02);
        assert_eq!(events.len(), 1);
        let mut state = next.to_vec();
        a.resolve(&mut state, &events[0], 1.0).unwrap();
        assert_eq!(a.jammed(), Some(0));
        assert_eq!(state[0], -0.3);
        assert!((state[0] + state[1] - (next[0] + next[1])).abs() < 1e-12);
        assert_eq!(&state[2..], &[0.0, 0.0]);
        assert!(!a.tracks_energy_drift());
    }

    #[test]
    fn jam_releases_when_masses_swap() {
        let mut a = Atwood::default();
        let mut state = vec![-0.3, -3.0, 0.0, 0.0];
        let jam = Event::ConstraintTransition {
            body: 0,
            from: Constraint::Moving,
            to: Constraint::Resting,
            at: -0.3,
        };
        a.resolve(&mut state, &jam, 0.0).unwrap();
        assert!(a.detect(&state, &state, 0.02).is_empty());

        a.mass1 = 3.0;
        let events = a.detect(&state, &state, 0.02);
        assert!(matches!(
            events[0],
            Event::ConstraintTransition { body: 0, to: Constraint::Moving, .. }
        ));
        a.resolve(&mut state, &events[0], 0.0).unwrap();
        assert_eq!(a.jammed(), None);
    }

    #[test]
    fn short_string_is_rejected() {
        let a = Atwood {
            string_length: 2.0,
            ..Atwood::default()
        };
        assert!(a.validate().is_err());
    }
}
