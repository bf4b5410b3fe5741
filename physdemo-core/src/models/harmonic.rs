//! Mass on a spring, optionally with viscous damping.

use super::{unexpected_event, Dynamics, SimulationKind};
use crate::error::{Result, SimError};
use crate::event::{Axis, Event};
use crate::integrator::Method;
use crate::params::{Domain, Effect, ParamSpec};
use crate::snapshot::{Body, Energy, Observation, Quantity};
use glam::DVec2;
use std::f64::consts::{PI, TAU};

pub const SPECS: &[ParamSpec] = &[
    ParamSpec {
        name: "amplitude",
        label: "Amplitude",
        unit: "m",
        default: 1.0,
        domain: Domain::NonNegative,
        slider: (0.1, 5.0),
        effect: Effect::Initial,
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
        name: "spring_constant",
        label: "Spring Constant",
        unit: "N/m",
        default: 1.0,
        domain: Domain::Positive,
        slider: (0.1, 10.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "phase",
        label: "Phase",
        unit: "rad",
        default: 0.0,
        domain: Domain::Range { min: -PI, max: PI },
        slider: (-PI, PI),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "damping",
        label: "Damping",
        unit: "kg/s",
        default: 0.0,
        domain: Domain::NonNegative,
        slider: (0.0, 2.0),
        effect: Effect::Live,
    },
];

#[derive(Debug, Clone)]
pub struct Harmonic {
    pub amplitude: f64,
    pub mass: f64,
    pub spring_constant: f64,
    pub phase: f64,
    pub damping: f64,
    last_crossing: Option<f64>,
    measured_period: Option<f64>,
}

impl Default for Harmonic {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            mass: 1.0,
            spring_constant: 1.0,
            phase: 0.0,
            damping: 0.0,
            last_crossing: None,
            measured_period: None,
        }
    }
}

impl Harmonic {
    /// Undamped angular frequency sqrt(k/m).
    pub fn omega(&self) -> f64 {
        (self.spring_constant / self.mass).sqrt()
    }

    /// Period estimated from the last two equilibrium crossings.
    pub fn measured_period(&self) -> Option<f64> {
        self.measured_period
    }
}

impl Dynamics for Harmonic {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Sho
    }

    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "amplitude" => self.amplitude,
            "mass" => self.mass,
            "spring_constant" => self.spring_constant,
            "phase" => self.phase,
            "damping" => self.damping,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "amplitude" => self.amplitude = value,
            "mass" => self.mass = value,
            "spring_constant" => self.spring_constant = value,
            "phase" => self.phase = value,
            "damping" => self.damping = value,
            _ => return Err(SimError::invalid(name, "unknown parameter")),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.mass <= 0.0 {
            return Err(SimError::invalid("mass", "must be > 0"));
        }
        if self.spring_constant <= 0.0 {
            return Err(SimError::invalid("spring_constant", "must be > 0"));
        }
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        let w = self.omega();
        vec![
            self.amplitude * self.phase.cos(),
            -self.amplitude * w * self.phase.sin(),
        ]
    }

    fn default_method(&self) -> Method {
        Method::Rk4
    }

    fn default_step_size(&self) -> f64 {
        1.0 / 60.0
    }

    fn characteristic_frequency(&self) -> Option<f64> {
        Some(self.omega().max(self.damping / self.mass))
    }

    fn derivative(&self, state: &[f64], out: &mut [f64]) {
        let (x, v) = (state[0], state[1]);
        out[0] = v;
        out[1] = -(self.spring_constant * x + self.damping * v) / self.mass;
    }

    fn detect(&self, prev: &[f64], next: &[f64], _dt: f64) -> Vec<Event> {
        let crossed = prev[0] * next[0] < 0.0 || (next[0] == 0.0 && prev[0] != 0.0);
        if crossed {
            vec![Event::BoundaryCross {
                body: 0,
                axis: Axis::X,
                value: 0.0,
            }]
        } else {
            Vec::new()
        }
    }

    fn resolve(&mut self, _state: &mut [f64], event: &Event, time: f64) -> Result<()> {
        match *event {
            // Visual marker only: the state is not corrected.
            Event::BoundaryCross {
                body: 0,
                axis: Axis::X,
                ..
            } => {
                if let Some(last) = self.last_crossing {
                    self.measured_period = Some(2.0 * (time - last));
                }
                self.last_crossing = Some(time);
                Ok(())
            }
            _ => Err(unexpected_event(self.kind(), event)),
        }
    }

    fn tracks_energy_drift(&self) -> bool {
        self.damping == 0.0
    }

    fn observe(&self, state: &[f64]) -> Observation {
        let (x, v) = (state[0], state[1]);
        let mut quantities = vec![
            Quantity::new("omega", "rad/s", self.omega()),
            Quantity::new("period", "s", TAU / self.omega()),
        ];
        if let Some(p) = self.measured_period {
            quantities.push(Quantity::new("measured_period", "s", p));
        }
        Observation {
            bodies: vec![Body::linear("mass", DVec2::new(x, 0.0), DVec2::new(v, 0.0))],
            energy: Energy {
                kinetic: 0.5 * self.mass * v * v,
                potential: 0.5 * self.spring_constant * x * x,
            },
            momentum: DVec2::new(self.mass * v, 0.0),
            quantities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_follows_phase() {
        let h = Harmonic {
            amplitude: 2.0,
            spring_constant: 4.0,
            phase: PI / 2.0,
            ..Harmonic::default()
        };
        let s = h.initial_state();
        assert!(s[0].abs() < 1e-12);
        assert!((s[1] + 4.0).abs() < 1e-12);
    }

    #[test]
    fn consecutive_crossings_measure_period() {
        let mut h = Harmonic::default();
        let cross = h.detect(&[0.1, -1.0], &[-0.05, -1.0], 0.1);
        assert_eq!(cross.len(), 1);
        h.resolve(&mut [0.0, 0.0], &cross[0], 1.5).unwrap();
        assert_eq!(h.measured_period(), None);
        h.resolve(&mut [0.0, 0.0], &cross[0], 1.5 + PI).unwrap();
        assert!((h.measured_period().unwrap() - TAU).abs() < 1e-12);
    }

    #[test]
    fn no_crossing_on_same_side() {
        let h = Harmonic::default();
        assert!(h.detect(&[0.3, -1.0], &[0.2, -1.0], 0.1).is_empty());
    }
}
