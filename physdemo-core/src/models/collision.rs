//! Two blocks on a frictionless track between two walls.

use super::{unexpected_event, Dynamics, SimulationKind};
use crate::error::{Result, SimError};
use crate::event::{Axis, Event};
use crate::integrator::Method;
use crate::params::{Domain, Effect, ParamSpec};
use crate::resolver::{bounce, collide};
use crate::snapshot::{Body, Energy, Observation, Quantity};
use glam::DVec2;

const TRACK: Domain = Domain::Range {
    min: -100.0,
    max: 100.0,
};

pub const SPECS: &[ParamSpec] = &[
    ParamSpec {
        name: "mass1",
        label: "Mass 1",
        unit: "kg",
        default: 1.0,
        domain: Domain::Positive,
        slider: (0.1, 5.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "mass2",
        label: "Mass 2",
        unit: "kg",
        default: 2.0,
        domain: Domain::Positive,
        slider: (0.1, 5.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "velocity1",
        label: "Initial Vel 1",
        unit: "m/s",
        default: 2.0,
        domain: TRACK,
        slider: (-5.0, 5.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "velocity2",
        label: "Initial Vel 2",
        unit: "m/s",
        default: -1.0,
        domain: TRACK,
        slider: (-5.0, 5.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "position1",
        label: "Initial Pos 1",
        unit: "m",
        default: -2.0,
        domain: TRACK,
        slider: (-4.5, 4.5),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "position2",
        label: "Initial Pos 2",
        unit: "m",
        default: 2.0,
        domain: TRACK,
        slider: (-4.5, 4.5),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "restitution",
        label: "Restitution",
        unit: "",
        default: 1.0,
        domain: Domain::Range { min: 0.0, max: 1.0 },
        slider: (0.0, 1.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "wall_restitution",
        label: "Wall Restitution",
        unit: "",
        default: 1.0,
        domain: Domain::Range { min: 0.0, max: 1.0 },
        slider: (0.0, 1.0),
        effect: Effect::Live,
    },
    ParamSpec {
        name: "wall_left",
        label: "Left Wall",
        unit: "m",
        default: -5.0,
        domain: TRACK,
        slider: (-10.0, -1.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "wall_right",
        label: "Right Wall",
        unit: "m",
        default: 5.0,
        domain: TRACK,
        slider: (1.0, 10.0),
        effect: Effect::Initial,
    },
    ParamSpec {
        name: "block_width",
        label: "Block Width",
        unit: "m",
        default: 0.5,
        domain: Domain::Positive,
        slider: (0.1, 2.0),
        effect: Effect::Initial,
    },
];

#[derive(Debug, Clone)]
pub struct Collision {
    pub mass1: f64,
    pub mass2: f64,
    pub velocity1: f64,
    pub velocity2: f64,
    pub position1: f64,
    pub position2: f64,
    pub restitution: f64,
    pub wall_restitution: f64,
    pub wall_left: f64,
    pub wall_right: f64,
    pub block_width: f64,
    collisions: u32,
    wall_hits: u32,
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            mass1: 1.0,
            mass2: 2.0,
            velocity1: 2.0,
            velocity2: -1.0,
            position1: -2.0,
            position2: 2.0,
            restitution: 1.0,
            wall_restitution: 1.0,
            wall_left: -5.0,
            wall_right: 5.0,
            block_width: 0.5,
            collisions: 0,
            wall_hits: 0,
        }
    }
}

impl Collision {
    fn mass(&self, body: usize) -> f64 {
        if body == 0 {
            self.mass1
        } else {
            self.mass2
        }
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    /// +1 if body 1 is to the right of body 0.
    fn ordering(state: &[f64]) -> f64 {
        if state[1] >= state[0] {
            1.0
        } else {
            -1.0
        }
    }

    /// Free space between the facing block edges; negative when overlapping.
    fn gap(&self, state: &[f64], ordering: f64) -> f64 {
        ordering * (state[1] - state[0]) - self.block_width
    }

    /// Push both blocks back between the walls without overlapping.
    /// Velocities are left alone.
    fn keep_on_track(&self, state: &mut [f64]) {
        let half = 0.5 * self.block_width;
        let (lo, hi) = (self.wall_left + half, self.wall_right - half);
        let (l, r) = if state[0] <= state[1] { (0, 1) } else { (1, 0) };

        state[l] = state[l].max(lo);
        state[r] = state[r].min(hi);
        if state[r] - state[l] < self.block_width {
            let mid = 0.5 * (state[l] + state[r]);
            state[l] = mid - half;
            state[r] = mid + half;
        }
        let shift = (lo - state[l]).max(0.0) - (state[r] - hi).max(0.0);
        state[l] += shift;
        state[r] += shift;
    }
}

impl Dynamics for Collision {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Collision1D
    }

    fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "mass1" => self.mass1,
            "mass2" => self.mass2,
            "velocity1" => self.velocity1,
            "velocity2" => self.velocity2,
            "position1" => self.position1,
            "position2" => self.position2,
            "restitution" => self.restitution,
            "wall_restitution" => self.wall_restitution,
            "wall_left" => self.wall_left,
            "wall_right" => self.wall_right,
            "block_width" => self.block_width,
            _ => return None,
        })
    }

    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "mass1" => self.mass1 = value,
            "mass2" => self.mass2 = value,
            "velocity1" => self.velocity1 = value,
            "velocity2" => self.velocity2 = value,
            "position1" => self.position1 = value,
            "position2" => self.position2 = value,
            "restitution" => self.restitution = value,
            "wall_restitution" => self.wall_restitution = value,
            "wall_left" => self.wall_left = value,
            "wall_right" => self.wall_right = value,
            "block_width" => self.block_width = value,
            _ => return Err(SimError::invalid(name, "unknown parameter")),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (name, m) in [("mass1", self.mass1), ("mass2", self.mass2)] {
            if m <= 0.0 {
                return Err(SimError::invalid(name, "must be > 0"));
            }
        }
        let half = 0.5 * self.block_width;
        if self.wall_right - self.wall_left < 2.0 * self.block_width {
            return Err(SimError::invalid(
                "wall_right",
                "walls must be at least two block widths apart",
            ));
        }
        for (name, x) in [("position1", self.position1), ("position2", self.position2)] {
            if x - half < self.wall_left || x + half > self.wall_right {
                return Err(SimError::invalid(name, "block must start between the walls"));
            }
        }
        if (self.position2 - self.position1).abs() < self.block_width {
            return Err(SimError::invalid("position2", "blocks must not start overlapping"));
        }
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        vec![self.position1, self.position2, self.velocity1, self.velocity2]
    }

    fn default_method(&self) -> Method {
        Method::SemiImplicitEuler
    }

    fn default_step_size(&self) -> f64 {
        0.01
    }

    fn derivative(&self, state: &[f64], out: &mut [f64]) {
        out[0] = state[2];
        out[1] = state[3];
        out[2] = 0.0;
        out[3] = 0.0;
    }

    fn detect(&self, prev: &[f64], next: &[f64], _dt: f64) -> Vec<Event> {
        let mut events = Vec::new();

        // Contact gap crossing zero while the blocks close in on each other.
        let ordering = Self::ordering(prev);
        let closing = ordering * (next[2] - next[3]) > 0.0;
        if self.gap(next, ordering) <= 0.0 && closing {
            events.push(Event::Collision {
                a: 0,
                b: 1,
                relative_velocity: next[2] - next[3],
            });
        }

        let half = 0.5 * self.block_width;
        for body in 0..2 {
            let (x, v) = (next[body], next[2 + body]);
            if x - half <= self.wall_left && v < 0.0 {
                events.push(Event::BoundaryCross {
                    body,
                    axis: Axis::X,
                    value: self.wall_left,
                });
            } else if x + half >= self.wall_right && v > 0.0 {
                events.push(Event::BoundaryCross {
                    body,
                    axis: Axis::X,
                    value: self.wall_right,
                });
            }
        }
        events
    }

    fn resolve(&mut self, state: &mut [f64], event: &Event, _time: f64) -> Result<()> {
        match *event {
            Event::Collision { a, b, .. } if a < 2 && b < 2 => {
                let (ua, ub) = (state[2 + a], state[2 + b]);
                let (va, vb) = collide(self.mass(a), self.mass(b), ua, ub, self.restitution);
                state[2 + a] = va;
                state[2 + b] = vb;

                // The separating velocities decide which side each block ends
                // on, even if they passed through each other within the step.
                let sign = if vb != va {
                    (vb - va).signum()
                } else {
                    Self::ordering(&[state[a], state[b]])
                };
                let mid = 0.5 * (state[a] + state[b]);
                let half_gap = 0.5 * (sign * (state[b] - state[a])).max(self.block_width);
                state[a] = mid - sign * half_gap;
                state[b] = mid + sign * half_gap;
                self.keep_on_track(state);
                self.collisions += 1;
            }
            Event::BoundaryCross {
                body,
                axis: Axis::X,
                value,
            } if body < 2 => {
                let left = value <= 0.5 * (self.wall_left + self.wall_right);
                self.keep_on_track(state);
                // An earlier collision may already have turned the block around.
                let v = 2 + body;
                let into_wall = if left { state[v] < 0.0 } else { state[v] > 0.0 };
                if into_wall {
                    state[v] = bounce(state[v], self.wall_restitution);
                    self.wall_hits += 1;
                }
            }
            _ => return Err(unexpected_event(self.kind(), event)),
        }
        Ok(())
    }

    fn tracks_energy_drift(&self) -> bool {
        self.restitution == 1.0 && self.wall_restitution == 1.0
    }

    fn observe(&self, state: &[f64]) -> Observation {
        let (x1, x2, v1, v2) = (state[0], state[1], state[2], state[3]);
        Observation {
            bodies: vec![
                Body::linear("block 1", DVec2::new(x1, 0.0), DVec2::new(v1, 0.0)),
                Body::linear("block 2", DVec2::new(x2, 0.0), DVec2::new(v2, 0.0)),
            ],
            energy: Energy {
                kinetic: 0.5 * self.mass1 * v1 * v1 + 0.5 * self.mass2 * v2 * v2,
                potential: 0.0,
            },
            momentum: DVec2::new(self.mass1 * v1 + self.mass2 * v2, 0.0),
            quantities: vec![
                Quantity::new("relative_velocity", "m/s", v1 - v2),
                Quantity::new("collisions", "", f64::from(self.collisions)),
                Quantity::new("wall_hits", "", f64::from(self.wall_hits)),
            ],
        }
    }
}
