//! Bounded time series of snapshot fields, drawn as plots under each demo.

use physdemo_core::{SimulationKind, Snapshot};
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Samples kept per series. Older samples are dropped first.
pub const HISTORY_LIMIT: usize = 1_500;

/// Values one snapshot contributes to a plot.
struct Sample {
    title: &'static str,
    series: Vec<(&'static str, f64)>,
}

fn state(snap: &Snapshot, i: usize) -> f64 {
    snap.state.get(i).copied().unwrap_or_default()
}

/// What gets plotted for each kind: motion panels, then energy.
fn samples(snap: &Snapshot) -> Vec<Sample> {
    let mut out = match snap.kind {
        SimulationKind::Projectile => vec![
            Sample {
                title: "Height (m)",
                series: vec![("y", state(snap, 1))],
            },
            Sample {
                title: "Velocity (m/s)",
                series: vec![("vx", state(snap, 2)), ("vy", state(snap, 3))],
            },
        ],
        SimulationKind::Sho => vec![
            Sample {
                title: "Position (m)",
                series: vec![("x", state(snap, 0))],
            },
            Sample {
                title: "Velocity (m/s)",
                series: vec![("v", state(snap, 1))],
            },
        ],
        SimulationKind::Collision1D => vec![
            Sample {
                title: "Position (m)",
                series: vec![("block 1", state(snap, 0)), ("block 2", state(snap, 1))],
            },
            Sample {
                title: "Velocity (m/s)",
                series: vec![("block 1", state(snap, 2)), ("block 2", state(snap, 3))],
            },
        ],
        SimulationKind::Atwood => vec![
            Sample {
                title: "Height (m)",
                series: vec![("mass 1", state(snap, 0)), ("mass 2", state(snap, 1))],
            },
            Sample {
                title: "Velocity (m/s)",
                series: vec![("mass 1", state(snap, 2)), ("mass 2", state(snap, 3))],
            },
        ],
        SimulationKind::RigidRotation => vec![
            Sample {
                // Unwrapped, so the curve does not jump when the angle wraps.
                title: "Angle (rad)",
                series: vec![(
                    "theta",
                    snap.quantity("revolutions").unwrap_or_default() * TAU,
                )],
            },
            Sample {
                title: "Angular velocity (rad/s)",
                series: vec![("omega", state(snap, 1))],
            },
        ],
    };
    out.push(Sample {
        title: "Energy (J)",
        series: vec![
            ("kinetic", snap.energy.kinetic),
            ("potential", snap.energy.potential),
            ("total", snap.energy.total()),
        ],
    });
    out
}

#[derive(Debug)]
pub struct Series {
    pub name: &'static str,
    values: VecDeque<f64>,
}

#[derive(Debug)]
pub struct Panel {
    pub title: &'static str,
    pub series: Vec<Series>,
}

/// Recent history of one demo.
#[derive(Debug, Default)]
pub struct History {
    kind: Option<SimulationKind>,
    times: VecDeque<f64>,
    panels: Vec<Panel>,
}

impl History {
    pub fn record(&mut self, snap: &Snapshot) {
        let layout = samples(snap);
        if self.kind != Some(snap.kind) {
            self.kind = Some(snap.kind);
            self.times.clear();
            self.panels = layout
                .iter()
                .map(|s| Panel {
                    title: s.title,
                    series: s
                        .series
                        .iter()
                        .map(|&(name, _)| Series {
                            name,
                            values: VecDeque::with_capacity(HISTORY_LIMIT),
                        })
                        .collect(),
                })
                .collect();
        }

        self.times.push_back(snap.time);
        for (panel, sample) in self.panels.iter_mut().zip(&layout) {
            for (series, (_, value)) in panel.series.iter_mut().zip(&sample.series) {
                series.values.push_back(*value);
            }
        }

        if self.times.len() > HISTORY_LIMIT {
            self.times.pop_front();
            for series in self.panels.iter_mut().flat_map(|p| p.series.iter_mut()) {
                series.values.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.times.clear();
        for series in self.panels.iter_mut().flat_map(|p| p.series.iter_mut()) {
            series.values.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// `[time, value]` pairs of one series, oldest first.
    pub fn points(&self, series: &Series) -> Vec<[f64; 2]> {
        self.times
            .iter()
            .zip(&series.values)
            .map(|(t, v)| [*t, *v])
            .collect()
    }
}
