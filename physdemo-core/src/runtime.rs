//! The per-demo driver: owns one model and advances it one tick at a time.

use crate::config::{ScenarioConfig, StabilityConfig};
use crate::detector::detect;
use crate::engine::Model;
use crate::error::{Result, SimError};
use crate::event::Event;
use crate::integrator::{self, check_magnitude};
use crate::models::SimulationKind;
use crate::params::{ParamSpec, ParameterSet, ParameterUpdate};
use crate::resolver::resolve;
use crate::snapshot::{Snapshot, Warning};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// Largest `omega * dt` accepted before the step is considered too coarse.
const STABILITY_MARGIN: f64 = 2.0;
/// `omega * dt` after an automatic clamp.
const CLAMPED_RATIO: f64 = 0.5;

/// Steps a single simulation and hands out snapshots.
///
/// Each demo window owns its own runner; runners share nothing.
#[derive(Debug)]
pub struct SimulationRunner {
    model: Model,
    config: ScenarioConfig,
    /// Step size restored on reset, before any clamping.
    configured_step: f64,
    step: u64,
    pending: VecDeque<ParameterUpdate>,
    halted: Option<String>,
    baseline_energy: f64,
    drift_reported: bool,
}

impl SimulationRunner {
    /// A runner for `kind` starting from defaults overlaid with `parameters`.
    pub fn new(kind: SimulationKind, parameters: &ParameterSet) -> Result<Self> {
        Self::from_config(ScenarioConfig::new(kind).with_parameters(parameters.clone()))
    }

    pub fn from_config(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        let mut model = Model::with_parameters(config.kind, &config.parameters)?;
        if let Some(dt) = config.step_size {
            model = model.with_step_size(dt)?;
        }
        if let Some(method) = config.integrator {
            model = model.with_method(method);
        }
        info!(
            kind = %config.kind,
            step_size = model.step_size,
            method = ?model.method,
            "simulation runner created"
        );

        let configured_step = model.step_size;
        let mut runner = Self {
            model,
            config,
            configured_step,
            step: 0,
            pending: VecDeque::new(),
            halted: None,
            baseline_energy: 0.0,
            drift_reported: false,
        };
        runner.rebaseline();
        Ok(runner)
    }

    /// Advance one step and report the new state.
    ///
    /// Queued updates are applied first. Fails with `Halted` once the runner
    /// has hit an unresolvable event, and with `UnresolvableEvent` on the tick
    /// that hits it.
    pub fn tick(&mut self) -> Result<Snapshot> {
        let mut warnings = Vec::new();
        self.drain_updates(&mut warnings);

        if let Some(reason) = &self.halted {
            return Err(SimError::Halted(reason.clone()));
        }

        self.check_step_size(&mut warnings);
        let prev = self.advance(&mut warnings)?;

        let events = detect(&prev, &self.model.state, &self.model);
        self.resolve_or_halt(&events)?;

        self.step += 1;
        let mut snapshot = self.compose(events, warnings);
        self.check_energy(&mut snapshot);
        Ok(snapshot)
    }

    /// Validate and apply one parameter change immediately.
    ///
    /// On rejection the model keeps its previous parameters.
    pub fn apply_update(&mut self, update: &ParameterUpdate) -> Result<()> {
        match self.model.set_parameter(update) {
            Ok(()) => {
                debug!(name = %update.name, value = update.value, "parameter updated");
                self.rebaseline();
                Ok(())
            }
            Err(err) => {
                warn!(name = %update.name, value = update.value, error = %err, "rejected parameter update");
                Err(err)
            }
        }
    }

    /// Apply `update` at the start of the next tick.
    pub fn queue_update(&mut self, update: ParameterUpdate) {
        self.pending.push_back(update);
    }

    /// Restart from defaults overlaid with `parameters`.
    ///
    /// Clears the clock, the step counter, queued updates, any halt and any
    /// step clamp. Deterministic: the same parameters always produce the
    /// same sequence of snapshots. On error the runner is unchanged.
    pub fn reset(&mut self, parameters: &ParameterSet) -> Result<()> {
        self.model.reinitialize(parameters)?;
        self.model.step_size = self.configured_step;
        self.step = 0;
        self.pending.clear();
        self.halted = None;
        self.drift_reported = false;
        self.rebaseline();
        debug!(kind = %self.kind(), "runner reset");
        Ok(())
    }

    /// The current state, without stepping.
    pub fn snapshot(&self) -> Snapshot {
        self.compose(Vec::new(), Vec::new())
    }

    pub fn parameters(&self) -> ParameterSet {
        self.model.parameters()
    }

    pub fn specs(&self) -> &'static [ParamSpec] {
        self.kind().specs()
    }

    pub fn kind(&self) -> SimulationKind {
        self.model.kind()
    }

    pub fn time(&self) -> f64 {
        self.model.time
    }

    pub fn step_size(&self) -> f64 {
        self.model.step_size
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Whether the configured duration, if any, has elapsed.
    pub fn is_finished(&self) -> bool {
        match self.config.duration {
            Some(d) => self.model.time + 0.5 * self.model.step_size >= d,
            None => false,
        }
    }

    /// Release the runner.
    pub fn dispose(self) {
        debug!(kind = %self.kind(), steps = self.step, "runner disposed");
    }

    fn stability(&self) -> &StabilityConfig {
        &self.config.stability
    }

    fn drain_updates(&mut self, warnings: &mut Vec<Warning>) {
        while let Some(update) = self.pending.pop_front() {
            if let Err(err) = self.apply_update(&update) {
                let reason = match err {
                    SimError::InvalidParameter { reason, .. } => reason,
                    other => other.to_string(),
                };
                warnings.push(Warning::RejectedUpdate {
                    name: update.name,
                    reason,
                });
            }
        }
    }

    /// Shrink the step when the system's natural rate is too fast for it.
    fn check_step_size(&mut self, warnings: &mut Vec<Warning>) {
        let Some(omega) = self.model.dynamics().characteristic_frequency() else {
            return;
        };
        let ratio = omega * self.model.step_size;
        if ratio <= STABILITY_MARGIN {
            return;
        }
        if self.stability().auto_clamp {
            let from = self.model.step_size;
            let to = CLAMPED_RATIO / omega;
            warn!(from, to, "step size clamped");
            self.model.step_size = to;
            warnings.push(Warning::StepClamped { from, to });
        } else {
            warnings.push(Warning::NumericInstability { magnitude: ratio });
        }
    }

    /// Integrate one step, retrying with halved steps on instability.
    ///
    /// Returns the state before the step. If every attempt fails the model
    /// stays where it was and the failure is reported as a warning. Retries
    /// only shrink the step for this tick; the stored step size is unchanged.
    fn advance(&mut self, warnings: &mut Vec<Warning>) -> Result<Vec<f64>> {
        let prev = self.model.state.clone();
        let step_size = self.model.step_size;
        let outcome = self.integrate_with_retries(&prev, warnings);
        self.model.step_size = step_size;
        outcome.map(|()| prev)
    }

    fn integrate_with_retries(&mut self, prev: &[f64], warnings: &mut Vec<Warning>) -> Result<()> {
        let start = self.model.time;
        let bound = self.stability().max_magnitude;
        let max_halvings = if self.stability().auto_clamp {
            self.stability().max_halvings
        } else {
            0
        };

        let mut halvings = 0;
        loop {
            let outcome = integrator::advance(&mut self.model)
                .and_then(|()| check_magnitude(&self.model.state, bound));
            match outcome {
                Ok(()) => return Ok(()),
                Err(SimError::NumericInstability { magnitude }) => {
                    self.model.state.copy_from_slice(prev);
                    self.model.time = start;
                    if halvings >= max_halvings {
                        warn!(magnitude, time = start, "unstable step rejected");
                        warnings.push(Warning::NumericInstability { magnitude });
                        return Ok(());
                    }
                    halvings += 1;
                    let from = self.model.step_size;
                    let to = from * 0.5;
                    debug!(magnitude, from, to, "unstable step, halving");
                    self.model.step_size = to;
                    warnings.push(Warning::StepClamped { from, to });
                }
                Err(err) => {
                    self.model.state.copy_from_slice(prev);
                    self.model.time = start;
                    return Err(err);
                }
            }
        }
    }

    /// Apply this tick's corrections. A failure halts the runner.
    fn resolve_or_halt(&mut self, events: &[Event]) -> Result<()> {
        if let Err(err) = resolve(&mut self.model, events) {
            error!(kind = %self.kind(), time = self.model.time, error = %err, "runner halted");
            self.halted = Some(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn rebaseline(&mut self) {
        self.baseline_energy = self.model.observe().energy.total();
    }

    fn check_energy(&mut self, snapshot: &mut Snapshot) {
        let Some(tolerance) = self.stability().energy_drift_tolerance else {
            return;
        };
        if !self.model.dynamics().tracks_energy_drift() {
            return;
        }
        let base = self.baseline_energy;
        let relative = (snapshot.energy.total() - base).abs() / base.abs().max(f64::MIN_POSITIVE);
        if relative > tolerance {
            if !self.drift_reported {
                warn!(relative, time = snapshot.time, "total energy drifting");
                self.drift_reported = true;
            }
            snapshot.warnings.push(Warning::EnergyDrift { relative });
        }
    }

    fn compose(&self, events: Vec<Event>, warnings: Vec<Warning>) -> Snapshot {
        let observation = self.model.observe();
        Snapshot {
            kind: self.kind(),
            time: self.model.time,
            step: self.step,
            state: self.model.state.clone(),
            bodies: observation.bodies,
            energy: observation.energy,
            momentum: observation.momentum,
            quantities: observation.quantities,
            events,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Axis;

    fn params(pairs: &[(&str, f64)]) -> ParameterSet {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn tick_advances_clock_and_counter() {
        let mut runner = SimulationRunner::new(SimulationKind::Sho, &ParameterSet::new()).unwrap();
        let dt = runner.step_size();
        let snap = runner.tick().unwrap();
        assert_eq!(snap.step, 1);
        assert!((snap.time - dt).abs() < 1e-15);
        assert_eq!(runner.snapshot().time, snap.time);
    }

    #[test]
    fn halted_runner_refuses_ticks_until_reset() {
        let mut runner = SimulationRunner::new(SimulationKind::Collision1D, &ParameterSet::new()).unwrap();
        runner.halted = Some("test".into());
        assert!(matches!(runner.tick(), Err(SimError::Halted(_))));
        runner.reset(&ParameterSet::new()).unwrap();
        assert!(runner.tick().is_ok());
    }

    #[test]
    fn unresolvable_events_halt_the_runner() {
        let mut runner = SimulationRunner::new(SimulationKind::Collision1D, &ParameterSet::new()).unwrap();
        runner.tick().unwrap();
        let before = runner.snapshot();

        // One block against both walls at once cannot be corrected.
        let events = [
            Event::BoundaryCross {
                body: 0,
                axis: Axis::X,
                value: -5.0,
            },
            Event::BoundaryCross {
                body: 0,
                axis: Axis::X,
                value: 5.0,
            },
        ];
        let err = runner.resolve_or_halt(&events).unwrap_err();
        assert!(matches!(err, SimError::UnresolvableEvent(_)));
        assert!(runner.is_halted());
        assert_eq!(runner.snapshot().state, before.state);

        assert!(matches!(runner.tick(), Err(SimError::Halted(_))));
        assert!(matches!(runner.tick(), Err(SimError::Halted(_))));
        assert_eq!(runner.time(), before.time);

        runner.reset(&ParameterSet::new()).unwrap();
        assert!(!runner.is_halted());
        assert!(runner.tick().is_ok());
    }

    #[test]
    fn queued_rejection_becomes_warning() {
        let mut runner = SimulationRunner::new(SimulationKind::Atwood, &ParameterSet::new()).unwrap();
        runner.queue_update(ParameterUpdate::new("mass1", -5.0));
        runner.queue_update(ParameterUpdate::new("mass2", 3.0));
        let snap = runner.tick().unwrap();
        assert!(snap
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::RejectedUpdate { name, .. } if name == "mass1")));
        assert_eq!(runner.parameters()["mass1"], 1.0);
        assert_eq!(runner.parameters()["mass2"], 3.0);
    }

    #[test]
    fn stiff_spring_clamps_step() {
        let mut runner =
            SimulationRunner::new(SimulationKind::Sho, &params(&[("spring_constant", 40_000.0)])).unwrap();
        let snap = runner.tick().unwrap();
        assert!(snap.warnings.iter().any(|w| matches!(w, Warning::StepClamped { .. })));
        assert!((runner.step_size() - 0.5 / 200.0).abs() < 1e-12);

        runner.reset(&ParameterSet::new()).unwrap();
        assert!((runner.step_size() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_bound_state_is_rejected_without_moving() {
        let mut config = ScenarioConfig::new(SimulationKind::Projectile);
        config.stability.max_magnitude = 10.0;
        config.stability.max_halvings = 2;
        let mut runner = SimulationRunner::from_config(config).unwrap();
        let before = runner.snapshot().state;
        let snap = runner.tick().unwrap();
        assert_eq!(snap.state, before);
        assert_eq!(snap.time, 0.0);
        let clamps = snap
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::StepClamped { .. }))
            .count();
        assert_eq!(clamps, 2);
        assert_eq!(count_instabilities(&snap), 1);
        assert_eq!(runner.step_size(), 0.05);
    }

    fn count_instabilities(snap: &Snapshot) -> usize {
        snap.warnings
            .iter()
            .filter(|w| matches!(w, Warning::NumericInstability { .. }))
            .count()
    }

    #[test]
    fn halving_retries_never_shrink_the_stored_step() {
        // x passes the bound after about a second of flight.
        let mut config = ScenarioConfig::new(SimulationKind::Projectile);
        config.stability.max_magnitude = 15.0;
        let mut runner = SimulationRunner::from_config(config).unwrap();
        let dt = runner.step_size();

        let mut last_time = 0.0;
        let mut rejected = 0;
        for _ in 0..60 {
            let snap = runner.tick().unwrap();
            assert_eq!(runner.step_size(), dt);
            assert!(snap.time >= last_time);
            assert!(snap.time - last_time <= dt + 1e-12);
            if snap.time == last_time {
                rejected += 1;
                assert_eq!(count_instabilities(&snap), 1);
            }
            last_time = snap.time;
        }
        assert!(rejected > 0);
        assert!(last_time > 1.0 && last_time < 1.1, "t = {last_time}");
    }

    #[test]
    fn recovered_retry_keeps_full_step_for_next_tick() {
        let mut config = ScenarioConfig::new(SimulationKind::Projectile);
        config.stability.max_magnitude = 15.0;
        let mut runner = SimulationRunner::from_config(config).unwrap();
        let dt = runner.step_size();

        // Tighten the bound for a single tick, then lift it.
        runner.tick().unwrap();
        runner.config.stability.max_magnitude = 0.01;
        let frozen = runner.tick().unwrap();
        assert_eq!(count_instabilities(&frozen), 1);
        assert_eq!(runner.step_size(), dt);

        runner.config.stability.max_magnitude = 1e6;
        let before = runner.time();
        let moved = runner.tick().unwrap();
        assert!((moved.time - before - dt).abs() < 1e-12);
        assert!(moved.warnings.is_empty());
    }

    #[test]
    fn finished_after_duration() {
        let mut config = ScenarioConfig::new(SimulationKind::RigidRotation);
        config.duration = Some(0.1);
        let mut runner = SimulationRunner::from_config(config).unwrap();
        let mut ticks = 0;
        while !runner.is_finished() {
            runner.tick().unwrap();
            ticks += 1;
        }
        assert_eq!(ticks, 5);
    }
}
