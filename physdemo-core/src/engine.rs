use crate::error::{Result, SimError};
use crate::integrator::Method;
use crate::models::{parameter_set, set_checked, Dynamics, SimulationKind, System};
use crate::params::{ParameterSet, ParameterUpdate};
use crate::snapshot::Observation;

/// One simulation instance: the physical system, its state and its clock.
#[derive(Debug, Clone)]
pub struct Model {
    pub system: System,
    pub state: Vec<f64>,
    pub time: f64,
    pub step_size: f64,
    pub method: Method,
}

impl Model {
    /// A model of `kind` with default parameters at time zero.
    pub fn new(kind: SimulationKind) -> Self {
        Self::from_system(System::new(kind))
    }

    /// Defaults overlaid with `params`.
    pub fn with_parameters(kind: SimulationKind, params: &ParameterSet) -> Result<Self> {
        Ok(Self::from_system(System::with_parameters(kind, params)?))
    }

    fn from_system(system: System) -> Self {
        let dynamics = system.dynamics();
        let state = dynamics.initial_state();
        let step_size = dynamics.default_step_size();
        let method = dynamics.default_method();
        Self {
            system,
            state,
            time: 0.0,
            step_size,
            method,
        }
    }

    pub fn with_step_size(mut self, step_size: f64) -> Result<Self> {
        validate_step_size(step_size)?;
        self.step_size = step_size;
        Ok(self)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn kind(&self) -> SimulationKind {
        self.system.kind()
    }

    pub fn dynamics(&self) -> &dyn Dynamics {
        self.system.dynamics()
    }

    pub fn parameters(&self) -> ParameterSet {
        parameter_set(self.dynamics())
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.dynamics().get(name)
    }

    /// Apply one update, validating on a copy so a rejection leaves the
    /// model untouched.
    pub fn set_parameter(&mut self, update: &ParameterUpdate) -> Result<()> {
        let mut candidate = self.system.clone();
        set_checked(candidate.dynamics_mut(), &update.name, update.value)?;
        candidate.dynamics().validate()?;
        self.system = candidate;
        Ok(())
    }

    /// Rebuild the system from defaults overlaid with `params` and restart
    /// the clock. The model is unchanged on error.
    pub fn reinitialize(&mut self, params: &ParameterSet) -> Result<()> {
        let system = System::with_parameters(self.kind(), params)?;
        self.state = system.dynamics().initial_state();
        self.system = system;
        self.time = 0.0;
        debug_assert_eq!(self.state.len(), self.kind().dimension());
        Ok(())
    }

    pub fn observe(&self) -> Observation {
        self.dynamics().observe(&self.state)
    }
}

pub(crate) fn validate_step_size(step_size: f64) -> Result<()> {
    if !step_size.is_finite() || step_size <= 0.0 {
        return Err(SimError::invalid("step_size", "must be a finite number > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_update_leaves_model_unchanged() {
        let mut model = Model::new(SimulationKind::Collision1D);
        let before = model.parameters();
        let err = model
            .set_parameter(&ParameterUpdate::new("mass1", -5.0))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
        assert_eq!(model.parameters(), before);
    }

    #[test]
    fn cross_field_rejection_leaves_model_unchanged() {
        let mut model = Model::new(SimulationKind::Collision1D);
        // In-domain on its own, but outside the walls.
        let err = model
            .set_parameter(&ParameterUpdate::new("position1", 40.0))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
        assert_eq!(model.parameter("position1"), Some(-2.0));
    }

    #[test]
    fn reinitialize_restarts_clock() {
        let mut model = Model::new(SimulationKind::Sho);
        model.time = 3.0;
        model.state = vec![0.2, 0.4];
        let mut params = ParameterSet::new();
        params.insert("amplitude".into(), 2.0);
        model.reinitialize(&params).unwrap();
        assert_eq!(model.time, 0.0);
        assert_eq!(model.state, vec![2.0, 0.0]);
    }

    #[test]
    fn step_size_must_be_positive() {
        assert!(Model::new(SimulationKind::Sho).with_step_size(0.0).is_err());
        assert!(Model::new(SimulationKind::Sho).with_step_size(f64::NAN).is_err());
    }
}
