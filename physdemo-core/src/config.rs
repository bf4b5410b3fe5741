//! Scenario files: which demo to run, with what parameters and step policy.

use crate::engine::validate_step_size;
use crate::error::{Result, SimError};
use crate::integrator::Method;
use crate::models::SimulationKind;
use crate::params::{find_spec, ParameterSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A demo scenario as stored on disk. Only `kind` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub kind: SimulationKind,
    /// Fixed step in seconds; the kind's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrator: Option<Method>,
    /// Simulated seconds after which the runner reports itself finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub parameters: ParameterSet,
    #[serde(default)]
    pub stability: StabilityConfig,
    /// Wall-clock delay between ticks in the viewer.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_frame_interval_ms() -> u64 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StabilityConfig {
    /// Largest absolute state component accepted after a step.
    pub max_magnitude: f64,
    /// Shrink the step when the system is too stiff for it.
    pub auto_clamp: bool,
    /// Retries with a halved step after an unstable step.
    pub max_halvings: u32,
    /// Relative total-energy drift that triggers a warning. `None` disables.
    pub energy_drift_tolerance: Option<f64>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_magnitude: 1e6,
            auto_clamp: true,
            max_halvings: 4,
            energy_drift_tolerance: Some(0.05),
        }
    }
}

impl ScenarioConfig {
    /// Defaults for `kind`.
    pub fn new(kind: SimulationKind) -> Self {
        Self {
            kind,
            step_size: None,
            integrator: None,
            duration: None,
            parameters: ParameterSet::new(),
            stability: StabilityConfig::default(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }

    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Read and validate a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded scenario file");
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: ScenarioConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Field checks that do not need a built model. Parameter values are
    /// checked against their domains here; cross-field rules when the runner
    /// builds the model.
    pub fn validate(&self) -> Result<()> {
        if let Some(dt) = self.step_size {
            validate_step_size(dt)?;
        }
        if let Some(d) = self.duration {
            if !d.is_finite() || d <= 0.0 {
                return Err(SimError::Config(format!("duration must be > 0, got {d}")));
            }
        }
        let specs = self.kind.specs();
        for (name, value) in &self.parameters {
            find_spec(specs, name)?.validate(*value)?;
        }
        let s = &self.stability;
        if s.max_magnitude.is_nan() || s.max_magnitude <= 0.0 {
            return Err(SimError::Config("stability.max_magnitude must be > 0".into()));
        }
        if let Some(tol) = s.energy_drift_tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(SimError::Config(
                    "stability.energy_drift_tolerance must be > 0".into(),
                ));
            }
        }
        if self.frame_interval_ms == 0 {
            return Err(SimError::Config("frame_interval_ms must be > 0".into()));
        }
        Ok(())
    }
}
