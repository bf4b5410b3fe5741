//! Fixed-step simulation core for a set of classical mechanics demos.
//!
//! A [`SimulationRunner`] owns one [`Model`] and advances it tick by tick:
//! integrate, detect events, resolve them, then hand out a [`Snapshot`].
//! Rendering lives elsewhere; this crate only produces state.

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod event;
pub mod integrator;
pub mod models;
pub mod params;
pub mod resolver;
pub mod runtime;
pub mod snap;
pub mod snapshot;

pub use glam;

pub use config::{ScenarioConfig, StabilityConfig};
pub use engine::Model;
pub use error::{Result, SimError};
pub use event::{Axis, Constraint, Event};
pub use integrator::Method;
pub use models::{Dynamics, Shape, SimulationKind, System};
pub use params::{Domain, Effect, ParamSpec, ParameterSet, ParameterUpdate};
pub use runtime::SimulationRunner;
pub use snap::SnapLine;
pub use snapshot::{Body, Energy, Quantity, Snapshot, Warning};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
