use crate::engine::Model;
use crate::error::{Result, SimError};
use crate::models::Dynamics;
use serde::{Deserialize, Serialize};

/// Fixed-step integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// v += a*dt, then x += v*dt. First order, one derivative evaluation.
    SemiImplicitEuler,
    /// Classical 4th-order Runge-Kutta.
    Rk4,
}

/// Advance the model by one step of `model.step_size`.
///
/// Fails with `InvalidParameter` if the parameters cannot produce a
/// derivative and with `NumericInstability` if the result is not finite.
/// On failure the state may be partially advanced; callers keep a copy.
pub fn advance(model: &mut Model) -> Result<()> {
    let dynamics = model.system.dynamics();
    dynamics.validate()?;

    step(dynamics, &mut model.state, model.step_size, model.method);

    if let Some(bad) = model.state.iter().find(|v| !v.is_finite()) {
        return Err(SimError::NumericInstability { magnitude: bad.abs() });
    }
    model.time += model.step_size;
    Ok(())
}

/// Step `state` forward by `dt` with the given method.
pub fn step(dynamics: &dyn Dynamics, state: &mut [f64], dt: f64, method: Method) {
    match method {
        Method::SemiImplicitEuler => semi_implicit_euler(dynamics, state, dt),
        Method::Rk4 => rk4(dynamics, state, dt),
    }
}

/// Largest absolute component of the state.
pub fn magnitude(state: &[f64]) -> f64 {
    state.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// Fail if any component exceeds `bound` (or is NaN).
pub fn check_magnitude(state: &[f64], bound: f64) -> Result<()> {
    let m = magnitude(state);
    if m.is_nan() || state.iter().any(|v| v.is_nan()) || m > bound {
        return Err(SimError::NumericInstability { magnitude: m });
    }
    Ok(())
}

fn semi_implicit_euler(dynamics: &dyn Dynamics, state: &mut [f64], dt: f64) {
    let n = state.len() / 2;
    let mut rate = vec![0.0; state.len()];
    dynamics.derivative(state, &mut rate);

    // Velocities first, then positions with the updated velocities
    for i in n..state.len() {
        state[i] += rate[i] * dt;
    }
    for i in 0..n {
        state[i] += state[n + i] * dt;
    }
}

fn rk4(dynamics: &dyn Dynamics, state: &mut [f64], dt: f64) {
    let len = state.len();
    let mut k1 = vec![0.0; len];
    let mut k2 = vec![0.0; len];
    let mut k3 = vec![0.0; len];
    let mut k4 = vec![0.0; len];
    let mut probe = vec![0.0; len];

    dynamics.derivative(state, &mut k1);

    offset(state, &k1, 0.5 * dt, &mut probe);
    dynamics.derivative(&probe, &mut k2);

    offset(state, &k2, 0.5 * dt, &mut probe);
    dynamics.derivative(&probe, &mut k3);

    offset(state, &k3, dt, &mut probe);
    dynamics.derivative(&probe, &mut k4);

    for i in 0..len {
        state[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
}

/// out = base + k * h
fn offset(base: &[f64], k: &[f64], h: f64, out: &mut [f64]) {
    for ((o, b), d) in out.iter_mut().zip(base).zip(k) {
        *o = b + d * h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Harmonic, SimulationKind, System};

    fn oscillator() -> Harmonic {
        match System::new(SimulationKind::Sho) {
            System::Sho(h) => h,
            _ => unreachable!(),
        }
    }

    #[test]
    fn semi_implicit_euler_uses_new_velocity() {
        // x'' = -x from x=1, v=0: v1 = -dt, x1 = 1 - dt^2
        let sho = oscillator();
        let mut state = vec![1.0, 0.0];
        step(&sho, &mut state, 0.1, Method::SemiImplicitEuler);
        assert!((state[1] + 0.1).abs() < 1e-12);
        assert!((state[0] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn rk4_tracks_cosine() {
        let sho = oscillator();
        let mut state = vec![1.0, 0.0];
        let dt = 0.01;
        for _ in 0..100 {
            step(&sho, &mut state, dt, Method::Rk4);
        }
        assert!((state[0] - 1.0_f64.cos()).abs() < 1e-9);
        assert!((state[1] + 1.0_f64.sin()).abs() < 1e-9);
    }

    #[test]
    fn check_magnitude_flags_nan_and_overflow() {
        assert!(check_magnitude(&[1.0, -2.0], 10.0).is_ok());
        assert!(check_magnitude(&[1.0, 20.0], 10.0).is_err());
        assert!(check_magnitude(&[f64::NAN, 0.0], 10.0).is_err());
    }
}
