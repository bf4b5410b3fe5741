//! Constant-torque spin-up of rigid bodies

use physdemo_core::tests::test_helpers::{approx_eq, params, run_ticks};
use physdemo_core::{SimulationKind, SimulationRunner, Warning};
use std::f64::consts::TAU;

#[test]
fn test_disk_spins_up_uniformly() {
    let mut runner = SimulationRunner::new(SimulationKind::RigidRotation, &params(&[])).unwrap();
    // I = 1/2 m r^2 = 0.125, alpha = 8
    for snap in run_ticks(&mut runner, 50).unwrap() {
        let t = snap.time;
        assert!(approx_eq(snap.state[1], 8.0 * t, 1e-9));
        assert!(approx_eq(snap.state[0], 4.0 * t * t, 1e-9));
        assert!(approx_eq(snap.quantity("angular_acceleration").unwrap(), 8.0, 1e-12));
    }
}

#[test]
fn test_shape_changes_inertia() {
    for (shape, inertia) in [(0.0, 0.125), (1.0, 0.25), (2.0, 1.0 / 3.0), (3.0, 0.1)] {
        let runner = SimulationRunner::new(SimulationKind::RigidRotation, &params(&[("shape", shape)])).unwrap();
        let got = runner.snapshot().quantity("inertia").unwrap();
        assert!(approx_eq(got, inertia, 1e-12), "shape {shape}: {got}");
    }
}

#[test]
fn test_wrapped_angle_keeps_revolution_count() {
    let mut runner = SimulationRunner::new(SimulationKind::RigidRotation, &params(&[])).unwrap();
    let snapshots = run_ticks(&mut runner, 200).unwrap();
    let last = snapshots.last().unwrap();

    let unwrapped = 4.0 * last.time * last.time;
    assert!(last.state[0] >= 0.0 && last.state[0] <= 4.0 * std::f64::consts::PI);
    assert!(approx_eq(last.quantity("revolutions").unwrap(), unwrapped / TAU, 1e-6));
}

#[test]
fn test_friction_approaches_terminal_speed() {
    let mut runner = SimulationRunner::new(
        SimulationKind::RigidRotation,
        &params(&[("friction", 0.25), ("inertia", 0.5)]),
    )
    .unwrap();
    let last = run_ticks(&mut runner, 2_000).unwrap().pop().unwrap();
    // omega -> torque / friction
    assert!(approx_eq(last.state[1], 4.0, 1e-6));
}

#[test]
fn test_runaway_spin_keeps_fixed_step() {
    // I = 5e-4, alpha = 2e5: omega reaches the 1e6 bound at t = 5 s.
    let mut runner = SimulationRunner::new(
        SimulationKind::RigidRotation,
        &params(&[("mass", 0.1), ("radius", 0.1), ("torque", 100.0)]),
    )
    .unwrap();
    let dt = runner.step_size();

    let mut last_time = 0.0;
    for snap in run_ticks(&mut runner, 600).unwrap() {
        assert_eq!(runner.step_size(), dt);
        assert!(snap.time >= last_time);
        let unstable = snap
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::NumericInstability { .. }))
            .count();
        assert!(unstable <= 1);
        last_time = snap.time;
    }
    assert!(approx_eq(last_time, 5.0, 0.05), "t = {last_time}");
    assert!(runner.snapshot().state[1] <= 1e6);
}
