//! Atwood's machine against its closed-form solution

use physdemo_core::tests::test_helpers::{approx_eq, params, run_ticks};
use physdemo_core::{Constraint, Event, ParameterUpdate, SimulationKind, SimulationRunner};

#[test]
fn test_heavier_left_mass_accelerates_at_analytic_rate() {
    let mut runner = SimulationRunner::new(
        SimulationKind::Atwood,
        &params(&[("mass1", 2.0), ("mass2", 1.0), ("gravity", 9.8)]),
    )
    .unwrap();

    let start = runner.snapshot();
    let a = start.quantity("acceleration_magnitude").unwrap();
    assert!(approx_eq(a, 3.267, 1e-3), "a = {a}");
    assert!(approx_eq(start.quantity("acceleration").unwrap(), -9.8 / 3.0, 1e-12));
    assert!(approx_eq(start.quantity("tension").unwrap(), 4.0 * 9.8 / 3.0, 1e-12));

    let (y1_0, y2_0) = (start.state[0], start.state[1]);
    for snap in run_ticks(&mut runner, 40).unwrap() {
        let t = snap.time;
        let drop = 0.5 * (9.8 / 3.0) * t * t;
        assert!(approx_eq(snap.state[0], y1_0 - drop, 1e-9), "y1 at t = {t}");
        assert!(approx_eq(snap.state[1], y2_0 + drop, 1e-9), "y2 at t = {t}");
        assert!(approx_eq(snap.state[2], -(9.8 / 3.0) * t, 1e-9));
        assert!(snap.events.is_empty());
    }
}

#[test]
fn test_energy_conserved_while_free() {
    let mut runner = SimulationRunner::new(SimulationKind::Atwood, &params(&[])).unwrap();
    let e0 = runner.snapshot().energy.total();
    for snap in run_ticks(&mut runner, 30).unwrap() {
        assert!(approx_eq(snap.energy.total(), e0, 1e-9 * e0.abs()));
    }
}

#[test]
fn test_rising_mass_jams_at_pulley() {
    let mut runner = SimulationRunner::new(SimulationKind::Atwood, &params(&[])).unwrap();
    let snapshots = run_ticks(&mut runner, 100).unwrap();

    let jams: Vec<_> = snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| matches!(e, Event::ConstraintTransition { to: Constraint::Resting, .. }))
        .collect();
    assert_eq!(jams.len(), 1);

    let last = snapshots.last().unwrap();
    assert!(approx_eq(last.state[0], -0.3, 1e-12));
    assert_eq!(&last.state[2..], &[0.0, 0.0]);
    assert_eq!(last.quantity("acceleration"), Some(0.0));
}

#[test]
fn test_jam_releases_after_mass_change() {
    let mut runner = SimulationRunner::new(SimulationKind::Atwood, &params(&[])).unwrap();
    run_ticks(&mut runner, 100).unwrap();

    runner.apply_update(&ParameterUpdate::new("mass1", 5.0)).unwrap();
    let release = runner.tick().unwrap();
    assert!(release
        .events
        .iter()
        .any(|e| matches!(e, Event::ConstraintTransition { to: Constraint::Moving, .. })));

    let moving = runner.tick().unwrap();
    assert!(moving.state[0] < -0.3);
    assert!(moving.state[2] < 0.0);
}

#[test]
fn test_jam_keeps_running_string_after_length_update() {
    let mut runner = SimulationRunner::new(SimulationKind::Atwood, &params(&[])).unwrap();
    run_ticks(&mut runner, 5).unwrap();
    let before = runner.snapshot();
    let sum = before.state[0] + before.state[1];

    // string_length only applies on reset; the running string is unchanged.
    runner
        .apply_update(&ParameterUpdate::new("string_length", 8.0))
        .unwrap();

    let mut previous = before.state.clone();
    for snap in run_ticks(&mut runner, 200).unwrap() {
        assert!(
            approx_eq(snap.state[0] + snap.state[1], sum, 1e-9),
            "y1 + y2 = {} at t = {}",
            snap.state[0] + snap.state[1],
            snap.time
        );
        // No teleporting: each mass moves at most a few centimetres per tick.
        assert!((snap.state[1] - previous[1]).abs() < 0.2, "jump at t = {}", snap.time);
        previous = snap.state.clone();
    }
    assert!(approx_eq(runner.snapshot().state[0], -0.3, 1e-12));
}
