//! Projectile flight, landing and bouncing

use physdemo_core::tests::test_helpers::{params, run_ticks};
use physdemo_core::{Event, SimulationKind, SimulationRunner};

#[test]
fn test_lands_near_analytic_range() {
    let mut runner = SimulationRunner::new(SimulationKind::Projectile, &params(&[])).unwrap();
    let range = runner.snapshot().quantity("range").unwrap();

    let snapshots = run_ticks(&mut runner, 100).unwrap();
    let last = snapshots.last().unwrap();

    assert_eq!(last.state[1], 0.0);
    assert_eq!(&last.state[2..], &[0.0, 0.0]);
    assert!((last.state[0] - range).abs() < 1.0, "landed at {} vs {range}", last.state[0]);
    assert!(snapshots.iter().all(|s| s.state[1] >= 0.0));
}

#[test]
fn test_peak_height_close_to_analytic() {
    let mut runner = SimulationRunner::new(SimulationKind::Projectile, &params(&[("angle", 90.0)])).unwrap();
    let h = runner.snapshot().quantity("max_height").unwrap();
    let peak = run_ticks(&mut runner, 100)
        .unwrap()
        .iter()
        .map(|s| s.state[1])
        .fold(0.0_f64, f64::max);
    assert!((peak - h).abs() < 0.6, "peak {peak} vs {h}");
}

#[test]
fn test_bouncing_ball_loses_height_then_rests() {
    let mut runner = SimulationRunner::new(
        SimulationKind::Projectile,
        &params(&[("bounce", 1.0), ("restitution", 0.5)]),
    )
    .unwrap();

    let snapshots = run_ticks(&mut runner, 400).unwrap();
    let bounces = snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| matches!(e, Event::BoundaryCross { .. }))
        .count();
    assert!(bounces >= 2, "{bounces} bounces");

    let last = snapshots.last().unwrap();
    assert_eq!(last.state[1], 0.0);
    assert_eq!(last.state[3], 0.0);
    assert_eq!(last.quantity("bounces"), Some(bounces as f64));
}
