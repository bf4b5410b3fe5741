//! Energy behaviour of the mass-spring system

use physdemo_core::tests::test_helpers::{approx_eq, params, rel_eq};
use physdemo_core::{Event, SimulationKind, SimulationRunner, Warning};
use std::f64::consts::TAU;

#[test]
fn test_undamped_energy_drift_below_one_percent() {
    let mut runner = SimulationRunner::new(SimulationKind::Sho, &params(&[])).unwrap();
    let e0 = runner.snapshot().energy.total();

    let mut worst = 0.0_f64;
    for _ in 0..10_000 {
        let snap = runner.tick().unwrap();
        worst = worst.max((snap.energy.total() - e0).abs() / e0);
        assert!(
            !snap.warnings.iter().any(|w| matches!(w, Warning::EnergyDrift { .. })),
            "drift warning at t = {}",
            snap.time
        );
    }
    assert!(worst < 0.01, "worst relative drift {worst}");
}

#[test]
fn test_damping_removes_energy() {
    let mut runner = SimulationRunner::new(SimulationKind::Sho, &params(&[("damping", 0.5)])).unwrap();
    let e0 = runner.snapshot().energy.total();

    let mut last = e0;
    for _ in 0..600 {
        let snap = runner.tick().unwrap();
        assert!(snap.energy.total() <= last + 1e-9);
        last = snap.energy.total();
    }
    assert!(last < 0.2 * e0);
}

#[test]
fn test_equilibrium_crossings_measure_period() {
    let mut runner = SimulationRunner::new(
        SimulationKind::Sho,
        &params(&[("spring_constant", 4.0), ("mass", 1.0)]),
    )
    .unwrap();

    let mut crossings = 0;
    let mut last = None;
    for _ in 0..1_000 {
        let snap = runner.tick().unwrap();
        crossings += snap
            .events
            .iter()
            .filter(|e| matches!(e, Event::BoundaryCross { .. }))
            .count();
        last = Some(snap);
    }
    let snap = last.unwrap();
    assert!(crossings >= 4);

    // T = 2 pi / 2, measured to within one step either side
    let measured = snap.quantity("measured_period").unwrap();
    assert!(approx_eq(measured, TAU / 2.0, 2.0 * runner.step_size()), "measured {measured}");
    assert!(rel_eq(snap.quantity("period").unwrap(), TAU / 2.0, 1e-12));
}

#[test]
fn test_stiffening_spring_mid_run_rebaselines_energy() {
    let mut runner = SimulationRunner::new(SimulationKind::Sho, &params(&[])).unwrap();
    for _ in 0..30 {
        runner.tick().unwrap();
    }
    runner
        .apply_update(&physdemo_core::ParameterUpdate::new("spring_constant", 3.0))
        .unwrap();
    for _ in 0..300 {
        let snap = runner.tick().unwrap();
        assert!(snap.warnings.is_empty(), "{:?}", snap.warnings);
    }
}
