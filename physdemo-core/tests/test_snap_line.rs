//! Snapping lines onto sampled curves

use glam::DVec2;
use physdemo_core::snap::{nearest_index_by_x, nearest_point, quadratic_curve, unit_circle, QUADRATIC_SAMPLES};
use physdemo_core::tests::test_helpers::approx_eq;
use physdemo_core::SnapLine;

#[test]
fn test_cursor_snaps_to_nearest_circle_point() {
    let circle = unit_circle(360);
    let (point, distance) = nearest_point(&circle, DVec2::new(0.9, 0.9)).unwrap();

    let diag = std::f64::consts::FRAC_1_SQRT_2;
    assert!(approx_eq(point.x, diag, 1e-9));
    assert!(approx_eq(point.y, diag, 1e-9));
    assert!(approx_eq(distance, 0.9 * 2f64.sqrt() - 1.0, 1e-9));
}

#[test]
fn test_snap_workflow_on_quadratic() {
    let curve = quadratic_curve(QUADRATIC_SAMPLES);
    let view_min = DVec2::new(-1.0, -0.5);
    let view_max = DVec2::new(1.0, 1.5);

    let mut line = SnapLine::at_angle(30.0, DVec2::ZERO, view_min, view_max);
    line.translate(DVec2::new(0.1, 0.2));
    line.rotate(-5);
    assert!(approx_eq(line.angle_deg(), 25.0, 1e-9));

    let target = nearest_index_by_x(&curve, 0.5).unwrap();
    line.snap_midpoint_to(curve[target]);
    assert!(approx_eq(line.midpoint().x, curve[target].x, 1e-12));

    let trimmed = line.trim(&curve).unwrap();
    assert!(trimmed.start.x <= trimmed.end.x);
    assert!(line.distance_to_point(trimmed.start) < 0.05);
    assert!(line.distance_to_point(trimmed.end) < 0.05);
}
