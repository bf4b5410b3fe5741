//! Snapping a straight line onto a sampled curve.
//!
//! Pure geometry over `DVec2` samples. Nothing here is stepped in time.

use glam::DVec2;
use std::f64::consts::TAU;

/// Sample count of the demo curve.
pub const QUADRATIC_SAMPLES: usize = 200;

/// Sample closest to `cursor` and its distance. O(n).
pub fn nearest_point(samples: &[DVec2], cursor: DVec2) -> Option<(DVec2, f64)> {
    nearest_index(samples, cursor).map(|i| (samples[i], samples[i].distance(cursor)))
}

pub fn nearest_index(samples: &[DVec2], cursor: DVec2) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.distance_squared(cursor)
                .total_cmp(&b.distance_squared(cursor))
        })
        .map(|(i, _)| i)
}

/// Index of the sample whose x is closest to `x`, for samples sorted by x.
/// O(log n).
pub fn nearest_index_by_x(samples: &[DVec2], x: f64) -> Option<usize> {
    if samples.is_empty() {
        return None;
    }
    let upper = samples.partition_point(|p| p.x < x);
    if upper == 0 {
        return Some(0);
    }
    if upper == samples.len() {
        return Some(samples.len() - 1);
    }
    let lower = upper - 1;
    if (x - samples[lower].x).abs() <= (samples[upper].x - x).abs() {
        Some(lower)
    } else {
        Some(upper)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| start + step * i as f64)
}

/// `y = 2x² - 0.4` on `[-0.9, 0.9]`.
pub fn quadratic_curve(n: usize) -> Vec<DVec2> {
    linspace(-0.9, 0.9, n)
        .map(|x| DVec2::new(x, 2.0 * x * x - 0.4))
        .collect()
}

/// `n` points on the unit circle, starting at angle zero.
pub fn unit_circle(n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|i| DVec2::from_angle(TAU * i as f64 / n as f64))
        .collect()
}

/// A movable line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapLine {
    pub start: DVec2,
    pub end: DVec2,
}

impl SnapLine {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    /// A line through `center` at `angle_deg`, long enough to cross the
    /// whole viewport `[min, max]` diagonally.
    pub fn at_angle(angle_deg: f64, center: DVec2, min: DVec2, max: DVec2) -> Self {
        let half = 0.5 * (max - min).length();
        let reach = DVec2::from_angle(angle_deg.to_radians()) * half;
        Self::new(center - reach, center + reach)
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) * 0.5
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn angle_deg(&self) -> f64 {
        let d = self.end - self.start;
        d.y.atan2(d.x).to_degrees()
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.start += delta;
        self.end += delta;
    }

    /// Rotate about the midpoint by whole degrees, counter-clockwise.
    pub fn rotate(&mut self, degrees: i32) {
        let mid = self.midpoint();
        let turn = DVec2::from_angle(f64::from(degrees).to_radians());
        self.start = mid + turn.rotate(self.start - mid);
        self.end = mid + turn.rotate(self.end - mid);
    }

    /// Move the line so its midpoint lands on `target`.
    pub fn snap_midpoint_to(&mut self, target: DVec2) {
        let delta = target - self.midpoint();
        self.translate(delta);
    }

    /// Put whichever endpoint is closer to the curve point nearest `cursor`
    /// onto that point. Returns the point used.
    pub fn snap_endpoint(&mut self, samples: &[DVec2], cursor: DVec2) -> Option<DVec2> {
        let (target, _) = nearest_point(samples, cursor)?;
        if self.start.distance_squared(target) <= self.end.distance_squared(target) {
            self.start = target;
        } else {
            self.end = target;
        }
        Some(target)
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: DVec2) -> f64 {
        let d = self.end - self.start;
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return self.start.distance(p);
        }
        let t = ((p - self.start).dot(d) / len2).clamp(0.0, 1.0);
        (self.start + d * t).distance(p)
    }

    /// The segment between the two samples closest to this line, in curve
    /// order. `None` with fewer than two samples.
    pub fn trim(&self, samples: &[DVec2]) -> Option<SnapLine> {
        if samples.len() < 2 {
            return None;
        }
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.sort_by(|&a, &b| {
            self.distance_to_point(samples[a])
                .total_cmp(&self.distance_to_point(samples[b]))
        });
        let (i, j) = (order[0].min(order[1]), order[0].max(order[1]));
        Some(SnapLine::new(samples[i], samples[j]))
    }
}
