//! Painter drawing for each demo, in world coordinates mapped onto the canvas.

use eframe::egui;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};
use physdemo_core::glam::DVec2;
use physdemo_core::{ParameterSet, Shape, SimulationKind, Snapshot};

/// Maps a world-space box onto a screen rect, y up, keeping aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    screen: Rect,
    world_center: DVec2,
    scale: f32,
}

impl Viewport {
    pub fn fit(screen: Rect, min: DVec2, max: DVec2) -> Self {
        let size = (max - min).max(DVec2::splat(1e-6));
        let scale = (screen.width() / size.x as f32).min(screen.height() / size.y as f32) * 0.9;
        Self {
            screen,
            world_center: (min + max) * 0.5,
            scale,
        }
    }

    pub fn to_screen(&self, p: DVec2) -> Pos2 {
        let d = p - self.world_center;
        self.screen.center() + egui::vec2(d.x as f32 * self.scale, -d.y as f32 * self.scale)
    }

    pub fn to_world(&self, p: Pos2) -> DVec2 {
        let d = p - self.screen.center();
        self.world_center + DVec2::new(f64::from(d.x / self.scale), f64::from(-d.y / self.scale))
    }

    pub fn length(&self, world: f64) -> f32 {
        world as f32 * self.scale
    }
}

fn param(params: &ParameterSet, name: &str) -> f64 {
    params.get(name).copied().unwrap_or_default()
}

/// Draw one snapshot of any kind.
pub fn draw(painter: &Painter, rect: Rect, snap: &Snapshot, params: &ParameterSet, trail: &[DVec2]) {
    match snap.kind {
        SimulationKind::Projectile => draw_projectile(painter, rect, snap, trail),
        SimulationKind::Sho => draw_spring(painter, rect, snap, params),
        SimulationKind::Collision1D => draw_blocks(painter, rect, snap, params),
        SimulationKind::Atwood => draw_atwood(painter, rect, snap, params),
        SimulationKind::RigidRotation => draw_rotation(painter, rect, snap, params),
    }
}

fn draw_projectile(painter: &Painter, rect: Rect, snap: &Snapshot, trail: &[DVec2]) {
    let range = snap.quantity("range").unwrap_or(10.0).max(1.0);
    let top = snap.quantity("max_height").unwrap_or(5.0).max(1.0);
    let view = Viewport::fit(rect, DVec2::new(-1.0, -1.0), DVec2::new(range * 1.1 + 1.0, top * 1.2 + 1.0));

    painter.line_segment(
        [view.to_screen(DVec2::new(-1.0, 0.0)), view.to_screen(DVec2::new(range * 1.1 + 1.0, 0.0))],
        Stroke::new(2.0, Color32::DARK_GREEN),
    );

    if trail.len() > 1 {
        let points: Vec<Pos2> = trail.iter().map(|p| view.to_screen(*p)).collect();
        painter.add(egui::Shape::line(points, Stroke::new(1.0, Color32::GRAY)));
    }

    if let Some(body) = snap.bodies.first() {
        let pos = view.to_screen(body.position);
        painter.circle_filled(pos, 6.0, Color32::LIGHT_RED);
        // velocity arrow
        let tip = view.to_screen(body.position + body.velocity * 0.1);
        painter.arrow(pos, tip - pos, Stroke::new(1.5, Color32::YELLOW));
    }
}

/// Zig-zag spring between two screen points.
fn spring_points(from: Pos2, to: Pos2, coils: usize, width: f32) -> Vec<Pos2> {
    let along = to - from;
    let normal = egui::vec2(-along.y, along.x).normalized() * width;
    let segments = coils * 2;
    let mut points = vec![from];
    for i in 1..segments {
        let t = i as f32 / segments as f32;
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        points.push(from + along * t + normal * side);
    }
    points.push(to);
    points
}

fn draw_spring(painter: &Painter, rect: Rect, snap: &Snapshot, params: &ParameterSet) {
    let amplitude = param(params, "amplitude").max(0.5);
    let anchor = -amplitude - 1.5;
    let view = Viewport::fit(
        rect,
        DVec2::new(anchor - 0.5, -amplitude),
        DVec2::new(amplitude + 1.0, amplitude),
    );

    let wall = view.to_screen(DVec2::new(anchor, 0.0));
    painter.line_segment(
        [wall - egui::vec2(0.0, 40.0), wall + egui::vec2(0.0, 40.0)],
        Stroke::new(3.0, Color32::GRAY),
    );
    // equilibrium marker
    let zero = view.to_screen(DVec2::ZERO);
    painter.line_segment(
        [zero - egui::vec2(0.0, 30.0), zero + egui::vec2(0.0, 30.0)],
        Stroke::new(1.0, Color32::DARK_GRAY),
    );

    if let Some(body) = snap.bodies.first() {
        let pos = view.to_screen(body.position);
        painter.add(egui::Shape::line(
            spring_points(wall, pos, 12, 8.0),
            Stroke::new(1.5, Color32::LIGHT_BLUE),
        ));
        painter.rect_filled(Rect::from_center_size(pos, egui::vec2(28.0, 28.0)), 2.0, Color32::BLUE);
    }
}

fn draw_blocks(painter: &Painter, rect: Rect, snap: &Snapshot, params: &ParameterSet) {
    let left = param(params, "wall_left");
    let right = param(params, "wall_right");
    let width = param(params, "block_width");
    let view = Viewport::fit(rect, DVec2::new(left - 0.5, -1.5), DVec2::new(right + 0.5, 1.5));

    for x in [left, right] {
        painter.line_segment(
            [view.to_screen(DVec2::new(x, -0.2)), view.to_screen(DVec2::new(x, 1.0))],
            Stroke::new(3.0, Color32::GRAY),
        );
    }
    painter.line_segment(
        [view.to_screen(DVec2::new(left, -0.2)), view.to_screen(DVec2::new(right, -0.2))],
        Stroke::new(1.0, Color32::GRAY),
    );

    let colors = [Color32::LIGHT_BLUE, Color32::LIGHT_RED];
    for (body, color) in snap.bodies.iter().zip(colors) {
        let center = view.to_screen(body.position + DVec2::new(0.0, width * 0.5 - 0.2));
        let size = egui::vec2(view.length(width), view.length(width));
        painter.rect_filled(Rect::from_center_size(center, size), 2.0, color);
        painter.text(
            center - egui::vec2(0.0, size.y * 0.5 + 4.0),
            Align2::CENTER_BOTTOM,
            format!("{:+.2} m/s", body.velocity.x),
            FontId::monospace(12.0),
            Color32::WHITE,
        );
    }
}

fn draw_atwood(painter: &Painter, rect: Rect, snap: &Snapshot, params: &ParameterSet) {
    let r = param(params, "pulley_radius");
    let length = param(params, "string_length");
    let view = Viewport::fit(rect, DVec2::new(-1.5, -length - 0.5), DVec2::new(1.5, r + 0.5));

    let axle = view.to_screen(DVec2::ZERO);
    painter.line_segment(
        [view.to_screen(DVec2::new(0.0, r + 0.4)), axle],
        Stroke::new(2.0, Color32::GRAY),
    );
    painter.circle_stroke(axle, view.length(r), Stroke::new(2.0, Color32::GRAY));
    painter.circle_filled(axle, 3.0, Color32::GRAY);

    let colors = [Color32::LIGHT_BLUE, Color32::LIGHT_RED];
    let masses = [param(params, "mass1"), param(params, "mass2")];
    for ((body, color), mass) in snap.bodies.iter().zip(colors).zip(masses) {
        let top = view.to_screen(DVec2::new(body.position.x, 0.0));
        let pos = view.to_screen(body.position);
        painter.line_segment([top, pos], Stroke::new(1.0, Color32::WHITE));
        let side = 14.0 + 6.0 * mass.sqrt() as f32;
        painter.rect_filled(Rect::from_center_size(pos, egui::vec2(side, side)), 2.0, color);
        painter.text(
            pos + egui::vec2(side, 0.0),
            Align2::LEFT_CENTER,
            format!("{mass:.1} kg"),
            FontId::monospace(12.0),
            Color32::WHITE,
        );
    }
}

fn draw_rotation(painter: &Painter, rect: Rect, snap: &Snapshot, params: &ParameterSet) {
    let r = param(params, "radius");
    let reach = match Shape::from_index(param(params, "shape")) {
        Some(Shape::Rod) => 2.0 * r,
        _ => r,
    };
    let view = Viewport::fit(rect, DVec2::splat(-reach * 1.3), DVec2::splat(reach * 1.3));
    let Some(body) = snap.bodies.first() else {
        return;
    };
    let center = view.to_screen(DVec2::ZERO);
    let spoke = DVec2::from_angle(body.angle);
    let stroke = Stroke::new(2.0, Color32::WHITE);

    match Shape::from_index(param(params, "shape")).unwrap_or_default() {
        Shape::Disk => {
            painter.circle_filled(center, view.length(r), Color32::BLUE);
            painter.line_segment([center, view.to_screen(spoke * r)], stroke);
        }
        Shape::Ring => {
            painter.circle_stroke(center, view.length(r), Stroke::new(6.0, Color32::GREEN));
            painter.line_segment([center, view.to_screen(spoke * r)], stroke);
        }
        Shape::Rod => {
            painter.line_segment(
                [center, view.to_screen(spoke * 2.0 * r)],
                Stroke::new(6.0, Color32::RED),
            );
        }
        Shape::Sphere => {
            painter.circle_filled(center, view.length(r), Color32::from_rgb(128, 0, 128));
            painter.circle_stroke(center, view.length(r) * 0.6, Stroke::new(1.0, Color32::LIGHT_GRAY));
            painter.line_segment([center, view.to_screen(spoke * r)], stroke);
        }
    }
    painter.circle_filled(center, 3.0, Color32::GRAY);
}
