//! Interactive viewer: a menu of demos, each stepped live with sliders,
//! plus the line snapping tool.
//!
//! When opened with a scenario file the file is watched and the demo is
//! rebuilt whenever it changes.

use crate::history::History;
use crate::render::{self, Viewport};
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use notify::{Event, RecommendedWatcher, Watcher};
use physdemo_core::glam::DVec2;
use physdemo_core::snap::{self, QUADRATIC_SAMPLES};
use physdemo_core::{
    Domain, Effect, ParameterSet, ParameterUpdate, ScenarioConfig, SimulationKind,
    SimulationRunner, SnapLine, Snapshot,
};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

const TRAIL_LIMIT: usize = 2_000;

pub fn run(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Physics Demos",
        options,
        Box::new(move |cc| Ok(Box::new(DemoApp::new(config, cc)))),
    )?;
    Ok(())
}

enum Screen {
    Menu,
    Demo(Box<DemoView>),
    Snap(SnapView),
}

/// What a screen asks the app to do after drawing.
enum Action {
    Stay,
    Open(SimulationKind),
    OpenSnap,
    Menu,
}

/// Playback state shared by every demo screen.
struct Controls {
    playing: bool,
    speed_multiplier: f32,
    step_budget: f32,
    last_error: Option<String>,
}

/// One running demo and what the screen needs to draw it.
struct DemoView {
    runner: SimulationRunner,
    snapshot: Snapshot,
    params: ParameterSet,
    trail: Vec<DVec2>,
    history: History,
    notices: Vec<String>,
    frame_interval: Duration,
}

impl DemoView {
    fn new(config: ScenarioConfig) -> physdemo_core::Result<Self> {
        let frame_interval = Duration::from_millis(config.frame_interval_ms);
        let runner = SimulationRunner::from_config(config)?;
        let snapshot = runner.snapshot();
        let mut view = Self {
            params: runner.parameters(),
            runner,
            snapshot,
            trail: Vec::new(),
            history: History::default(),
            notices: Vec::new(),
            frame_interval,
        };
        view.record();
        Ok(view)
    }

    fn record(&mut self) {
        self.history.record(&self.snapshot);
        if self.snapshot.kind != SimulationKind::Projectile {
            return;
        }
        if let Some(body) = self.snapshot.bodies.first() {
            if self.trail.len() < TRAIL_LIMIT {
                self.trail.push(body.position);
            }
        }
    }

    fn step(&mut self) -> physdemo_core::Result<()> {
        let snap = self.runner.tick()?;
        if !snap.warnings.is_empty() {
            self.notices = snap.warnings.iter().map(ToString::to_string).collect();
        }
        self.snapshot = snap;
        self.record();
        Ok(())
    }

    /// Restart with the current slider values.
    fn reset(&mut self) -> physdemo_core::Result<()> {
        let params = self.runner.parameters();
        self.runner.reset(&params)?;
        self.snapshot = self.runner.snapshot();
        self.trail.clear();
        self.history.clear();
        self.notices.clear();
        self.record();
        Ok(())
    }

    fn apply(&mut self, name: &str, value: f64, effect: Effect) -> physdemo_core::Result<()> {
        self.runner.apply_update(&ParameterUpdate::new(name, value))?;
        self.params = self.runner.parameters();
        match effect {
            Effect::Initial => self.reset(),
            Effect::Live => {
                self.snapshot = self.runner.snapshot();
                Ok(())
            }
        }
    }
}

struct SnapView {
    curve: Vec<DVec2>,
    line: Option<SnapLine>,
    angle_text: String,
    snap_x_text: String,
    target: usize,
    message: Option<String>,
}

impl SnapView {
    const VIEW_MIN: DVec2 = DVec2::new(-1.0, -0.6);
    const VIEW_MAX: DVec2 = DVec2::new(1.0, 1.4);

    fn new() -> Self {
        Self {
            curve: snap::quadratic_curve(QUADRATIC_SAMPLES),
            line: None,
            angle_text: "0".to_string(),
            snap_x_text: String::new(),
            target: QUADRATIC_SAMPLES / 2,
            message: None,
        }
    }

    fn insert_line(&mut self) {
        match self.angle_text.trim().parse::<f64>() {
            Ok(angle) => {
                let center = self.line.map_or(DVec2::ZERO, |l| l.midpoint());
                self.line = Some(SnapLine::at_angle(angle, center, Self::VIEW_MIN, Self::VIEW_MAX));
                self.message = None;
            }
            Err(_) => self.message = Some("Invalid input. Please enter a numeric angle.".into()),
        }
    }

    fn set_target(&mut self) {
        match self.snap_x_text.trim().parse::<f64>() {
            Ok(x) => {
                if let Some(idx) = snap::nearest_index_by_x(&self.curve, x) {
                    self.target = idx;
                    self.message = Some(format!("Snap target set to x = {:.4}", self.curve[idx].x));
                }
            }
            Err(_) => self.message = Some("Invalid input. Enter a numeric x-value.".into()),
        }
    }

    fn with_line(&mut self, f: impl FnOnce(&mut SnapLine, &[DVec2], usize)) {
        match self.line.as_mut() {
            Some(line) => f(line, &self.curve, self.target),
            None => self.message = Some("Give an angle first.".into()),
        }
    }
}

pub struct DemoApp {
    screen: Screen,
    controls: Controls,
    config_path: Option<PathBuf>,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
    needs_reload: bool,
}

impl DemoApp {
    pub fn new(config_path: Option<PathBuf>, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = None;
        if let Some(path) = &config_path {
            watcher = notify::recommended_watcher(move |res| {
                let _ = tx.send(res);
            })
            .ok();
            if let Some(w) = watcher.as_mut() {
                if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                    tracing::warn!(path = %path.display(), error = %e, "cannot watch scenario file");
                }
            }
        }

        let mut app = Self {
            screen: Screen::Menu,
            controls: Controls {
                playing: false,
                speed_multiplier: 1.0,
                step_budget: 0.0,
                last_error: None,
            },
            config_path,
            file_watcher: watcher,
            file_receiver: rx,
            needs_reload: false,
        };

        if app.config_path.is_some() {
            app.reload_scenario();
        }
        app
    }

    fn reload_scenario(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        let loaded = ScenarioConfig::load(path).and_then(DemoView::new);
        match loaded {
            Ok(view) => {
                tracing::info!(path = %path.display(), "scenario loaded");
                self.screen = Screen::Demo(Box::new(view));
                self.controls.last_error = None;
            }
            Err(e) => {
                self.controls.last_error = Some(e.to_string());
                self.controls.playing = false;
            }
        }
    }

    fn open(&mut self, kind: SimulationKind) {
        match DemoView::new(ScenarioConfig::new(kind)) {
            Ok(view) => {
                self.screen = Screen::Demo(Box::new(view));
                self.controls.last_error = None;
            }
            Err(e) => self.controls.last_error = Some(e.to_string()),
        }
        self.controls.playing = false;
    }

    fn check_file_changes(&mut self) {
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if let Some(path) = &self.config_path {
                        if paths.iter().any(|p| p.ends_with(path) || path.ends_with(p)) {
                            self.needs_reload = true;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "file watcher error");
                }
            }
        }

        if self.needs_reload {
            self.reload_scenario();
            self.needs_reload = false;
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        let action = match &mut self.screen {
            Screen::Menu => menu_ui(ctx, &self.controls),
            Screen::Demo(view) => demo_ui(ctx, view, &mut self.controls),
            Screen::Snap(view) => snap_ui(ctx, view),
        };

        match action {
            Action::Stay => {}
            Action::Open(kind) => self.open(kind),
            Action::OpenSnap => self.screen = Screen::Snap(SnapView::new()),
            Action::Menu => {
                self.screen = Screen::Menu;
                self.controls.playing = false;
                self.controls.last_error = None;
            }
        }

        if let Screen::Demo(view) = &self.screen {
            if self.controls.playing {
                ctx.request_repaint_after(view.frame_interval);
            }
        }
    }
}

fn menu_ui(ctx: &egui::Context, controls: &Controls) -> Action {
    let mut action = Action::Stay;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(30.0);
            ui.heading("Physics Simulations");
            ui.add_space(20.0);
            for kind in SimulationKind::ALL {
                if ui
                    .add_sized([320.0, 36.0], egui::Button::new(kind.title()))
                    .clicked()
                {
                    action = Action::Open(kind);
                }
                ui.label(egui::RichText::new(kind.description()).weak());
                ui.add_space(10.0);
            }
            if ui
                .add_sized([320.0, 36.0], egui::Button::new("Line Snap Tool"))
                .clicked()
            {
                action = Action::OpenSnap;
            }
            ui.label(egui::RichText::new("Place and snap a line onto a sampled curve").weak());

            if let Some(error) = &controls.last_error {
                ui.add_space(20.0);
                ui.label(egui::RichText::new(format!("Error: {}", error)).color(egui::Color32::RED));
            }
        });
    });
    action
}

fn demo_ui(ctx: &egui::Context, view: &mut DemoView, controls: &mut Controls) -> Action {
    let mut action = Action::Stay;

    egui::TopBottomPanel::top("controls").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("⬅ Menu").clicked() {
                action = Action::Menu;
            }
            ui.separator();

            if ui
                .button(if controls.playing { "⏸ Pause" } else { "▶ Play" })
                .clicked()
            {
                controls.playing = !controls.playing;
            }

            if ui.button("⏮ Reset").clicked() {
                controls.playing = false;
                controls.last_error = view.reset().err().map(|e| e.to_string());
            }

            if ui.button("⏭ Step").clicked() {
                if let Err(e) = view.step() {
                    controls.last_error = Some(e.to_string());
                }
            }

            ui.separator();
            ui.label("Speed:");
            ui.add(egui::Slider::new(&mut controls.speed_multiplier, 0.1..=10.0));

            ui.separator();
            ui.label(format!(
                "{}  t = {:.2} s  step {}",
                view.snapshot.kind.title(),
                view.snapshot.time,
                view.snapshot.step
            ));
        });
    });

    egui::SidePanel::right("parameters")
        .min_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Parameters");
            parameter_sliders(ui, view, controls);
            ui.separator();
            readouts(ui, &view.snapshot);
            if !view.notices.is_empty() {
                ui.separator();
                for notice in &view.notices {
                    ui.label(egui::RichText::new(notice).color(egui::Color32::YELLOW));
                }
            }
        });

    egui::TopBottomPanel::bottom("history")
        .resizable(true)
        .default_height(220.0)
        .show(ctx, |ui| history_plots(ui, &view.history));

    if let Some(error) = &controls.last_error {
        egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
            ui.set_max_height(100.0);
            ui.label(egui::RichText::new(format!("Error: {}", error)).color(egui::Color32::RED));
        });
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        render::draw(&painter, response.rect, &view.snapshot, &view.params, &view.trail);
    });

    if controls.playing {
        controls.step_budget += controls.speed_multiplier.max(0.1);
        while controls.step_budget >= 1.0 {
            controls.step_budget -= 1.0;
            if let Err(e) = view.step() {
                controls.last_error = Some(e.to_string());
                controls.playing = false;
                break;
            }
            if view.runner.is_finished() {
                controls.playing = false;
                break;
            }
        }
    }

    action
}

/// Time series of the demo so far, one plot per panel side by side.
fn history_plots(ui: &mut egui::Ui, history: &History) {
    let panels = history.panels();
    if panels.is_empty() {
        return;
    }
    ui.columns(panels.len(), |columns| {
        for (ui, panel) in columns.iter_mut().zip(panels) {
            ui.label(panel.title);
            Plot::new(panel.title)
                .height(ui.available_height())
                .show_axes(true)
                .show_grid(true)
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for series in &panel.series {
                        let points = PlotPoints::from(history.points(series));
                        plot_ui.line(Line::new(points).name(series.name));
                    }
                });
        }
    });
}

fn parameter_sliders(ui: &mut egui::Ui, view: &mut DemoView, controls: &mut Controls) {
    let mut edit = None;
    for spec in view.runner.specs() {
        let current = view.params.get(spec.name).copied().unwrap_or(spec.default);
        let mut value = current;
        let label = match spec.effect {
            Effect::Live => spec.label.to_string(),
            Effect::Initial => format!("{} ⟲", spec.label),
        };
        match spec.domain {
            Domain::Flag => {
                let mut on = value != 0.0;
                ui.checkbox(&mut on, label);
                value = if on { 1.0 } else { 0.0 };
            }
            Domain::Choice(options) => {
                let mut index = value as usize;
                let selected = spec.domain.option_label(value).unwrap_or("?");
                egui::ComboBox::from_label(label)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for (i, option) in options.iter().enumerate() {
                            ui.selectable_value(&mut index, i, *option);
                        }
                    });
                value = index as f64;
            }
            _ => {
                let (lo, hi) = spec.slider;
                let suffix = if spec.unit.is_empty() {
                    String::new()
                } else {
                    format!(" {}", spec.unit)
                };
                ui.add(
                    egui::Slider::new(&mut value, lo..=hi)
                        .text(label)
                        .suffix(suffix)
                        .clamp_to_range(false),
                );
            }
        }
        if value != current {
            edit = Some((spec.name, value, spec.effect));
        }
    }

    if let Some((name, value, effect)) = edit {
        controls.last_error = view.apply(name, value, effect).err().map(|e| e.to_string());
    }
}

fn readouts(ui: &mut egui::Ui, snap: &Snapshot) {
    egui::Grid::new("readouts").num_columns(2).show(ui, |ui| {
        ui.label("Kinetic energy");
        ui.label(format!("{:.3} J", snap.energy.kinetic));
        ui.end_row();
        ui.label("Potential energy");
        ui.label(format!("{:.3} J", snap.energy.potential));
        ui.end_row();
        ui.label("Total energy");
        ui.label(format!("{:.3} J", snap.energy.total()));
        ui.end_row();
        ui.label("Momentum");
        ui.label(format!("({:.3}, {:.3})", snap.momentum.x, snap.momentum.y));
        ui.end_row();
        for q in &snap.quantities {
            ui.label(q.name.replace('_', " "));
            ui.label(format!("{:.3} {}", q.value, q.unit));
            ui.end_row();
        }
    });
}

fn snap_ui(ctx: &egui::Context, view: &mut SnapView) -> Action {
    let mut action = Action::Stay;

    egui::TopBottomPanel::top("snap_controls").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("⬅ Menu").clicked() {
                action = Action::Menu;
            }
            ui.separator();
            ui.label("Angle:");
            let angle = ui.add(egui::TextEdit::singleline(&mut view.angle_text).desired_width(60.0));
            if ui.button("Insert").clicked() || (angle.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))) {
                view.insert_line();
            }
            if ui.button("⟲ 1°").clicked() {
                view.with_line(|line, _, _| line.rotate(1));
            }
            if ui.button("⟳ 1°").clicked() {
                view.with_line(|line, _, _| line.rotate(-1));
            }
            ui.separator();
            ui.label("Snap to x =");
            let snap_x = ui.add(egui::TextEdit::singleline(&mut view.snap_x_text).desired_width(60.0));
            if ui.button("Set").clicked() || (snap_x.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))) {
                view.set_target();
            }
            if ui.button("SNAP!").clicked() {
                view.with_line(|line, curve, target| line.snap_midpoint_to(curve[target]));
            }
            if ui.button("TRIM").clicked() {
                view.with_line(|line, curve, _| {
                    if let Some(trimmed) = line.trim(curve) {
                        *line = trimmed;
                    }
                });
            }
        });
        if let Some(message) = &view.message {
            ui.label(message);
        }
    });

    // Arrow keys nudge the line; hold ctrl for bigger steps.
    let (dx, dy) = ctx.input(|i| {
        let step = if i.modifiers.ctrl { 0.002 } else { 0.0001 };
        let mut d = (0.0, 0.0);
        if i.key_pressed(egui::Key::ArrowLeft) {
            d.0 -= step;
        }
        if i.key_pressed(egui::Key::ArrowRight) {
            d.0 += step;
        }
        if i.key_pressed(egui::Key::ArrowUp) {
            d.1 += step;
        }
        if i.key_pressed(egui::Key::ArrowDown) {
            d.1 -= step;
        }
        d
    });
    if dx != 0.0 || dy != 0.0 {
        if let Some(line) = view.line.as_mut() {
            line.translate(DVec2::new(dx, dy));
        }
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        let viewport = Viewport::fit(response.rect, SnapView::VIEW_MIN, SnapView::VIEW_MAX);

        let points: Vec<egui::Pos2> = view.curve.iter().map(|p| viewport.to_screen(*p)).collect();
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE)));
        painter.circle_stroke(
            viewport.to_screen(view.curve[view.target]),
            5.0,
            egui::Stroke::new(1.0, egui::Color32::YELLOW),
        );

        if let Some(line) = &view.line {
            painter.line_segment(
                [viewport.to_screen(line.start), viewport.to_screen(line.end)],
                egui::Stroke::new(2.0, egui::Color32::RED),
            );
            painter.text(
                response.rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!("angle {:.1}°  length {:.3}", line.angle_deg(), line.length()),
                egui::FontId::monospace(12.0),
                egui::Color32::WHITE,
            );
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let cursor = viewport.to_world(pos);
                view.with_line(|line, curve, _| {
                    line.snap_endpoint(curve, cursor);
                });
            }
        }
    });

    action
}
