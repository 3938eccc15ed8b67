//! Interactive vine growth viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the running vines, the shared
//! force field and the launcher, and implements [`eframe::App`] to draw an
//! orthographic wireframe of every vine and the features it spawned.

use eframe::App;
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f32::consts::PI;
use std::sync::Arc;
use vine_core::{
    config::{FeatureConfig, LaunchConfig, StickFieldConfig, VineConfig},
    error::ConfigResult,
    force_field::StickField,
    integrator::FieldInstance,
    launcher::VineLauncher,
    random::RngSource,
    vine::Vine,
};

/// Feature kind drawn as a leaf.
const LEAF: u32 = 0;
/// Feature kind drawn as a bud.
const BUD: u32 = 1;

/// Fixed step used by the "Step" button, in seconds.
const MANUAL_STEP: f32 = 1.0 / 60.0;

/// Longest frame time fed to the simulation, so a stalled window does not
/// produce one huge jump.
const MAX_FRAME_DT: f32 = 0.1;

/// A spawned feature, resolved to world space for drawing.
#[derive(Debug, Clone, Copy)]
struct PlacedFeature {
    kind: u32,
    position: Vec3,
    scale: f32,
}

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: the running [`Vine`]s and the [`VineLauncher`]
///   that creates them with a shared [`StickField`].
/// - Camera state (yaw, pan, zoom) for the orthographic projection.
/// - eframe/egui callbacks for drawing and user interaction.
///
/// ### Fields
/// - `vines` - Vines launched so far, growing or halted.
/// - `features` - Features spawned by all vines, in world space.
/// - `launcher` - Factory for new vines.
/// - `field_cfg` - Coefficients of the shared field, edited in the side panel.
/// - `guided` - Whether newly launched vines are bound to the field.
///
/// - `rng` - Seeds the per-vine random sources.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
/// - `yaw` - Rotation of the view around the world up axis, in radians.
pub struct Viewer {
    vines: Vec<Vine>,
    features: Vec<PlacedFeature>,
    launcher: VineLauncher,
    field_cfg: StickFieldConfig,
    guided: bool,

    rng: StdRng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    yaw: f32,
}

impl Viewer {
    /// Creates a viewer with no vines and a default stick field at the origin.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`], or the configuration error that
    /// prevented building the launcher.
    pub fn new() -> ConfigResult<Self> {
        let field_cfg = StickFieldConfig::default();
        let mut rng = StdRng::from_os_rng();
        let launcher = VineLauncher::new(
            LaunchConfig::default(),
            VineConfig::default(),
            default_features(),
            Some(make_field(field_cfg)?),
            Box::new(RngSource(StdRng::seed_from_u64(rng.random()))),
        )?;

        Ok(Self {
            vines: Vec::new(),
            features: Vec::new(),
            launcher,
            field_cfg,
            guided: true,
            rng,
            running: true,
            zoom: 80.0,
            pan: egui::vec2(0.0, 150.0),
            yaw: 0.0,
        })
    }

    /// Removes every vine and feature and pauses the simulation.
    fn reset(&mut self) {
        self.vines.clear();
        self.features.clear();
        self.running = false;
    }

    /// Rebinds the launcher to a field built from `field_cfg`, or to none
    /// when guidance is off. Vines already growing keep their field.
    fn apply_field(&mut self) {
        if !self.guided {
            self.launcher.set_field(None);
            return;
        }
        match make_field(self.field_cfg) {
            Ok(field) => self.launcher.set_field(Some(field)),
            Err(e) => log::error!("invalid field configuration: {e}"),
        }
    }

    /// Launches a new vine rooted at the world position `origin`.
    fn spawn_at(&mut self, origin: Vec3) {
        let vine_rng = Box::new(RngSource(StdRng::seed_from_u64(self.rng.random())));
        match self.launcher.launch(origin, vine_rng) {
            Ok(vine) => self.vines.push(vine),
            Err(e) => log::error!("failed to launch vine: {e}"),
        }
    }

    /// Advances every vine by `dt` seconds and collects spawned features.
    fn step(&mut self, dt: f32) {
        for vine in &mut self.vines {
            for spawn in vine.tick(dt) {
                self.features.push(PlacedFeature {
                    kind: spawn.kind,
                    position: vine.to_world().transform_point3(spawn.position),
                    scale: spawn.scale,
                });
            }
        }
    }

    /// Projects a world position onto the vertical view plane.
    fn project(&self, p: Vec3) -> Vec2 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec2::new(p.x * cos + p.z * sin, p.y)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The position is projected onto the view plane, scaled by `zoom`,
    /// offset by `pan` and centered inside `rect`. The y-axis is flipped so
    /// that positive y goes up in world space.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> egui::Pos2 {
        let q = self.project(p);
        let center = rect.center();
        egui::pos2(
            center.x + q.x * self.zoom + self.pan.x,
            center.y - q.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to the world point on the view
    /// plane through the origin.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec3 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(x * cos, y, x * sin)
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Builds the top panel UI (run controls, stepping, view).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.step(MANUAL_STEP);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 5.0..=400.0).text("Zoom"));
                ui.add(egui::Slider::new(&mut self.yaw, -PI..=PI).text("Yaw"));
            });
        });
    }

    /// Builds the bottom status bar (vine, mesh and feature counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let growing = self.vines.iter().filter(|v| v.is_growing()).count();
                let vertices: usize = self.vines.iter().map(|v| v.builder().vertices().len()).sum();
                let triangles: usize =
                    self.vines.iter().map(|v| v.builder().triangles().len()).sum();

                ui.label(format!("features = {}", self.features.len()));
                ui.separator();
                ui.label(format!("triangles = {triangles}"));
                ui.label(format!("vertices = {vertices}"));
                ui.separator();
                ui.label(format!("vines = {} ({growing} growing)", self.vines.len()));
            });
        });
    }

    /// Builds the right-hand panel for the shared force field.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Force field");
                ui.label("Applies to vines launched afterwards.");

                ui.separator();
                let mut changed = ui.checkbox(&mut self.guided, "Guide growth").changed();

                ui.add_enabled_ui(self.guided, |ui| {
                    let cfg = &mut self.field_cfg;
                    let fields: [(&str, &mut f32, f32); 6] = [
                        ("raise:", &mut cfg.raise_force, 1.0),
                        ("noise:", &mut cfg.noise, 1.0),
                        ("vortex:", &mut cfg.vortex, 1.0),
                        ("attraction:", &mut cfg.attraction, 1.0),
                        ("height factor:", &mut cfg.attraction_height_factor, 5.0),
                        ("friction:", &mut cfg.friction, 1.0),
                    ];
                    for (label, value, max) in fields {
                        changed |= Self::labeled_drag_f32(ui, label, value, 0.0..=max, 0.01);
                    }
                });

                ui.separator();
                if ui.button("Reset field to default").clicked() {
                    self.field_cfg = StickFieldConfig::default();
                    changed = true;
                }

                if changed {
                    self.apply_field();
                }
            });
    }

    /// Builds the central panel where vines are drawn and launched.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Launch a vine where the user clicks.
            if response.clicked()
                && let Some(p) = response.interact_pointer_pos()
            {
                let origin = self.screen_to_world(p, rect);
                self.spawn_at(origin);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(5.0, 400.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Ground line through the origin.
            let ground_y = self.world_to_screen(Vec3::ZERO, rect).y;
            painter.line_segment(
                [egui::pos2(rect.left(), ground_y), egui::pos2(rect.right(), ground_y)],
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            );

            // Wireframe of every vine.
            for vine in &self.vines {
                let color = if vine.is_growing() {
                    egui::Color32::LIGHT_GREEN
                } else {
                    egui::Color32::from_rgb(60, 140, 60)
                };
                let stroke = egui::Stroke::new(1.0, color);

                let to_world = vine.to_world();
                let screen: Vec<egui::Pos2> = vine
                    .builder()
                    .vertices()
                    .iter()
                    .map(|&v| self.world_to_screen(to_world.transform_point3(v), rect))
                    .collect();

                for &[a, b, c] in vine.builder().triangles() {
                    let (a, b, c) = (screen[a as usize], screen[b as usize], screen[c as usize]);
                    painter.line_segment([a, b], stroke);
                    painter.line_segment([b, c], stroke);
                    painter.line_segment([c, a], stroke);
                }
            }

            // Spawned features.
            for f in &self.features {
                let p = self.world_to_screen(f.position, rect);
                let (color, size) = match f.kind {
                    BUD => (egui::Color32::from_rgb(230, 120, 170), 0.06),
                    _ => (egui::Color32::from_rgb(90, 200, 90), 0.12),
                };
                painter.circle_filled(p, (f.scale * size * self.zoom).max(1.5), color);
            }

            // Auto-run simulation if requested.
            if self.running {
                let dt = ctx.input(|i| i.stable_dt).min(MAX_FRAME_DT);
                self.step(dt);
                ctx.request_repaint();
            }
        });
    }
}

/// Leaves spawn often and large, buds rarely and small.
fn default_features() -> Vec<FeatureConfig> {
    vec![
        FeatureConfig {
            kind: LEAF,
            ..FeatureConfig::default()
        },
        FeatureConfig {
            kind: BUD,
            min_distance: 0.8,
            max_distance: 2.0,
            offset_min: 0.0,
            offset_max: 0.05,
            scale_min: 0.3,
            scale_max: 0.6,
        },
    ]
}

fn make_field(cfg: StickFieldConfig) -> ConfigResult<Arc<FieldInstance>> {
    Ok(Arc::new(FieldInstance::at_origin(StickField::new(cfg)?)))
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new().unwrap();
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        viewer.yaw = 0.7;
        let rect = test_rect();

        let screen_points = [
            egui::pos2(400.0, 300.0),
            egui::pos2(10.0, 590.0),
            egui::pos2(650.5, 42.25),
        ];

        for p in screen_points {
            let world = viewer.screen_to_world(p, rect);
            let back = viewer.world_to_screen(world, rect);
            assert!(
                (back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3,
                "roundtrip mismatch: p={p:?}, back={back:?}"
            );
        }
    }

    #[test]
    fn spawn_and_step_grow_a_vine() {
        let mut viewer = Viewer::new().unwrap();
        viewer.spawn_at(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(viewer.vines.len(), 1);

        for _ in 0..120 {
            viewer.step(MANUAL_STEP);
        }

        let vine = &viewer.vines[0];
        assert!(vine.builder().end_position().y > 0.0);
        assert!(vine.field().is_some());
    }

    #[test]
    fn unguided_vines_have_no_field() {
        let mut viewer = Viewer::new().unwrap();
        viewer.guided = false;
        viewer.apply_field();
        viewer.spawn_at(Vec3::ZERO);
        assert!(viewer.vines[0].field().is_none());
    }

    #[test]
    fn features_are_placed_in_world_space() {
        let mut viewer = Viewer::new().unwrap();
        viewer.guided = false;
        viewer.apply_field();
        let origin = Vec3::new(5.0, 0.0, -2.0);
        viewer.spawn_at(origin);

        for _ in 0..600 {
            viewer.step(MANUAL_STEP);
        }

        assert!(!viewer.features.is_empty());
        // An unguided vine grows straight up, so features sit within their
        // offset of the vertical line through the root.
        for f in &viewer.features {
            let horizontal = Vec2::new(f.position.x - origin.x, f.position.z - origin.z);
            assert!(horizontal.length() <= 0.1 + 1e-4, "feature at {:?}", f.position);
            assert!(f.position.y > 0.0);
        }
    }

    #[test]
    fn reset_clears_everything() {
        let mut viewer = Viewer::new().unwrap();
        viewer.spawn_at(Vec3::ZERO);
        viewer.step(0.5);
        viewer.reset();

        assert!(viewer.vines.is_empty());
        assert!(viewer.features.is_empty());
        assert!(!viewer.running);
    }
}
