// ui.rs - Controls and grid rendering for the viewer

use std::time::Duration;

use cellsim::runner::lock;
use cellsim::{GridPreset, NeighborSet, RuleId, RuleParameters, patterns};
use eframe::egui;
use egui::{Color32, Rect, Sense, Vec2};

use crate::{CellShape, ViewerApp, palette};

const KERNEL_SIZES: [usize; 5] = [1, 3, 5, 7, 9];
const CELL_GAP: f32 = 0.1;

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Generations are computed by the ticker task; keep repainting to show them.
        if self.sim.is_running() {
            ctx.request_repaint_after(self.update_interval);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Cellular Automaton Simulator");

            self.lifecycle_controls(ui);
            ui.separator();
            self.rule_controls(ui);
            ui.separator();
            self.appearance_controls(ui);
            ui.separator();

            egui::ScrollArea::both().show(ui, |ui| self.draw_grid(ui));

            ui.separator();
            let (generation, population, cells) = self.sim.with_session(|s| {
                (s.generation(), s.population(), s.rows() * s.cols())
            });
            ui.horizontal(|ui| {
                ui.label(format!("Generation: {generation}"));
                ui.label(format!("Non-empty cells: {population}"));
                ui.label(format!(
                    "Occupancy: {:.1}%",
                    population as f32 / cells as f32 * 100.0
                ));
            });
            if let Some(err) = &self.last_error {
                ui.colored_label(Color32::LIGHT_RED, err.as_str());
            }
        });
    }
}

impl ViewerApp {
    fn lifecycle_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button_text = if self.sim.is_running() { "⏸ Stop" } else { "▶ Start" };
            if ui.button(button_text).clicked() {
                if self.sim.is_running() {
                    self.sim.stop();
                } else {
                    let result = self.sim.start(self.update_interval);
                    self.report(result);
                }
            }

            if ui.button("⏭ Step").clicked() {
                self.sim.step();
            }

            if ui.button("⏹ Clear").clicked() {
                self.sim.clear();
            }

            if ui.button("🎲 Random").clicked() {
                self.sim.randomize();
            }

            ui.separator();

            ui.label("Grid:");
            let previous = self.preset;
            egui::ComboBox::from_id_source("grid_preset")
                .selected_text(self.preset.label())
                .show_ui(ui, |ui| {
                    for preset in GridPreset::ALL {
                        ui.selectable_value(&mut self.preset, preset, preset.label());
                    }
                });
            if self.preset != previous {
                let (rows, cols) = self.preset.dimensions();
                let result = self.sim.resize(rows, cols);
                self.report(result);
            }

            ui.separator();

            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(patterns::PATTERNS[self.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (i, pattern) in patterns::PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                    }
                });
            if ui.button("Apply Pattern").clicked() {
                self.apply_selected_pattern();
            }
        });

        ui.horizontal(|ui| {
            ui.label("Speed:");
            let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
            if ui
                .add(egui::Slider::new(&mut speed, 0.5..=90.0).suffix(" gen/sec"))
                .changed()
            {
                self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                if self.sim.is_running() {
                    let result = self.sim.start(self.update_interval);
                    self.report(result);
                }
            }
        });
    }

    fn rule_controls(&mut self, ui: &mut egui::Ui) {
        let (active, mut params) = self.sim.with_session(|s| (s.active_rule(), *s.parameters()));

        ui.horizontal(|ui| {
            ui.label("Rule:");
            let mut selected = active;
            egui::ComboBox::from_id_source("rule_selector")
                .selected_text(rule_label(active))
                .width(220.0)
                .show_ui(ui, |ui| {
                    for rule in RuleId::ALL {
                        ui.selectable_value(&mut selected, rule, rule_label(rule));
                    }
                });
            if selected != active {
                let result = self.sim.set_active_rule(selected);
                self.report(result);
            }
        });

        let mut changed = false;
        match active {
            RuleId::Infection => {
                ui.horizontal(|ui| {
                    ui.label("Max states:");
                    changed |= ui
                        .add(egui::DragValue::new(&mut params.max_states).clamp_range(2..=255))
                        .changed();
                });
            }
            RuleId::Custom => {
                changed |= neighbor_checkboxes(ui, "Birth", &mut self.custom.birth);
                changed |= neighbor_checkboxes(ui, "Survival", &mut self.custom.survival);
                params.custom = self.custom;
                ui.label(format!("Rulestring: {}", self.custom));
            }
            RuleId::Blur => {
                ui.horizontal(|ui| {
                    ui.label("Kernel size:");
                    egui::ComboBox::from_id_source("kernel_size")
                        .selected_text(params.kernel_size.to_string())
                        .show_ui(ui, |ui| {
                            for size in KERNEL_SIZES {
                                changed |= ui
                                    .selectable_value(&mut params.kernel_size, size, size.to_string())
                                    .changed();
                            }
                        });
                });
            }
            _ => {}
        }
        if changed {
            self.push_parameters(params);
        }
    }

    fn push_parameters(&mut self, params: RuleParameters) {
        let result = self.sim.set_rule_parameters(params);
        self.report(result);
    }

    fn appearance_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Live:");
            ui.color_edit_button_srgba(&mut self.live_color);
            ui.label("Background:");
            ui.color_edit_button_srgba(&mut self.dead_color);

            ui.separator();

            ui.label("Shape:");
            ui.selectable_value(&mut self.shape, CellShape::Square, "Square");
            ui.selectable_value(&mut self.shape, CellShape::Circle, "Circle");
        });
    }

    fn apply_selected_pattern(&mut self) {
        let Some(pattern) = patterns::PATTERNS.get(self.selected_pattern) else {
            return;
        };
        self.sim.stop();
        let (height, width) = pattern.extent();
        let result = {
            let mut session = lock(&self.reader);
            let (rows, cols) = session.dimensions();
            let top = (rows / 2).saturating_sub(height / 2);
            let left = (cols / 2).saturating_sub(width / 2);
            session.apply_pattern(pattern, top, left)
        };
        self.report(result);
    }

    fn draw_grid(&mut self, ui: &mut egui::Ui) {
        let pitch = self.preset.cell_pitch();
        let cell_size = pitch - CELL_GAP;
        let (rows, cols) = self.sim.with_session(|s| s.dimensions());

        let total_size = Vec2::new(cols as f32 * pitch, rows as f32 * pitch);
        let (response, painter) = ui.allocate_painter(total_size, Sense::click());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, self.dead_color);

        {
            let session = lock(&self.reader);
            let rule = session.active_rule();
            let total_states = session.total_states();
            let max_states = session.parameters().max_states;

            for (row, values) in session.grid().iter_rows().enumerate() {
                for (col, &value) in values.iter().enumerate() {
                    let Some(color) =
                        palette::cell_color(value, rule, total_states, max_states, self.live_color)
                    else {
                        continue;
                    };
                    let rect = Rect::from_min_size(
                        origin + Vec2::new(col as f32 * pitch, row as f32 * pitch),
                        Vec2::splat(cell_size),
                    );
                    match self.shape {
                        CellShape::Square => {
                            painter.rect_filled(rect, 0.0, color);
                        }
                        CellShape::Circle => {
                            painter.circle_filled(rect.center(), cell_size / 2.0, color);
                        }
                    }
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - origin;
                let (row, col) = ((local.y / pitch) as usize, (local.x / pitch) as usize);
                if row < rows && col < cols {
                    let result = self.sim.toggle_cell(row, col).map(|_| ());
                    self.report(result);
                }
            }
        }
    }
}

fn rule_label(rule: RuleId) -> String {
    match rule {
        RuleId::Life(variant) => format!("{} ({})", variant.name(), variant.rule()),
        other => other.name().to_string(),
    }
}

/// One row of checkboxes for counts 0..=8. Returns whether any changed.
fn neighbor_checkboxes(ui: &mut egui::Ui, label: &str, set: &mut NeighborSet) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(format!("{label}:"));
        for n in 0..=cellsim::rules::MAX_NEIGHBORS {
            let mut on = set.contains(n);
            if ui.checkbox(&mut on, n.to_string()).changed() {
                set.set(n, on);
                changed = true;
            }
        }
    });
    changed
}
