// main.rs - Desktop viewer for the cellsim automaton core
// Rendering and controls live in ui.rs, cell colors in palette.rs

use std::time::Duration;

use cellsim::{
    BirthSurvival, GridPreset, SharedSession, SimError, SimulationConfig, SimulationLoop,
};
use eframe::egui;
use egui::Color32;

mod palette;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    log::info!("cellsim viewer");
    log::info!("  Start / Stop / Step drive the timed loop");
    log::info!("  Click a cell to advance it to its next state");
    log::info!("  Rule-specific settings appear under the rule menu");

    let runtime = tokio::runtime::Runtime::new()?;
    let app = ViewerApp::new(runtime, SimulationConfig::default())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cellular Automaton Simulator",
        options,
        Box::new(|_cc| Box::new(app)),
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    Square,
    Circle,
}

/// Viewer state. The simulation itself lives behind `sim`; everything else is presentation.
pub struct ViewerApp {
    sim: SimulationLoop,
    reader: SharedSession,
    pub preset: GridPreset,
    pub update_interval: Duration,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub shape: CellShape,
    pub selected_pattern: usize,
    /// Edited copy of the custom rule, pushed to the session on change.
    pub custom: BirthSurvival,
    pub last_error: Option<String>,
    // Dropped after `sim`, which aborts its ticker task on drop.
    _runtime: tokio::runtime::Runtime,
}

impl ViewerApp {
    pub fn new(runtime: tokio::runtime::Runtime, config: SimulationConfig) -> Result<Self, SimError> {
        let sim = SimulationLoop::from_config(&config, runtime.handle().clone())?;
        let reader = sim.session();
        Ok(Self {
            sim,
            reader,
            preset: GridPreset::default(),
            update_interval: config.tick_interval,
            live_color: Color32::from_rgb(0x4c, 0xaf, 0x50),
            dead_color: Color32::from_gray(30),
            shape: CellShape::Square,
            selected_pattern: 0,
            custom: config.parameters.custom,
            last_error: None,
            _runtime: runtime,
        })
    }

    /// Records a failed control action for the status line.
    fn report(&mut self, result: Result<(), SimError>) {
        match result {
            Ok(()) => self.last_error = None,
            Err(err) => {
                log::warn!("{err}");
                self.last_error = Some(err.to_string());
            }
        }
    }
}
