// config.rs - Defaults, grid presets and session configuration

use std::time::Duration;

use crate::error::{Result, SimError};
use crate::rules::{RuleId, RuleParameters};

/// Interval between generations while running.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Ring size of the infection rule.
pub const DEFAULT_MAX_STATES: u32 = 50;
/// Blur window width.
pub const DEFAULT_KERNEL_SIZE: usize = 3;
/// Generations remembered for cycle detection.
pub const HISTORY_DEPTH: usize = 10;

/// The grid sizes offered by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridPreset {
    #[default]
    Small,
    Medium,
    Large,
}

impl GridPreset {
    pub const ALL: [GridPreset; 3] = [GridPreset::Small, GridPreset::Medium, GridPreset::Large];

    /// `(rows, cols)`.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            GridPreset::Small => (51, 51),
            GridPreset::Medium => (102, 102),
            GridPreset::Large => (204, 204),
        }
    }

    /// Pixel pitch of one cell, for renderers.
    pub fn cell_pitch(self) -> f32 {
        match self {
            GridPreset::Small => 12.0,
            GridPreset::Medium => 6.0,
            GridPreset::Large => 3.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GridPreset::Small => "51 x 51",
            GridPreset::Medium => "102 x 102",
            GridPreset::Large => "204 x 204",
        }
    }
}

/// Everything needed to start a session and its loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    pub tick_interval: Duration,
    pub rule: RuleId,
    pub parameters: RuleParameters,
    /// Stop the running loop when a generation repeats one of the last few.
    pub stop_on_cycle: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_preset(GridPreset::default())
    }
}

impl SimulationConfig {
    pub fn from_preset(preset: GridPreset) -> Self {
        let (rows, cols) = preset.dimensions();
        Self {
            rows,
            cols,
            tick_interval: DEFAULT_TICK_INTERVAL,
            rule: RuleId::default(),
            parameters: RuleParameters::default(),
            stop_on_cycle: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SimError::InvalidDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(SimError::parameter("tick_interval", "must be non-zero"));
        }
        self.parameters.validate()
    }
}
