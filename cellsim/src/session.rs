// session.rs - One simulation: grid buffers, active rule, parameters and generation count

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::{debug, info, trace};
use rand::Rng;

use crate::config::{HISTORY_DEPTH, SimulationConfig};
use crate::error::{Result, SimError};
use crate::grid::{Cell, Grid, GridState};
use crate::neighborhood::Neighborhood;
use crate::patterns::Pattern;
use crate::rules::{BirthSurvival, Rule, RuleId, RuleParameters};

/// All mutable state of a simulation, owned by the caller.
///
/// Sessions are independent of each other; nothing here is global.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    grid: GridState,
    active: RuleId,
    parameters: RuleParameters,
    /// `active` bound to `parameters`; rebuilt whenever either changes.
    rule: Rule,
    generation: u64,
    grid_history: [u64; HISTORY_DEPTH],
    history_count: usize,
    cycling: bool,
}

impl SimulationSession {
    /// A `rows x cols` session running classic Life with default parameters.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let parameters = RuleParameters::default();
        let active = RuleId::default();
        Ok(Self {
            grid: GridState::new(rows, cols)?,
            active,
            rule: active.resolve(&parameters)?,
            parameters,
            generation: 0,
            grid_history: [0; HISTORY_DEPTH],
            history_count: 0,
            cycling: false,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(config.rows, config.cols)?;
        session.parameters = config.parameters;
        session.set_active_rule(config.rule)?;
        Ok(session)
    }

    pub fn rows(&self) -> usize {
        self.grid.dimensions().0
    }

    pub fn cols(&self) -> usize {
        self.grid.dimensions().1
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    /// The current generation, for rendering.
    pub fn grid(&self) -> &Grid {
        self.grid.current()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<Cell> {
        self.grid.get_cell(row, col)
    }

    /// Writes a value as given; it is not clamped to the active rule's range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> Result<()> {
        self.grid.set_cell(row, col, value)
    }

    /// Advances a cell by one state, wrapping at `total_states()`. Returns the new value.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<Cell> {
        let total = f64::from(self.total_states());
        let value = (self.grid.get_cell(row, col)? + 1.0) % total;
        self.grid.set_cell(row, col, value)?;
        Ok(value)
    }

    pub fn active_rule(&self) -> RuleId {
        self.active
    }

    /// The active rule with its parameters bound.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn parameters(&self) -> &RuleParameters {
        &self.parameters
    }

    pub fn total_states(&self) -> u32 {
        self.active.total_states(&self.parameters)
    }

    /// Switches rules. Cells keep their values, even ones the new rule never produces.
    pub fn set_active_rule(&mut self, rule: RuleId) -> Result<()> {
        self.rule = rule.resolve(&self.parameters)?;
        self.active = rule;
        debug!("active rule set to {rule}");
        Ok(())
    }

    /// Replaces all parameters. Takes effect on the next step.
    pub fn set_parameters(&mut self, parameters: RuleParameters) -> Result<()> {
        parameters.validate()?;
        self.rule = self.active.resolve(&parameters)?;
        self.parameters = parameters;
        debug!("rule parameters set to {parameters:?}");
        Ok(())
    }

    pub fn set_custom_rule(&mut self, custom: BirthSurvival) -> Result<()> {
        self.set_parameters(RuleParameters {
            custom,
            ..self.parameters
        })
    }

    pub fn set_max_states(&mut self, max_states: u32) -> Result<()> {
        self.set_parameters(RuleParameters {
            max_states,
            ..self.parameters
        })
    }

    pub fn set_kernel_size(&mut self, kernel_size: usize) -> Result<()> {
        self.set_parameters(RuleParameters {
            kernel_size,
            ..self.parameters
        })
    }

    /// Computes one generation into the scratch buffer, then makes it current.
    ///
    /// Returns the new generation number.
    pub fn step(&mut self) -> u64 {
        let rule = self.rule;
        self.grid
            .advance(|current, row, col| rule.next_state(&Neighborhood::new(current), row, col));
        self.generation += 1;
        self.cycling = self.check_for_cycle();
        trace!("generation {} computed with {}", self.generation, self.active);
        self.generation
    }

    /// Runs `n` generations.
    pub fn steps(&mut self, n: usize) -> u64 {
        for _ in 0..n {
            self.step();
        }
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.grid.current().population()
    }

    /// Whether the latest generation repeats one of the previous few.
    pub fn is_cycling(&self) -> bool {
        self.cycling
    }

    pub fn hash_grid(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.dimensions().hash(&mut hasher);
        for value in self.grid.current().cells() {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    fn check_for_cycle(&mut self) -> bool {
        let current_hash = self.hash_grid();
        let filled = self.history_count.min(HISTORY_DEPTH);
        if self.grid_history[..filled].contains(&current_hash) {
            return true;
        }
        self.grid_history[self.history_count % HISTORY_DEPTH] = current_hash;
        self.history_count += 1;
        false
    }

    fn reset_history(&mut self) {
        self.generation = 0;
        self.grid_history = [0; HISTORY_DEPTH];
        self.history_count = 0;
        self.cycling = false;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.reset_history();
        debug!("grid cleared");
    }

    /// Fills every cell with a uniform random state of the active rule.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng>(&mut self, rng: &mut R) {
        let total_states = self.total_states();
        self.grid.randomize(total_states, rng);
        self.reset_history();
        debug!("grid randomized over {total_states} states");
    }

    /// Replaces the grid with an empty one of the new size.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.grid.resize(rows, cols)?;
        self.reset_history();
        info!("grid resized to {rows}x{cols}");
        Ok(())
    }

    /// Clears the grid and stamps `pattern` with its top-left corner at `(top, left)`.
    pub fn apply_pattern(&mut self, pattern: &Pattern, top: usize, left: usize) -> Result<()> {
        let (rows, cols) = self.dimensions();
        if top >= rows || left >= cols {
            return Err(SimError::OutOfBounds {
                row: top,
                col: left,
                rows,
                cols,
            });
        }
        self.grid.clear();
        self.grid.stamp(pattern, top, left);
        self.reset_history();
        debug!("applied pattern {} at ({top}, {left})", pattern.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::GLIDER;
    use crate::rules::LifeVariant;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn alive_cells(session: &SimulationSession) -> Vec<(usize, usize)> {
        let cols = session.cols();
        session
            .grid()
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 1.0)
            .map(|(i, _)| (i / cols, i % cols))
            .collect()
    }

    #[test]
    fn test_isolated_cell_dies() {
        let mut session = SimulationSession::new(3, 3).unwrap();
        session.set_cell(1, 1, 1.0).unwrap();
        session.step();
        assert_eq!(session.population(), 0);
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_glider_translates_after_four_steps() {
        let mut session = SimulationSession::new(12, 12).unwrap();
        session.apply_pattern(&GLIDER, 2, 2).unwrap();
        let before = alive_cells(&session);

        session.steps(4);
        let after = alive_cells(&session);
        let shifted: Vec<_> = before.iter().map(|&(r, c)| (r + 1, c + 1)).collect();
        assert_eq!(after, shifted);
    }

    #[test]
    fn test_glider_wraps_around_torus() {
        let mut session = SimulationSession::new(8, 8).unwrap();
        session.apply_pattern(&GLIDER, 0, 0).unwrap();
        // 8 cells of travel on an 8x8 torus brings it home.
        session.steps(32);
        let mut expected: Vec<_> = GLIDER.cells.to_vec();
        expected.sort_unstable();
        assert_eq!(alive_cells(&session), expected);
    }

    #[test]
    fn test_toggle_cycles_through_states() {
        let mut session = SimulationSession::new(4, 4).unwrap();
        session.set_active_rule(RuleId::BriansBrain).unwrap();
        assert_eq!(session.toggle_cell(0, 0).unwrap(), 1.0);
        assert_eq!(session.toggle_cell(0, 0).unwrap(), 2.0);
        assert_eq!(session.toggle_cell(0, 0).unwrap(), 0.0);
        assert!(matches!(session.toggle_cell(4, 0), Err(SimError::OutOfBounds { .. })));
    }

    #[test]
    fn test_randomize_respects_total_states() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut session = SimulationSession::new(30, 30).unwrap();
        for rule in [RuleId::Cyclic, RuleId::Infection, RuleId::BriansBrain, RuleId::Blur] {
            session.set_active_rule(rule).unwrap();
            session.randomize_with(&mut rng);
            let total = f64::from(session.total_states());
            assert!(session.grid().cells().iter().all(|&v| v >= 0.0 && v < total));
        }
    }

    #[test]
    fn test_rule_switch_keeps_cells() {
        let mut session = SimulationSession::new(5, 5).unwrap();
        session.set_active_rule(RuleId::Cyclic).unwrap();
        session.set_cell(2, 2, 5.0).unwrap();
        session.set_active_rule(RuleId::Life(LifeVariant::Life)).unwrap();
        assert_eq!(session.get_cell(2, 2).unwrap(), 5.0);
        // Life reads 5 as dead, and it has no neighbors.
        session.step();
        assert_eq!(session.get_cell(2, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_parameters_leave_session_untouched() {
        let mut session = SimulationSession::new(5, 5).unwrap();
        session.set_active_rule(RuleId::Blur).unwrap();
        assert!(session.set_kernel_size(4).is_err());
        assert!(session.set_max_states(0).is_err());
        assert_eq!(session.parameters(), &RuleParameters::default());
        assert_eq!(session.rule(), Rule::Blur { kernel_size: 3 });
    }

    #[test]
    fn test_parameter_change_applies_on_next_step() {
        let mut session = SimulationSession::new(6, 6).unwrap();
        session.set_active_rule(RuleId::Infection).unwrap();
        session.set_cell(0, 0, 5.0).unwrap();
        session.set_max_states(5).unwrap();
        assert_eq!(session.get_cell(0, 0).unwrap(), 5.0);
        session.step();
        assert_eq!(session.get_cell(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_custom_rule() {
        let mut session = SimulationSession::new(6, 6).unwrap();
        session.set_active_rule(RuleId::Custom).unwrap();
        session.set_cell(2, 2, 1.0).unwrap();
        session.set_cell(2, 3, 1.0).unwrap();
        session.set_custom_rule("B2/S1".parse().unwrap()).unwrap();
        session.step();
        // Each live cell has one neighbor and survives; cells touching both are born.
        assert_eq!(session.get_cell(2, 2).unwrap(), 1.0);
        assert_eq!(session.get_cell(2, 3).unwrap(), 1.0);
        assert_eq!(session.get_cell(1, 2).unwrap(), 1.0);
        assert_eq!(session.get_cell(3, 3).unwrap(), 1.0);
        assert_eq!(session.get_cell(2, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_blur_keeps_uniform_field() {
        let mut session = SimulationSession::new(7, 9).unwrap();
        session.set_active_rule(RuleId::Blur).unwrap();
        session.set_kernel_size(5).unwrap();
        for r in 0..7 {
            for c in 0..9 {
                session.set_cell(r, c, 0.25).unwrap();
            }
        }
        session.steps(3);
        assert!(session.grid().cells().iter().all(|&v| (v - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_still_life_detected_as_cycle() {
        let mut session = SimulationSession::new(6, 6).unwrap();
        for (r, c) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            session.set_cell(r, c, 1.0).unwrap();
        }
        session.step();
        assert!(!session.is_cycling());
        session.step();
        assert!(session.is_cycling());
    }

    #[test]
    fn test_clear_and_resize_reset_generation() {
        let mut session = SimulationSession::new(5, 5).unwrap();
        session.randomize();
        session.steps(3);
        session.clear();
        assert_eq!(session.generation(), 0);
        assert_eq!(session.population(), 0);

        session.steps(2);
        session.resize(8, 10).unwrap();
        assert_eq!(session.dimensions(), (8, 10));
        assert_eq!(session.generation(), 0);
        assert!(session.resize(0, 3).is_err());
    }

    #[test]
    fn test_apply_pattern_out_of_bounds() {
        let mut session = SimulationSession::new(5, 5).unwrap();
        assert!(session.apply_pattern(&GLIDER, 5, 0).is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = SimulationConfig::default();
        config.rule = RuleId::Cyclic;
        config.rows = 10;
        let session = SimulationSession::from_config(&config).unwrap();
        assert_eq!(session.dimensions(), (10, 51));
        assert_eq!(session.total_states(), 7);

        config.parameters.kernel_size = 0;
        assert!(SimulationSession::from_config(&config).is_err());
    }
}
