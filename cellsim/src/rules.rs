// rules.rs - Transition rules and their parameters

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimError};
use crate::grid::Cell;
use crate::neighborhood::{AlivePredicate, Neighborhood};

/// Growth added to the neighbor average by the infection rule.
const INFECTION_GROWTH: f64 = 1.0;

/// Largest possible Moore-neighbor count.
pub const MAX_NEIGHBORS: u8 = 8;

/// A set of neighbor counts in `0..=8`, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborSet(u16);

impl NeighborSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0x1FF);

    /// Builds a set from counts known to be in range.
    const fn of(counts: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < counts.len() {
            mask |= 1 << counts[i];
            i += 1;
        }
        Self(mask)
    }

    pub fn contains(self, count: u8) -> bool {
        count <= MAX_NEIGHBORS && self.0 & (1 << count) != 0
    }

    pub fn insert(&mut self, count: u8) -> Result<()> {
        if count > MAX_NEIGHBORS {
            return Err(SimError::parameter(
                "neighbor count",
                format!("{count} is above {MAX_NEIGHBORS}"),
            ));
        }
        self.0 |= 1 << count;
        Ok(())
    }

    pub fn remove(&mut self, count: u8) {
        if count <= MAX_NEIGHBORS {
            self.0 &= !(1 << count);
        }
    }

    /// Adds or removes `count`. Counts above 8 are never members, so turning
    /// one on is ignored.
    pub fn set(&mut self, count: u8, on: bool) {
        if !on {
            self.remove(count);
        } else if count <= MAX_NEIGHBORS {
            self.0 |= 1 << count;
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Counts in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=MAX_NEIGHBORS).filter(move |&n| self.contains(n))
    }
}

impl TryFrom<&[u8]> for NeighborSet {
    type Error = SimError;

    fn try_from(counts: &[u8]) -> Result<Self> {
        let mut set = Self::EMPTY;
        for &count in counts {
            set.insert(count)?;
        }
        Ok(set)
    }
}

impl fmt::Display for NeighborSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in self.iter() {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// How a life-like rule reads a cell holding something other than 0 or 1.
///
/// Values like that show up after switching away from a multi-state rule.
/// They are not clamped; each rule classifies them by its own literal test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrayState {
    /// Only 1 is alive, everything else takes the birth branch.
    CountsAsDead,
    /// Anything non-zero takes the survival branch.
    CountsAsAlive,
    /// Only exact 0 and 1 are considered; any other value becomes 0.
    Dies,
}

/// A birth/survival pair over alive-neighbor counts (`B#/S#` notation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BirthSurvival {
    pub birth: NeighborSet,
    pub survival: NeighborSet,
}

impl BirthSurvival {
    pub const fn new(birth: NeighborSet, survival: NeighborSet) -> Self {
        Self { birth, survival }
    }

    /// Next state for a cell with `alive` live neighbors.
    pub fn next_state(self, state: Cell, alive: u8, stray: StrayState) -> Cell {
        let is_alive = match stray {
            StrayState::CountsAsDead => AlivePredicate::StrictlyOne.matches(state),
            StrayState::CountsAsAlive => AlivePredicate::NonZero.matches(state),
            StrayState::Dies if state == 0.0 => false,
            StrayState::Dies if state == 1.0 => true,
            StrayState::Dies => return 0.0,
        };
        let lives = if is_alive {
            self.survival.contains(alive)
        } else {
            self.birth.contains(alive)
        };
        if lives { 1.0 } else { 0.0 }
    }
}

impl fmt::Display for BirthSurvival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.birth, self.survival)
    }
}

impl FromStr for BirthSurvival {
    type Err = SimError;

    /// Parses `B3/S23`-style rulestrings, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SimError::InvalidRulestring(s.to_string());
        let (b, survival_part) = s.trim().split_once('/').ok_or_else(invalid)?;

        let parse_part = |part: &str, prefix: char| -> Result<NeighborSet> {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) if c.eq_ignore_ascii_case(&prefix) => {}
                _ => return Err(invalid()),
            }
            let mut set = NeighborSet::EMPTY;
            for c in chars {
                let digit = c.to_digit(10).ok_or_else(invalid)? as u8;
                set.insert(digit).map_err(|_| invalid())?;
            }
            Ok(set)
        };

        Ok(Self {
            birth: parse_part(b, 'B')?,
            survival: parse_part(survival_part, 'S')?,
        })
    }
}

/// The named life-like rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifeVariant {
    #[default]
    Life,
    HighLife,
    DayAndNight,
    Seeds,
    Mazectric,
    Amoeba,
    SnowLife,
    FishFood,
    LifeWithoutDeath,
    Coral,
    Replicator,
}

impl LifeVariant {
    pub const ALL: [LifeVariant; 11] = [
        LifeVariant::Life,
        LifeVariant::HighLife,
        LifeVariant::DayAndNight,
        LifeVariant::Seeds,
        LifeVariant::Mazectric,
        LifeVariant::Amoeba,
        LifeVariant::SnowLife,
        LifeVariant::FishFood,
        LifeVariant::LifeWithoutDeath,
        LifeVariant::Coral,
        LifeVariant::Replicator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LifeVariant::Life => "Life",
            LifeVariant::HighLife => "HighLife",
            LifeVariant::DayAndNight => "Day & Night",
            LifeVariant::Seeds => "Seeds",
            LifeVariant::Mazectric => "Mazectric",
            LifeVariant::Amoeba => "Amoeba",
            LifeVariant::SnowLife => "SnowLife",
            LifeVariant::FishFood => "FishFood",
            LifeVariant::LifeWithoutDeath => "Life Without Death",
            LifeVariant::Coral => "Coral",
            LifeVariant::Replicator => "Replicator",
        }
    }

    pub const fn rule(self) -> BirthSurvival {
        let (birth, survival): (&[u8], &[u8]) = match self {
            LifeVariant::Life => (&[3], &[2, 3]),
            LifeVariant::HighLife => (&[3, 6], &[2, 3]),
            LifeVariant::DayAndNight => (&[3, 6, 7, 8], &[3, 4, 6, 7, 8]),
            LifeVariant::Seeds => (&[2], &[]),
            LifeVariant::Mazectric => (&[3], &[1, 2, 3, 4, 5]),
            LifeVariant::Amoeba => (&[3, 5, 7], &[1, 3, 5, 8]),
            LifeVariant::SnowLife => (&[3, 6, 7], &[2, 3, 5, 6, 7, 8]),
            LifeVariant::FishFood => (&[2], &[1, 2]),
            LifeVariant::LifeWithoutDeath => (&[3], &[0, 1, 2, 3, 4, 5, 6, 7, 8]),
            LifeVariant::Coral => (&[3], &[4, 5, 6, 7, 8]),
            LifeVariant::Replicator => (&[1, 3, 5, 7], &[1, 3, 5, 7]),
        };
        BirthSurvival::new(NeighborSet::of(birth), NeighborSet::of(survival))
    }

    /// How this rule treats cells holding values other than 0 and 1.
    pub fn stray(self) -> StrayState {
        match self {
            LifeVariant::LifeWithoutDeath => StrayState::CountsAsAlive,
            LifeVariant::Seeds | LifeVariant::FishFood => StrayState::Dies,
            _ => StrayState::CountsAsDead,
        }
    }

    pub fn next_state(self, state: Cell, alive: u8) -> Cell {
        self.rule().next_state(state, alive, self.stray())
    }
}

/// Identifies the active rule without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    Custom,
    Life(LifeVariant),
    BriansBrain,
    Infection,
    Cyclic,
    Blur,
}

impl Default for RuleId {
    fn default() -> Self {
        RuleId::Life(LifeVariant::Life)
    }
}

impl RuleId {
    /// Every rule, in menu order.
    pub const ALL: [RuleId; 16] = [
        RuleId::Custom,
        RuleId::Life(LifeVariant::Life),
        RuleId::BriansBrain,
        RuleId::Infection,
        RuleId::Life(LifeVariant::HighLife),
        RuleId::Life(LifeVariant::DayAndNight),
        RuleId::Life(LifeVariant::Seeds),
        RuleId::Cyclic,
        RuleId::Life(LifeVariant::Mazectric),
        RuleId::Life(LifeVariant::Amoeba),
        RuleId::Life(LifeVariant::SnowLife),
        RuleId::Life(LifeVariant::FishFood),
        RuleId::Life(LifeVariant::LifeWithoutDeath),
        RuleId::Life(LifeVariant::Coral),
        RuleId::Life(LifeVariant::Replicator),
        RuleId::Blur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleId::Custom => "Custom",
            RuleId::Life(variant) => variant.name(),
            RuleId::BriansBrain => "Brian's Brain",
            RuleId::Infection => "Belousov-Zhabotinsky",
            RuleId::Cyclic => "7 States",
            RuleId::Blur => "Convolution",
        }
    }

    /// Number of integer states used to seed, toggle and color cells.
    ///
    /// The blur rule reports 2: it is seeded and toggled like a binary rule,
    /// though its own output is continuous.
    pub fn total_states(self, params: &RuleParameters) -> u32 {
        match self {
            RuleId::BriansBrain => 3,
            RuleId::Infection => params.max_states,
            RuleId::Cyclic => CYCLIC_STATES,
            RuleId::Custom | RuleId::Life(_) | RuleId::Blur => 2,
        }
    }

    /// Whether the rule writes real-valued cells.
    pub fn is_continuous(self) -> bool {
        self == RuleId::Blur
    }

    /// Binds the parameters this rule needs.
    pub fn resolve(self, params: &RuleParameters) -> Result<Rule> {
        Ok(match self {
            RuleId::Custom => Rule::Custom(params.custom),
            RuleId::Life(variant) => Rule::Life(variant),
            RuleId::BriansBrain => Rule::BriansBrain,
            RuleId::Infection => Rule::infection(params.max_states)?,
            RuleId::Cyclic => Rule::Cyclic,
            RuleId::Blur => Rule::blur(params.kernel_size)?,
        })
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tunable parameters, independent of which rule is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleParameters {
    /// Ring size of the infection rule. At least 2.
    pub max_states: u32,
    /// Birth/survival sets of the custom rule.
    pub custom: BirthSurvival,
    /// Window width of the blur rule. Odd and at least 1.
    pub kernel_size: usize,
}

impl Default for RuleParameters {
    fn default() -> Self {
        Self {
            max_states: crate::config::DEFAULT_MAX_STATES,
            custom: BirthSurvival::default(),
            kernel_size: crate::config::DEFAULT_KERNEL_SIZE,
        }
    }
}

impl RuleParameters {
    pub fn validate(&self) -> Result<()> {
        validate_max_states(self.max_states)?;
        validate_kernel_size(self.kernel_size)
    }
}

fn validate_max_states(max_states: u32) -> Result<()> {
    if max_states < 2 {
        return Err(SimError::parameter(
            "max_states",
            format!("{max_states} is below 2"),
        ));
    }
    Ok(())
}

fn validate_kernel_size(kernel_size: usize) -> Result<()> {
    if kernel_size % 2 == 0 {
        return Err(SimError::parameter(
            "kernel_size",
            format!("{kernel_size} is not an odd number of at least 1"),
        ));
    }
    Ok(())
}

/// Number of states in the cyclic rule.
pub const CYCLIC_STATES: u32 = 7;

/// A rule with its parameters bound, ready to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Custom(BirthSurvival),
    Life(LifeVariant),
    /// Three states: dead, alive, dying.
    BriansBrain,
    /// Belousov-Zhabotinsky style infection ring `0 -> ... -> max_states -> 0`.
    Infection { max_states: u32 },
    /// Seven-state cycle driven by the alive-neighbor count.
    Cyclic,
    /// Box blur over a square window.
    Blur { kernel_size: usize },
}

impl Rule {
    pub fn infection(max_states: u32) -> Result<Self> {
        validate_max_states(max_states)?;
        Ok(Rule::Infection { max_states })
    }

    pub fn blur(kernel_size: usize) -> Result<Self> {
        validate_kernel_size(kernel_size)?;
        Ok(Rule::Blur { kernel_size })
    }

    pub fn id(&self) -> RuleId {
        match self {
            Rule::Custom(_) => RuleId::Custom,
            Rule::Life(variant) => RuleId::Life(*variant),
            Rule::BriansBrain => RuleId::BriansBrain,
            Rule::Infection { .. } => RuleId::Infection,
            Rule::Cyclic => RuleId::Cyclic,
            Rule::Blur { .. } => RuleId::Blur,
        }
    }

    /// The predicate used when this rule counts alive neighbors, or `None` for
    /// rules that read raw neighbor values instead.
    ///
    /// Every counting family uses the strict test: a dying Brian's Brain cell
    /// (state 2) or a cyclic cell in state 3 is not an alive neighbor. Life
    /// Without Death reads its own cell leniently (see [`StrayState`]) but still
    /// counts neighbors strictly.
    pub fn neighbor_predicate(&self) -> Option<AlivePredicate> {
        match self {
            Rule::Custom(_) | Rule::Life(_) => Some(AlivePredicate::StrictlyOne),
            Rule::BriansBrain => Some(AlivePredicate::StrictlyOne),
            Rule::Cyclic => Some(AlivePredicate::StrictlyOne),
            Rule::Infection { .. } | Rule::Blur { .. } => None,
        }
    }

    fn alive_neighbors(&self, hood: &Neighborhood<'_>, row: usize, col: usize) -> u8 {
        self.neighbor_predicate()
            .map_or(0, |predicate| hood.count_alive(row, col, predicate))
    }

    /// Computes the next value of `(row, col)` from the current generation.
    pub fn next_state(&self, hood: &Neighborhood<'_>, row: usize, col: usize) -> Cell {
        let state = hood.center(row, col);
        match *self {
            Rule::Custom(rule) => {
                let alive = self.alive_neighbors(hood, row, col);
                rule.next_state(state, alive, StrayState::CountsAsDead)
            }
            Rule::Life(variant) => variant.next_state(state, self.alive_neighbors(hood, row, col)),
            Rule::BriansBrain => brians_brain(state, self.alive_neighbors(hood, row, col)),
            Rule::Infection { max_states } => {
                let infected = hood.count_in_range(row, col, 0.0, f64::from(max_states));
                infection(state, max_states, hood.average(row, col), infected)
            }
            Rule::Cyclic => cyclic(state, self.alive_neighbors(hood, row, col)),
            Rule::Blur { kernel_size } => blur(hood.windowed_sum(row, col, kernel_size), kernel_size),
        }
    }
}

/// Dead cells with exactly two alive neighbors fire, firing cells start
/// dying, dying cells go dark. Any other value is kept.
pub fn brians_brain(state: Cell, alive: u8) -> Cell {
    if state == 0.0 && alive == 2 {
        1.0
    } else if state == 1.0 {
        2.0
    } else if state == 2.0 {
        0.0
    } else {
        state
    }
}

/// Fully infected cells heal, partially infected cells drift toward the
/// neighbor average plus growth, and everything else catches the infection
/// in proportion to its infected neighbors.
pub fn infection(state: Cell, max_states: u32, average: f64, infected: u8) -> Cell {
    let n = f64::from(max_states);
    if state == n {
        0.0
    } else if state > 0.0 && state < n {
        n.min((average + INFECTION_GROWTH).floor())
    } else {
        (f64::from(infected) / f64::from(MAX_NEIGHBORS) * n).floor()
    }
}

/// Seven-state ring: states climb toward the alive-neighbor count and fall back past it.
pub fn cyclic(state: Cell, alive: u8) -> Cell {
    let count = f64::from(alive);
    let ring = f64::from(CYCLIC_STATES);
    if state == 6.0 || alive < 2 {
        0.0
    } else if count == state {
        state
    } else if count > state {
        (state + 1.0) % ring
    } else {
        (state - 1.0 + ring) % ring
    }
}

/// Mean over a `kernel_size x kernel_size` window.
pub fn blur(window_sum: f64, kernel_size: usize) -> Cell {
    window_sum / (kernel_size * kernel_size) as f64
}
