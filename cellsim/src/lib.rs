//! Cellular automaton simulation core.
//!
//! A [`SimulationSession`] owns a toroidal grid, the active rule and its
//! parameters; [`SimulationSession::step`] computes one full generation into a
//! scratch buffer and swaps it in. [`SimulationLoop`] runs steps on a fixed
//! tokio interval. Rendering is left to the caller, which reads cells back
//! through the session.
//!
//! # Example
//!
//! ```
//! use cellsim::{RuleId, SimulationSession, patterns};
//!
//! let mut session = SimulationSession::new(20, 20)?;
//! session.apply_pattern(&patterns::GLIDER, 1, 1)?;
//! session.steps(4);
//! assert_eq!(session.get_cell(2, 3)?, 1.0);
//!
//! session.set_active_rule(RuleId::BriansBrain)?;
//! assert_eq!(session.total_states(), 3);
//! # Ok::<(), cellsim::SimError>(())
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod neighborhood;
pub mod patterns;
pub mod rules;
pub mod runner;
pub mod session;

pub use config::{GridPreset, SimulationConfig};
pub use error::{Result, SimError};
pub use grid::{Cell, Grid, GridState};
pub use neighborhood::{AlivePredicate, Neighborhood};
pub use patterns::Pattern;
pub use rules::{BirthSurvival, LifeVariant, NeighborSet, Rule, RuleId, RuleParameters};
pub use runner::{LoopState, SharedSession, SimulationLoop};
pub use session::SimulationSession;
