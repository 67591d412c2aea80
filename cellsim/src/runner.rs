// runner.rs - Timed generation loop on a tokio runtime

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{DEFAULT_TICK_INTERVAL, SimulationConfig};
use crate::error::{Result, SimError};
use crate::grid::Cell;
use crate::rules::{RuleId, RuleParameters};
use crate::session::SimulationSession;

/// A session shared between the ticker task and its readers.
pub type SharedSession = Arc<Mutex<SimulationSession>>;

/// Locks a shared session, recovering from poisoning.
///
/// A step only writes the scratch buffer before swapping, so a panic
/// mid-step cannot leave the visible grid half-written.
pub fn lock(session: &SharedSession) -> MutexGuard<'_, SimulationSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Drives a [`SimulationSession`] at a fixed interval.
///
/// At most one ticker task exists at a time. Each tick takes the session lock,
/// computes a whole generation and releases it, so readers only ever see
/// complete generations. Dropping the loop stops it.
///
/// Every start and stop advances `epoch`. A ticker re-reads it after taking
/// the lock and exits without stepping once it no longer matches the value it
/// was spawned with, so no tick lands after `stop` returns.
pub struct SimulationLoop {
    session: SharedSession,
    runtime: Handle,
    ticker: Option<JoinHandle<()>>,
    epoch: Arc<AtomicU64>,
    interval: Duration,
    stop_on_cycle: bool,
}

impl SimulationLoop {
    pub fn new(session: SimulationSession, runtime: Handle) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            runtime,
            ticker: None,
            epoch: Arc::new(AtomicU64::new(0)),
            interval: DEFAULT_TICK_INTERVAL,
            stop_on_cycle: false,
        }
    }

    pub fn from_config(config: &SimulationConfig, runtime: Handle) -> Result<Self> {
        let mut sim = Self::new(SimulationSession::from_config(config)?, runtime);
        sim.interval = config.tick_interval;
        sim.stop_on_cycle = config.stop_on_cycle;
        Ok(sim)
    }

    /// A handle for readers such as a renderer.
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Runs `f` against the session under the lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&SimulationSession) -> R) -> R {
        f(&lock(&self.session))
    }

    pub fn state(&self) -> LoopState {
        match &self.ticker {
            Some(ticker) if !ticker.is_finished() => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect immediately; a running ticker is restarted to pick it up.
    pub fn set_stop_on_cycle(&mut self, stop_on_cycle: bool) {
        self.stop_on_cycle = stop_on_cycle;
        self.restart_if_running();
    }

    /// Starts stepping every `interval`, replacing any running ticker.
    pub fn start(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(SimError::parameter("tick_interval", "must be non-zero"));
        }
        self.cancel_ticker();
        self.interval = interval;
        self.ticker = Some(self.spawn_ticker());
        info!("simulation started, one generation every {interval:?}");
        Ok(())
    }

    /// Starts at the configured interval (100 ms unless set otherwise).
    pub fn resume(&mut self) -> Result<()> {
        self.start(self.interval)
    }

    /// Halts stepping. Calling it while stopped does nothing.
    pub fn stop(&mut self) {
        if self.cancel_ticker() {
            info!("simulation stopped");
        }
    }

    fn cancel_ticker(&mut self) -> bool {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        match self.ticker.take() {
            Some(ticker) => {
                ticker.abort();
                true
            }
            None => false,
        }
    }

    /// Restarts a running ticker with the same interval, so reconfiguration
    /// takes effect on a fresh tick schedule.
    fn restart_if_running(&mut self) {
        if self.is_running() {
            self.cancel_ticker();
            self.ticker = Some(self.spawn_ticker());
            debug!("ticker restarted after reconfiguration");
        }
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let epoch = Arc::clone(&self.epoch);
        let token = epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let period = self.interval;
        let stop_on_cycle = self.stop_on_cycle;
        self.runtime.spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let cycling = {
                    let mut guard = lock(&session);
                    if epoch.load(Ordering::SeqCst) != token {
                        break;
                    }
                    guard.step();
                    guard.is_cycling()
                };
                if stop_on_cycle && cycling {
                    info!("cycle detected, simulation stopped");
                    break;
                }
            }
        })
    }

    /// Computes one generation now. Allowed whether running or stopped.
    pub fn step(&self) -> u64 {
        lock(&self.session).step()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<Cell> {
        lock(&self.session).get_cell(row, col)
    }

    pub fn total_states(&self) -> u32 {
        lock(&self.session).total_states()
    }

    pub fn toggle_cell(&self, row: usize, col: usize) -> Result<Cell> {
        lock(&self.session).toggle_cell(row, col)
    }

    pub fn generation(&self) -> u64 {
        lock(&self.session).generation()
    }

    pub fn set_active_rule(&mut self, rule: RuleId) -> Result<()> {
        lock(&self.session).set_active_rule(rule)?;
        self.restart_if_running();
        Ok(())
    }

    pub fn set_rule_parameters(&mut self, parameters: RuleParameters) -> Result<()> {
        lock(&self.session).set_parameters(parameters)?;
        self.restart_if_running();
        Ok(())
    }

    /// Stops the loop and zeroes every cell.
    pub fn clear(&mut self) {
        self.stop();
        lock(&self.session).clear();
    }

    pub fn randomize(&self) {
        lock(&self.session).randomize();
    }

    /// Stops the loop and replaces the grid with an empty one of the new size.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.stop();
        lock(&self.session).resize(rows, cols)
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
