//! Background drivers that emulate organic crowd flow.
//!
//! One [`SimulationDriver`] runs per location on its own Tokio task. A
//! driver starts [`DriverPhase::Dormant`], waits out the configured
//! startup delay, then turns [`DriverPhase::Active`] and ticks on an
//! interval drawn once per location from
//! `[min_interval_ms, max_interval_ms)`. The phase is published on a
//! `watch` channel so a [`DriverHandle`] can observe it after the driver
//! has moved onto its task.
//!
//! Each tick nudges the location's check-in count up or down by a small
//! random amount through [`DensityStore::adjust_check_ins`], so simulated
//! traffic goes through the same mutate, sample, and publish path as real
//! reports. Drivers share nothing but the store handle.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::store::DensityStore;

/// Lifecycle phase of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    /// Waiting for the startup delay to elapse.
    Dormant,
    /// Ticking on the location's interval.
    Active,
}

/// Whether simulated people arrive or leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// People arrive.
    Enter,
    /// People leave.
    Leave,
}

/// One random perturbation of a location's check-in count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    /// How many people move.
    pub change: u32,
    /// Which way they move.
    pub direction: Direction,
}

impl FlowStep {
    /// Signed check-in delta for this step.
    pub fn delta(self) -> i64 {
        let change = i64::from(self.change);
        match self.direction {
            Direction::Enter => change,
            Direction::Leave => change.saturating_neg(),
        }
    }
}

/// Draw a step: `change` uniform in `1..=max_change`, entering with
/// probability `enter_probability`.
pub fn draw_step<R: Rng + ?Sized>(
    rng: &mut R,
    enter_probability: f64,
    max_change: u32,
) -> FlowStep {
    let change = rng.random_range(1..=max_change.max(1));
    let direction = if rng.random_bool(enter_probability.clamp(0.0, 1.0)) {
        Direction::Enter
    } else {
        Direction::Leave
    };
    FlowStep { change, direction }
}

/// Draw a tick interval uniformly from `[min_interval_ms, max_interval_ms)`.
pub fn draw_interval<R: Rng + ?Sized>(rng: &mut R, config: &SimulationConfig) -> Duration {
    let lower = config.min_interval_ms.max(1);
    let upper = config.max_interval_ms.max(lower.saturating_add(1));
    Duration::from_millis(rng.random_range(lower..upper))
}

/// Simulated crowd flow for a single location.
#[derive(Debug)]
pub struct SimulationDriver {
    key: String,
    store: Arc<DensityStore>,
    rng: StdRng,
    phase: watch::Sender<DriverPhase>,
    startup_delay: Duration,
    interval: Duration,
    enter_probability: f64,
    max_change: u32,
}

impl SimulationDriver {
    /// Create a driver seeded from the operating system.
    pub fn new(
        key: impl Into<String>,
        store: Arc<DensityStore>,
        config: &SimulationConfig,
    ) -> Self {
        Self::with_rng(key, store, config, StdRng::from_os_rng())
    }

    /// Create a driver with an explicit random source.
    pub fn with_rng(
        key: impl Into<String>,
        store: Arc<DensityStore>,
        config: &SimulationConfig,
        mut rng: StdRng,
    ) -> Self {
        let interval = draw_interval(&mut rng, config);
        Self {
            key: key.into(),
            store,
            rng,
            phase: watch::Sender::new(DriverPhase::Dormant),
            startup_delay: Duration::from_millis(config.startup_delay_ms),
            interval,
            enter_probability: config.enter_probability,
            max_change: config.max_change,
        }
    }

    /// Location key this driver perturbs.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> DriverPhase {
        *self.phase.borrow()
    }

    /// Subscribe to phase transitions.
    pub fn watch_phase(&self) -> watch::Receiver<DriverPhase> {
        self.phase.subscribe()
    }

    /// Interval between ticks once active.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Apply one random step to the location.
    ///
    /// Returns the check-in count after the step, or `None` if the
    /// location is no longer registered.
    pub async fn tick(&mut self) -> Option<u32> {
        let step = draw_step(&mut self.rng, self.enter_probability, self.max_change);
        let check_ins = self
            .store
            .adjust_check_ins(&self.key, step.delta())
            .await
            .inspect_err(|e| warn!(location = %self.key, error = %e, "Simulation tick skipped"))
            .ok()?;
        debug!(
            location = %self.key,
            change = step.change,
            direction = ?step.direction,
            check_ins,
            "Simulated crowd flow"
        );
        Some(check_ins)
    }

    /// Sleep through the startup delay, then tick forever.
    ///
    /// Runs until the owning task is aborted.
    pub async fn run(mut self) {
        sleep(self.startup_delay).await;
        self.phase.send_replace(DriverPhase::Active);
        info!(
            location = %self.key,
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Simulation driver active"
        );

        let now = Instant::now();
        let start = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Move the driver onto its own Tokio task.
    pub fn spawn(self) -> DriverHandle {
        let key = self.key.clone();
        let phase = self.watch_phase();
        let task = tokio::spawn(self.run());
        DriverHandle { key, phase, task }
    }
}

/// Owner's view of a spawned [`SimulationDriver`].
#[derive(Debug)]
pub struct DriverHandle {
    key: String,
    phase: watch::Receiver<DriverPhase>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Location key the driver perturbs.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last phase the driver published.
    pub fn phase(&self) -> DriverPhase {
        *self.phase.borrow()
    }

    /// A receiver that wakes on every phase transition.
    pub fn watch_phase(&self) -> watch::Receiver<DriverPhase> {
        self.phase.clone()
    }

    /// Stop the driver task.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawn one driver per key on its own Tokio task.
///
/// The caller owns the returned handles and aborts them at shutdown.
pub fn spawn_drivers(
    store: &Arc<DensityStore>,
    keys: &[String],
    config: &SimulationConfig,
) -> Vec<DriverHandle> {
    keys.iter()
        .map(|key| SimulationDriver::new(key.as_str(), Arc::clone(store), config).spawn())
        .collect()
}
