//! Refresh timer engine
//!
//! Owns the single pending reload timer of a view together with the
//! tri-state [`TimerPhase`], and persists the activity flag on explicit
//! start/stop. Phase changes are published on a watch channel.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{state::TimerPhase, store::ActivityStore};

/// Opaque id of a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// Source of one-shot timers. Firing is reported back to the engine by the
/// owner of the scheduler through [`TimerEngine::on_timer_fired`].
pub trait Scheduler: Send {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Inclusive window the reload delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshWindow {
    min_ms: u64,
    max_ms: u64,
}

impl RefreshWindow {
    pub const DEFAULT_MIN_MS: u64 = 7_500;
    pub const DEFAULT_MAX_MS: u64 = 10_000;

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min() && delay <= self.max()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for RefreshWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_MS, Self::DEFAULT_MAX_MS)
    }
}

pub struct TimerEngine {
    phase: TimerPhase,
    pending: Option<TimerHandle>,
    scheduler: Box<dyn Scheduler>,
    activity: ActivityStore,
    window: RefreshWindow,
    rng: StdRng,
    phase_tx: watch::Sender<TimerPhase>,
    /// Keep the receiver alive so phase sends never fail
    _phase_rx: watch::Receiver<TimerPhase>,
}

impl TimerEngine {
    pub fn new(scheduler: Box<dyn Scheduler>, activity: ActivityStore, window: RefreshWindow) -> Self {
        let (phase_tx, phase_rx) = watch::channel(TimerPhase::Stopped);
        Self {
            phase: TimerPhase::Stopped,
            pending: None,
            scheduler,
            activity,
            window,
            rng: StdRng::from_entropy(),
            phase_tx,
            _phase_rx: phase_rx,
        }
    }

    /// Replace the delay source, e.g. with a seeded generator
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn window(&self) -> RefreshWindow {
        self.window
    }

    /// Receive every phase change of this engine
    pub fn subscribe(&self) -> watch::Receiver<TimerPhase> {
        self.phase_tx.subscribe()
    }

    pub fn activity_degraded(&self) -> bool {
        self.activity.is_degraded()
    }

    /// Resume auto-refresh left enabled by a previous view of the origin
    pub fn mount(&mut self) {
        if self.activity.is_enabled() {
            info!("Auto-refresh was left enabled, starting timer on mount");
            self.start();
        } else {
            debug!("Auto-refresh disabled at mount");
        }
    }

    pub fn start(&mut self) {
        self.cancel_pending();

        let delay = self.window.sample(&mut self.rng);
        let handle = self.scheduler.schedule_once(delay);
        self.pending = Some(handle);
        debug!("Reload scheduled in {}ms ({:?})", delay.as_millis(), handle);

        self.activity.set_enabled(true);
        self.set_phase(TimerPhase::Running);
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
        self.activity.set_enabled(false);
        self.set_phase(TimerPhase::Stopped);
    }

    /// Hold off the reload without touching the persisted flag
    pub fn suspend(&mut self) {
        if self.phase != TimerPhase::Running {
            debug!("Suspend ignored in phase {:?}", self.phase);
            return;
        }
        self.cancel_pending();
        self.set_phase(TimerPhase::Suspended);
    }

    pub fn toggle(&mut self) {
        if self.phase.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Restart a suspended timer whose flag is still set. Returns false, and
    /// changes nothing, in every other situation.
    pub fn resume_if_suspended_and_flag_set(&mut self) -> bool {
        if !self.phase.is_suspended() || !self.activity.is_enabled() {
            return false;
        }
        info!("Resuming suspended auto-refresh");
        self.start();
        true
    }

    /// Called by the scheduler's owner when `handle` fires. Returns true when
    /// the view must reload now.
    pub fn on_timer_fired(&mut self, handle: TimerHandle) -> bool {
        if self.pending != Some(handle) {
            debug!("Ignoring stale timer {:?}", handle);
            return false;
        }
        self.pending = None;
        info!("Refresh timer fired, reloading view");
        true
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
            debug!("Cancelled pending reload {:?}", handle);
        }
    }

    fn set_phase(&mut self, phase: TimerPhase) {
        if self.phase != phase {
            info!("Timer phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;

        if let Err(e) = self.phase_tx.send(phase) {
            warn!("Failed to publish timer phase: {}", e);
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[derive(Debug, Default)]
struct ManualTimers {
    next_id: u64,
    pending: BTreeMap<TimerHandle, Duration>,
    scheduled: Vec<Duration>,
}

/// Scheduler that never fires on its own. The embedder decides when a timer
/// is due and hands its handle to [`TimerEngine::on_timer_fired`].
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    timers: Arc<Mutex<ManualTimers>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers scheduled and not yet cancelled or fired
    pub fn pending(&self) -> Vec<(TimerHandle, Duration)> {
        self.with_timers(|t| t.pending.iter().map(|(h, d)| (*h, *d)).collect())
    }

    pub fn pending_count(&self) -> usize {
        self.with_timers(|t| t.pending.len())
    }

    /// Every delay ever requested, in order
    pub fn scheduled(&self) -> Vec<Duration> {
        self.with_timers(|t| t.scheduled.clone())
    }

    /// Remove the oldest pending timer and return its handle for firing
    pub fn fire_next(&self) -> Option<TimerHandle> {
        self.with_timers(|t| t.pending.pop_first().map(|(handle, _)| handle))
    }

    fn with_timers<T>(&self, f: impl FnOnce(&mut ManualTimers) -> T) -> T {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut timers)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.with_timers(|t| {
            t.next_id += 1;
            let handle = TimerHandle(t.next_id);
            t.pending.insert(handle, delay);
            t.scheduled.push(delay);
            handle
        })
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.with_timers(|t| {
            t.pending.remove(&handle);
        });
    }
}
