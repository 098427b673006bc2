//! The progress animator moves the displayed turnout towards its latest target over a fixed duration.
//!
//! Every call to [`ProgressAnimator::animate`] supersedes the previous one: the old ticker task is aborted
//! and a generation counter makes sure a ticker that was already past its last await can't write anymore.
//! That keeps a single writer for `displayed_percentage` at all times. Dropping the animator (or calling
//! [`ProgressAnimator::shutdown`]) cancels the in-flight ticker.
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use serde::Serialize;
use tokio::{task::JoinHandle, time::Instant};
use tracing::{event, Level};

pub mod tween;

use tween::{Step, Tween, CONVERGENCE_EPSILON};

/// What the turnout gauge shows and where it is heading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnoutState {
    pub displayed_percentage: f64,
    pub target_percentage: f64,
    pub is_animating: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: TurnoutState,
    // bumped on every animate/shutdown. A ticker only writes while its generation is current
    generation: u64,
    // set by shutdown, turns every later animate into a no-op
    closed: bool,
}

/// Decrements the live ticker count when the ticker future is dropped (finished or aborted)
struct TickerGuard {
    running: Arc<AtomicUsize>,
}

impl TickerGuard {
    fn new(running: Arc<AtomicUsize>) -> Self {
        running.fetch_add(1, Ordering::SeqCst);
        Self { running }
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug)]
pub struct ProgressAnimator {
    shared: Arc<Mutex<Shared>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    running_tickers: Arc<AtomicUsize>,
    duration: Duration,
    steps: u32,
}

impl ProgressAnimator {
    pub fn new(duration: Duration, steps: u32) -> Self {
        Self {
            shared: Default::default(),
            ticker: Mutex::new(None),
            running_tickers: Default::default(),
            duration,
            steps: steps.max(1),
        }
    }

    pub fn state(&self) -> TurnoutState {
        lock(&self.shared).state
    }

    /// Number of ticker tasks currently alive. Never more than one once aborts have been processed
    pub fn running_tickers(&self) -> usize {
        self.running_tickers.load(Ordering::SeqCst)
    }

    fn abort_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }

    /// Starts moving the displayed value towards `target` (clamped to `[0, 100]`).
    ///
    /// Changes smaller than [`CONVERGENCE_EPSILON`] are not animated: any running animation is cancelled,
    /// the target is recorded and the displayed value stays where it is.
    ///
    /// Must be called from within a tokio runtime. Ignored once the animator has been shut down.
    pub fn animate(&self, target: f64) {
        let target = target.clamp(0.0, 100.0);

        let mut shared = lock(&self.shared);
        if shared.closed {
            event!(Level::DEBUG, "animator shut down, ignoring target {:.1}", target);
            return;
        }
        shared.generation += 1;
        let generation = shared.generation;
        self.abort_ticker();

        shared.state.target_percentage = target;
        let start = shared.state.displayed_percentage;
        if (target - start).abs() < CONVERGENCE_EPSILON {
            shared.state.is_animating = false;
            return;
        }
        shared.state.is_animating = true;

        event!(Level::DEBUG, "animating turnout from {:.1} to {:.1}", start, target);

        let step_duration = (self.duration / self.steps).max(Duration::from_millis(1));
        // the ticker only touches `shared` after its first tick, so spawning under the lock is fine
        let handle = tokio::spawn(run_ticker(
            self.shared.clone(),
            generation,
            Tween::new(start, target, self.steps),
            step_duration,
            TickerGuard::new(self.running_tickers.clone()),
        ));
        *lock(&self.ticker) = Some(handle);
    }

    /// Cancels the in-flight animation, if any, and refuses new ones. The gauge keeps its current value.
    /// Idempotent.
    pub fn shutdown(&self) {
        let mut shared = lock(&self.shared);
        shared.closed = true;
        shared.generation += 1;
        shared.state.is_animating = false;
        self.abort_ticker();
    }
}

impl Drop for ProgressAnimator {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}

async fn run_ticker(
    shared: Arc<Mutex<Shared>>,
    generation: u64,
    mut tween: Tween,
    step_duration: Duration,
    _guard: TickerGuard,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + step_duration, step_duration);
    loop {
        interval.tick().await;
        let step = tween.advance();

        let mut guard = lock(&shared);
        if guard.generation != generation {
            return;
        }

        match step {
            Step::Intermediate(value) => {
                guard.state.displayed_percentage = value;
            }
            Step::Done(value) => {
                guard.state.displayed_percentage = value;
                guard.state.is_animating = false;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ProgressAnimator;

    fn animator() -> ProgressAnimator {
        ProgressAnimator::new(Duration::from_millis(1500), 60)
    }

    #[tokio::test(start_paused = true)]
    async fn converges_to_target() {
        let animator = animator();
        animator.animate(42.0);

        let state = animator.state();
        assert!(state.is_animating);
        assert_eq!(state.target_percentage, 42.0);
        assert_eq!(state.displayed_percentage, 0.0);

        tokio::time::sleep(Duration::from_millis(750)).await;
        let midway = animator.state();
        assert!(midway.is_animating);
        assert!(midway.displayed_percentage > 0.0 && midway.displayed_percentage < 42.0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let state = animator.state();
        assert_eq!(state.displayed_percentage, 42.0);
        assert!(!state.is_animating);
        assert_eq!(animator.running_tickers(), 0);
    }

    /// Re-targeting mid-flight supersedes the first animation: one ticker, one final value
    #[tokio::test(start_paused = true)]
    async fn restart_mid_flight() {
        let animator = animator();
        animator.animate(42.0);
        tokio::time::sleep(Duration::from_millis(500)).await;

        animator.animate(43.0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(animator.running_tickers(), 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        let state = animator.state();
        assert_eq!(state.displayed_percentage, 43.0);
        assert_eq!(state.target_percentage, 43.0);
        assert!(!state.is_animating);
        assert_eq!(animator.running_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn imperceptible_change_is_not_animated() {
        let animator = animator();
        animator.animate(0.05);

        let state = animator.state();
        assert!(!state.is_animating);
        assert_eq!(state.displayed_percentage, 0.0);
        assert_eq!(state.target_percentage, 0.05);
        assert_eq!(animator.running_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_ticker() {
        let animator = animator();
        animator.animate(80.0);
        tokio::time::sleep(Duration::from_millis(300)).await;

        animator.shutdown();
        let frozen = animator.state().displayed_percentage;
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let state = animator.state();
        assert!(!state.is_animating);
        assert_eq!(state.displayed_percentage, frozen);
        assert_eq!(animator.running_tickers(), 0);

        // idempotent
        animator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn animate_after_shutdown_is_ignored() {
        let animator = animator();
        animator.shutdown();
        animator.animate(60.0);

        let state = animator.state();
        assert!(!state.is_animating);
        assert_eq!(state.target_percentage, 0.0);
        assert_eq!(state.displayed_percentage, 0.0);
        assert_eq!(animator.running_tickers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn targets_are_clamped() {
        let animator = animator();
        animator.animate(150.0);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(animator.state().displayed_percentage, 100.0);
    }
}
