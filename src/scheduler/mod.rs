//! This file contains the poll scheduler: a small state machine that re-runs the results cycle on a fixed
//! interval.
//!
//!   Idle --enable()--> Running --disable()/teardown()--> Idle
//!
//! Entering `Running` spawns a timer task that fires one cycle immediately and then one per interval.
//! The timer task awaits every cycle before waiting for the next tick, so scheduled cycles never overlap.
//!
//! Leaving `Running` only stops *future* ticks. A cycle that is already in flight runs to completion and its
//! results are applied (the owner of the cycle decides whether the view is still alive).
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::oneshot, time::MissedTickBehavior};
use tracing::{event, Level};

/// One fetch-apply pass. Implemented by the results view.
#[async_trait]
pub trait Cycle {
    async fn run_cycle(&self);
}

pub type SyncCycle = Arc<dyn Cycle + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
}

/// Owned handle on the timer task. Dropping the sender stops the task after its current cycle.
struct Timer {
    stop: oneshot::Sender<()>,
}

pub struct PollScheduler {
    interval: Duration,
    timer: Mutex<Option<Timer>>,
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PollScheduler {{ interval: {:?}, state: {:?} }}",
            self.interval,
            self.state()
        )
    }
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            timer: Mutex::new(None),
        }
    }

    fn acquire_lock(&self) -> MutexGuard<Option<Timer>> {
        match self.timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn state(&self) -> PollState {
        if self.acquire_lock().is_some() {
            PollState::Running
        } else {
            PollState::Idle
        }
    }

    /// Idle -> Running. Triggers one cycle right away, then one per interval.
    /// Returns false (and does nothing) if the scheduler was already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enable(&self, cycle: SyncCycle) -> bool {
        let mut guard = self.acquire_lock();
        if guard.is_some() {
            return false;
        }

        let (stop, stop_receiver) = oneshot::channel();
        tokio::spawn(run_timer(self.interval, cycle, stop_receiver));
        *guard = Some(Timer { stop });

        event!(Level::INFO, "polling enabled every {:?}", self.interval);
        true
    }

    /// Running -> Idle. Returns false if the scheduler was already idle.
    pub fn disable(&self) -> bool {
        match self.acquire_lock().take() {
            Some(timer) => {
                // the receiver is gone if the task already exited; nothing left to stop then
                let _ = timer.stop.send(());
                event!(Level::INFO, "polling disabled");
                true
            }
            None => false,
        }
    }

    /// Unconditionally cancels the timer. Safe to call any number of times, including before `enable`.
    pub fn teardown(&self) {
        self.disable();
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_timer(period: Duration, cycle: SyncCycle, mut stop: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // a stop that arrived while the last cycle ran must win over an already elapsed tick
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        cycle.run_cycle().await;
    }

    event!(Level::DEBUG, "poll timer task exited");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{Cycle, PollScheduler, PollState};

    #[derive(Default)]
    struct CountingCycle {
        started: AtomicUsize,
        finished: AtomicUsize,
        latency: Duration,
    }

    #[async_trait]
    impl Cycle for CountingCycle {
        async fn run_cycle(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn started(cycle: &CountingCycle) -> usize {
        cycle.started.load(Ordering::SeqCst)
    }

    fn finished(cycle: &CountingCycle) -> usize {
        cycle.finished.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn enable_fires_immediately_then_every_interval() {
        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle::default());

        assert!(scheduler.enable(cycle.clone()));
        assert_eq!(scheduler.state(), PollState::Running);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(started(&cycle), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(started(&cycle), 2);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(started(&cycle), 4);

        scheduler.teardown();
    }

    #[tokio::test(start_paused = true)]
    async fn enable_twice_is_a_noop() {
        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle::default());

        assert!(scheduler.enable(cycle.clone()));
        assert!(!scheduler.enable(cycle.clone()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        // a second timer would have fired its own immediate cycle
        assert_eq!(started(&cycle), 1);

        scheduler.teardown();
    }

    #[tokio::test(start_paused = true)]
    async fn disable_stops_future_cycles() {
        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle::default());

        scheduler.enable(cycle.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(scheduler.disable());
        assert_eq!(scheduler.state(), PollState::Idle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(started(&cycle), 1);
        assert!(!scheduler.disable());
    }

    /// Disabling while a cycle is in flight lets that cycle finish
    #[tokio::test(start_paused = true)]
    async fn disable_does_not_tear_in_flight_cycle() {
        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle {
            latency: Duration::from_secs(2),
            ..Default::default()
        });

        scheduler.enable(cycle.clone());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(started(&cycle), 1);
        assert_eq!(finished(&cycle), 0);

        scheduler.disable();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(started(&cycle), 1);
        assert_eq!(finished(&cycle), 1);
    }

    /// Slow cycles delay the next tick instead of overlapping with it
    #[tokio::test(start_paused = true)]
    async fn cycles_never_overlap() {
        let scheduler = PollScheduler::new(Duration::from_secs(1));
        let cycle = Arc::new(CountingCycle {
            latency: Duration::from_secs(3),
            ..Default::default()
        });

        scheduler.enable(cycle.clone());
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert!(started(&cycle) - finished(&cycle) <= 1);
        }

        scheduler.teardown();
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_is_idempotent() {
        let never_started = PollScheduler::new(Duration::from_secs(10));
        never_started.teardown();
        never_started.teardown();
        assert_eq!(never_started.state(), PollState::Idle);

        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle::default());
        scheduler.enable(cycle.clone());
        scheduler.teardown();
        scheduler.teardown();
        assert_eq!(scheduler.state(), PollState::Idle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(started(&cycle) <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn can_be_re_enabled() {
        let scheduler = PollScheduler::new(Duration::from_secs(10));
        let cycle = Arc::new(CountingCycle::default());

        scheduler.enable(cycle.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        scheduler.disable();
        assert!(scheduler.enable(cycle.clone()));
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(started(&cycle), 2);
        scheduler.teardown();
    }
}
