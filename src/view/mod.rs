//! [`LiveResults`] is the live-results view: it owns the pipeline state for as long as the view is open.
//!
//! A cycle is fetch -> join & rank -> turnout target -> animate. Cycles are triggered by the poll scheduler
//! or by a manual refresh and are strictly serial: a trigger that arrives while a cycle is in flight is
//! coalesced into it. Results are applied under the view lock together with the raw data they came from,
//! so a locale change always re-projects the most recently applied fetch.
//!
//! After [`LiveResults::teardown`] the timers are gone and any fetch still in flight is dropped when it
//! completes instead of being applied.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{event, instrument, Level};

use crate::{
    animator::ProgressAnimator,
    client::ResultsClient,
    config::Config,
    fetcher::{fetch_results, FetchedResults},
    model::Locale,
    notify::{Notifier, FETCH_FAILED_MESSAGE},
    projection::project,
    ranking::{rank_fetched, ResultRow},
    scheduler::{Cycle, PollScheduler, PollState},
    turnout::TurnoutEstimator,
};

pub type SyncResultsClient = Arc<dyn ResultsClient + Send + Sync + 'static>;
pub type SyncNotifier = Arc<dyn Notifier + Send + Sync + 'static>;

/// What happened to a triggered cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// fresh results were applied to the view
    Applied,
    /// the fetch failed; the previous results stay visible and the user was notified
    Failed,
    /// another cycle was already in flight, this trigger was folded into it
    Coalesced,
    /// results arrived after teardown and were dropped
    Discarded,
}

/// Read-only view of the pipeline for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSnapshot {
    pub rows: Vec<ResultRow>,
    pub total_votes: u64,
    /// the value the gauge currently shows
    pub turnout_percentage: f64,
    pub target_percentage: f64,
    pub is_animating: bool,
    pub expected_voters: u64,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// true until the first cycle completes (successfully or not)
    pub is_loading: bool,
    pub polling_enabled: bool,
    pub locale: Locale,
}

impl ResultsSnapshot {
    /// The row currently ranked first, if any
    pub fn leader(&self) -> Option<&ResultRow> {
        self.rows.first()
    }
}

#[derive(Debug)]
struct ViewState {
    locale: Locale,
    retained: Option<FetchedResults>,
    rows: Vec<ResultRow>,
    total_votes: u64,
    last_fetched_at: Option<DateTime<Utc>>,
    is_loading: bool,
}

/// Resets the in-progress flag when a cycle ends, however it ends
struct InProgressGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct Pipeline {
    client: SyncResultsClient,
    notifier: SyncNotifier,
    estimator: TurnoutEstimator,
    animator: ProgressAnimator,
    state: Mutex<ViewState>,
    in_progress: AtomicBool,
    alive: AtomicBool,
}

impl Pipeline {
    fn acquire_lock(&self) -> MutexGuard<ViewState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn try_begin(&self) -> Option<InProgressGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InProgressGuard {
                flag: &self.in_progress,
            })
    }

    #[instrument(name = "view::cycle", level = "debug", skip(self))]
    async fn cycle(&self) -> CycleOutcome {
        if !self.alive.load(Ordering::Acquire) {
            return CycleOutcome::Discarded;
        }

        let Some(_in_progress) = self.try_begin() else {
            event!(Level::DEBUG, "results cycle already in flight, coalescing trigger");
            return CycleOutcome::Coalesced;
        };

        let fetched = fetch_results(self.client.as_ref()).await;

        // teardown flips `alive` under this lock, so nothing is applied to a closed view
        let mut state = self.acquire_lock();
        if !self.alive.load(Ordering::Acquire) {
            event!(Level::INFO, "view torn down while fetching, dropping stale results");
            return CycleOutcome::Discarded;
        }

        match fetched {
            Ok(fetched) => {
                let total_votes = fetched.total_votes;
                state.rows = rank_fetched(&fetched, state.locale);
                state.total_votes = total_votes;
                state.retained = Some(fetched);
                state.last_fetched_at = Some(Utc::now());
                state.is_loading = false;

                self.animator.animate(self.estimator.target(total_votes));
                CycleOutcome::Applied
            }
            Err(err) => {
                event!(Level::WARN, "unable to fetch live results: {}", err);
                state.is_loading = false;
                drop(state);
                self.notifier.error(FETCH_FAILED_MESSAGE);
                CycleOutcome::Failed
            }
        }
    }
}

#[async_trait]
impl Cycle for Pipeline {
    async fn run_cycle(&self) {
        self.cycle().await;
    }
}

/// Handle on an open live-results view
pub struct LiveResults {
    pipeline: Arc<Pipeline>,
    scheduler: PollScheduler,
}

impl std::fmt::Debug for LiveResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LiveResults {{ scheduler: {:?} }}", self.scheduler)
    }
}

impl LiveResults {
    /// Opens a view. Nothing is fetched until polling is enabled or [`LiveResults::refresh_now`] is called.
    pub fn new(client: SyncResultsClient, notifier: SyncNotifier, config: &Config) -> Self {
        let pipeline = Pipeline {
            client,
            notifier,
            estimator: TurnoutEstimator::new(config.turnout.expected_voters),
            animator: ProgressAnimator::new(
                Duration::from_millis(config.animation.duration_ms),
                config.animation.steps,
            ),
            state: Mutex::new(ViewState {
                locale: config.locale,
                retained: None,
                rows: Vec::new(),
                total_votes: 0,
                last_fetched_at: None,
                is_loading: true,
            }),
            in_progress: AtomicBool::new(false),
            alive: AtomicBool::new(true),
        };

        Self {
            pipeline: Arc::new(pipeline),
            scheduler: PollScheduler::new(Duration::from_millis(config.polling.interval_ms)),
        }
    }

    /// Snapshot for rendering in `locale`. Rows for a locale other than the active one are projected
    /// from the retained fetch without changing the view's state.
    pub fn get_results(&self, locale: Locale) -> ResultsSnapshot {
        let turnout = self.pipeline.animator.state();
        let state = self.pipeline.acquire_lock();

        let rows = if locale == state.locale {
            state.rows.clone()
        } else {
            project(state.retained.as_ref(), locale).unwrap_or_else(|| state.rows.clone())
        };

        ResultsSnapshot {
            rows,
            total_votes: state.total_votes,
            turnout_percentage: turnout.displayed_percentage,
            target_percentage: turnout.target_percentage,
            is_animating: turnout.is_animating,
            expected_voters: self.pipeline.estimator.expected_voters(),
            last_fetched_at: state.last_fetched_at,
            is_loading: state.is_loading,
            polling_enabled: self.polling_enabled(),
            locale,
        }
    }

    pub fn locale(&self) -> Locale {
        self.pipeline.acquire_lock().locale
    }

    pub fn polling_enabled(&self) -> bool {
        self.scheduler.state() == PollState::Running
    }

    /// Pauses or resumes periodic refresh. Resuming fetches immediately. No-op after teardown.
    pub fn set_polling(&self, enabled: bool) {
        if enabled {
            if !self.pipeline.alive.load(Ordering::Acquire) {
                event!(Level::DEBUG, "ignoring polling request on a torn down view");
                return;
            }
            let cycle = self.pipeline.clone();
            self.scheduler.enable(cycle);
        } else {
            self.scheduler.disable();
        }
    }

    /// Runs one cycle now, outside the polling cadence and regardless of whether polling is enabled.
    /// The polling timer keeps its phase.
    pub async fn refresh_now(&self) -> CycleOutcome {
        self.pipeline.cycle().await
    }

    /// Switches the active language and re-labels the rows from the last applied fetch. Never fetches.
    pub fn on_locale_change(&self, locale: Locale) {
        let mut state = self.pipeline.acquire_lock();
        state.locale = locale;
        if let Some(rows) = project(state.retained.as_ref(), locale) {
            state.rows = rows;
        }
    }

    /// Closes the view: stops polling and the gauge animation, and makes in-flight fetches drop their
    /// results. Idempotent.
    pub fn teardown(&self) {
        {
            let _state = self.pipeline.acquire_lock();
            self.pipeline.alive.store(false, Ordering::Release);
        }
        self.scheduler.teardown();
        self.pipeline.animator.shutdown();
    }
}

impl Drop for LiveResults {
    fn drop(&mut self) {
        self.teardown();
    }
}
