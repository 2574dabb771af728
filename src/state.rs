use crate::calendar::DayCell;
use crate::ledger::{today_key, ActivityLedger};
use crate::rollover::RolloverWatcher;
use crate::storage::{Store, DURATION_KEY, LAST_SEEN_KEY, RECORD_KEY};
use crate::timer::{Tick, TimerEngine, DEFAULT_DURATION_MINUTES};
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Cadence of the countdown tick while running.
pub const TICK_PERIOD: Duration = Duration::from_millis(100);
/// How long the `completed` phase stays visible before the engine rearms.
pub const COMPLETION_DISPLAY_DELAY: Duration = Duration::from_millis(500);

/// Everything behind the single state lock: the store, the timer engine, the
/// ledger, and the rollover watermark.
pub struct Inner {
    pub store: Store,
    pub engine: TimerEngine,
    pub ledger: ActivityLedger,
    pub watcher: RolloverWatcher,
    /// Bumped whenever the whole calendar must be re-rendered (rollover,
    /// reset-all). Pages compare it against their loaded value.
    pub generation: u64,
    /// Sessions completed since this process started; lets pages detect a
    /// completion between polls even if they miss the brief `completed` phase.
    pub sessions_completed: u64,
    pub last_completed: Option<DayCell>,
}

impl Inner {
    /// The completion side effect: credit today in the ledger, write the
    /// record back through the store, and expose the updated cell for an
    /// in-place patch. Called exactly once per finished run.
    ///
    /// Deliberately synchronous: callers run inside abortable tasks, and an
    /// abort can only land on an await, so the credit, the counters, and the
    /// cell always land together. The disk write happens separately via
    /// `Store::persist_detached`.
    pub fn complete_session(&mut self) {
        let date = today_key();
        let count = self.ledger.increment_on(&date);
        self.store.set(RECORD_KEY, self.ledger.to_json());
        self.sessions_completed += 1;
        self.last_completed = Some(DayCell::for_date(&date, count));
        info!("focus session complete, {date} now at {count}");
    }
}

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<Mutex<Inner>>,
    tick_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    /// Hydrates live state from the store: configured duration (default 40,
    /// out-of-range values discarded), the activity record, and the last-seen
    /// date for rollover detection (seeded to today on first run).
    pub fn new(mut store: Store) -> Self {
        let duration = store
            .get(DURATION_KEY)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        let engine = TimerEngine::new(duration);
        let ledger = ActivityLedger::from_stored(store.get(RECORD_KEY));
        let today = Local::now().date_naive();
        let watcher = RolloverWatcher::from_stored(store.get(LAST_SEEN_KEY), today);
        if store.get(LAST_SEEN_KEY).is_none() {
            store.set(LAST_SEEN_KEY, today.to_string());
        }

        Self {
            inner: Arc::new(Mutex::new(Inner {
                store,
                engine,
                ledger,
                watcher,
                generation: 0,
                sessions_completed: 0,
                last_completed: None,
            })),
            tick_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts the 100 ms tick schedule, replacing (and aborting) any previous
    /// one so at most one schedule exists per engine. The task ends itself on
    /// completion or when the engine has left `running`.
    pub async fn schedule_ticks(&self) {
        let state = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_PERIOD);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let mut inner = state.inner.lock().await;
                match inner.engine.tick_at(Utc::now()) {
                    Tick::Counting(_) => {}
                    Tick::Completed => {
                        // Await-free from the credit through the rearm
                        // schedule: an abort cannot strand the engine in
                        // `completed`.
                        inner.complete_session();
                        inner.store.persist_detached();
                        state.schedule_rearm();
                        break;
                    }
                    Tick::Ignored => break,
                }
            }
        });

        let mut slot = self.tick_task.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Cancels the tick schedule outright (pause, reset). Harmless when no
    /// schedule is active.
    pub async fn cancel_ticks(&self) {
        if let Some(handle) = self.tick_task.lock().await.take() {
            handle.abort();
        }
    }

    /// After the brief completion display, return the engine to `idle` with
    /// the full duration restored.
    pub fn schedule_rearm(&self) {
        let state = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(COMPLETION_DISPLAY_DELAY).await;
            state.inner.lock().await.engine.rearm();
        });
    }
}
