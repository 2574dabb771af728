use crate::state::AppState;
use crate::storage::LAST_SEEN_KEY;
use chrono::{Local, NaiveDate};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// How often the background task re-checks the local date. Independent of the
/// configured session length.
pub const CHECK_PERIOD: Duration = Duration::from_secs(60);

/// Tracks the last-observed local date so a midnight rollover (while the app
/// stays open) can trigger a full calendar re-render. Never touches the
/// timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverWatcher {
    last_seen: NaiveDate,
}

impl RolloverWatcher {
    pub fn new(last_seen: NaiveDate) -> Self {
        Self { last_seen }
    }

    /// Restores the watcher from a stored `YYYY-MM-DD` value, falling back to
    /// today when the value is missing or unparseable.
    pub fn from_stored(raw: Option<&str>, today: NaiveDate) -> Self {
        let last_seen = raw
            .and_then(|s| s.parse::<NaiveDate>().ok())
            .unwrap_or(today);
        Self { last_seen }
    }

    pub fn last_seen(&self) -> NaiveDate {
        self.last_seen
    }

    /// Compares `today` against the last-observed date. Returns true exactly
    /// when the date changed, updating the watermark; an unchanged date never
    /// fires.
    pub fn observe(&mut self, today: NaiveDate) -> bool {
        if today == self.last_seen {
            return false;
        }
        self.last_seen = today;
        true
    }
}

/// Spawns the periodic date check. On rollover the new date is persisted and
/// the state generation is bumped, which tells connected pages to re-render
/// the whole calendar. The handle is aborted at shutdown.
pub fn spawn_watcher(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CHECK_PERIOD);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            let mut inner = state.inner.lock().await;
            if inner.watcher.observe(today) {
                info!("local date rolled over to {today}, refreshing calendar");
                inner.generation += 1;
                inner.store.set(LAST_SEEN_KEY, today.to_string());
                inner.store.persist().await;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn unchanged_date_never_fires() {
        let mut watcher = RolloverWatcher::new(date("2026-03-14"));
        for _ in 0..5 {
            assert!(!watcher.observe(date("2026-03-14")));
        }
        assert_eq!(watcher.last_seen(), date("2026-03-14"));
    }

    #[test]
    fn changed_date_fires_once_and_updates_watermark() {
        let mut watcher = RolloverWatcher::new(date("2026-03-14"));
        assert!(watcher.observe(date("2026-03-15")));
        assert_eq!(watcher.last_seen(), date("2026-03-15"));

        // The same new date does not fire again.
        assert!(!watcher.observe(date("2026-03-15")));
    }

    #[test]
    fn from_stored_falls_back_to_today() {
        let today = date("2026-07-01");
        assert_eq!(
            RolloverWatcher::from_stored(Some("2026-06-30"), today).last_seen(),
            date("2026-06-30")
        );
        assert_eq!(RolloverWatcher::from_stored(None, today).last_seen(), today);
        assert_eq!(
            RolloverWatcher::from_stored(Some("garbage"), today).last_seen(),
            today
        );
    }
}
