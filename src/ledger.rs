use chrono::Local;
use std::collections::BTreeMap;
use tracing::warn;

/// Date-keyed record of completed focus sessions. Keys are local-calendar
/// `YYYY-MM-DD` strings; an absent key means zero sessions. The only
/// mutations are the +1 increment on completion and the full reset.
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    days: BTreeMap<String, u32>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes a stored record, tolerating absence and corruption: a
    /// missing or unparseable value yields an empty ledger so the app keeps
    /// working on a fresh slate.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<BTreeMap<String, u32>>(raw) {
            Ok(days) => Self { days },
            Err(err) => {
                warn!("failed to parse stored activity record, starting empty: {err}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.days).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn days(&self) -> &BTreeMap<String, u32> {
        &self.days
    }

    pub fn count_on(&self, date: &str) -> u32 {
        self.days.get(date).copied().unwrap_or(0)
    }

    /// Credits one completed session to `date`, creating the entry at 1 if
    /// absent. Returns the updated count for that day.
    pub fn increment_on(&mut self, date: &str) -> u32 {
        let entry = self.days.entry(date.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    /// Clears the whole record. Idempotent; the interactive confirmation gate
    /// lives with the caller, not here.
    pub fn reset_all(&mut self) {
        self.days.clear();
    }
}

/// Today's ledger key on the local calendar, zero-padded `YYYY-MM-DD`.
pub fn today_key() -> String {
    Local::now().date_naive().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_creates_then_counts_up() {
        let mut ledger = ActivityLedger::new();
        assert_eq!(ledger.count_on("2026-03-14"), 0);

        for expected in 1..=5 {
            assert_eq!(ledger.increment_on("2026-03-14"), expected);
        }
        assert_eq!(ledger.count_on("2026-03-14"), 5);
        assert_eq!(ledger.count_on("2026-03-15"), 0);
    }

    #[test]
    fn reset_all_clears_every_day() {
        let mut ledger = ActivityLedger::new();
        ledger.increment_on("2026-01-01");
        ledger.increment_on("2026-06-30");
        ledger.reset_all();
        assert!(ledger.days().is_empty());
        assert_eq!(ledger.count_on("2026-01-01"), 0);

        // Resetting an already-empty ledger is fine.
        ledger.reset_all();
        assert!(ledger.days().is_empty());
    }

    #[test]
    fn json_round_trip_preserves_counts() {
        let mut ledger = ActivityLedger::new();
        ledger.increment_on("2026-02-28");
        ledger.increment_on("2026-02-28");
        ledger.increment_on("2026-12-31");

        let reloaded = ActivityLedger::from_stored(Some(&ledger.to_json()));
        assert_eq!(reloaded.count_on("2026-02-28"), 2);
        assert_eq!(reloaded.count_on("2026-12-31"), 1);
        assert_eq!(reloaded.days().len(), 2);
    }

    #[test]
    fn stored_garbage_yields_empty_ledger() {
        assert!(ActivityLedger::from_stored(None).days().is_empty());
        assert!(ActivityLedger::from_stored(Some("not json")).days().is_empty());
        assert!(ActivityLedger::from_stored(Some("[1,2]")).days().is_empty());
    }

    #[test]
    fn today_key_is_zero_padded_iso() {
        let key = today_key();
        assert_eq!(key.len(), 10);
        assert_eq!(key.as_bytes()[4], b'-');
        assert_eq!(key.as_bytes()[7], b'-');
    }
}
