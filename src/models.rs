use crate::calendar::DayCell;
use crate::timer::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    /// Raw text from the duration field; a leading integer is parsed out of
    /// it server-side.
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetActivityRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// One observation of the timer, derived from the anchor at request time.
#[derive(Debug, Serialize)]
pub struct TimerResponse {
    pub phase: Phase,
    pub duration_minutes: i64,
    pub total_seconds: i64,
    pub remaining_seconds: i64,
    pub display: String,
    pub generation: u64,
    pub sessions_completed: u64,
    pub last_completed: Option<DayCell>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub today: String,
    pub generation: u64,
    pub days: BTreeMap<String, u32>,
}
