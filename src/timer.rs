use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const MIN_DURATION_MINUTES: i64 = 1;
pub const MAX_DURATION_MINUTES: i64 = 240;
pub const DEFAULT_DURATION_MINUTES: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Editing,
    Completed,
}

/// Outcome of a single tick observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The engine was not running; nothing happened.
    Ignored,
    /// Still counting down; carries the derived remaining seconds.
    Counting(i64),
    /// The countdown just reached zero. Fires at most once per run.
    Completed,
}

/// Countdown state machine. All mutable timer state lives here; callers drive
/// it through the operations below and every disallowed-state call is a no-op.
///
/// Remaining time is always derived from the anchor timestamp while running,
/// never accumulated by repeated subtraction, so a starved tick schedule (or a
/// long gap between observations) cannot drift the clock.
#[derive(Debug)]
pub struct TimerEngine {
    phase: Phase,
    total_seconds: i64,
    remaining_seconds: i64,
    anchor: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Builds an idle engine. Out-of-range durations (e.g. a mangled stored
    /// value) fall back to the default rather than erroring.
    pub fn new(duration_minutes: i64) -> Self {
        let minutes = if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            duration_minutes
        } else {
            DEFAULT_DURATION_MINUTES
        };
        let total = minutes * 60;
        Self {
            phase: Phase::Idle,
            total_seconds: total,
            remaining_seconds: total,
            anchor: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total_seconds(&self) -> i64 {
        self.total_seconds
    }

    pub fn duration_minutes(&self) -> i64 {
        self.total_seconds / 60
    }

    /// Derived remaining time at `now`. While running this recomputes from the
    /// anchor; otherwise it reports the frozen snapshot.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> i64 {
        match (self.phase, self.anchor) {
            (Phase::Running, Some(anchor)) => self.derive_remaining(anchor, now),
            _ => self.remaining_seconds,
        }
    }

    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    /// Enters `running` from `idle` or `paused`. The anchor is back-dated by
    /// the elapsed progress so resuming from a pause picks up where it left
    /// off. No-op in any other phase.
    pub fn start_at(&mut self, now: DateTime<Utc>) {
        if !matches!(self.phase, Phase::Idle | Phase::Paused) {
            return;
        }
        let elapsed = self.total_seconds - self.remaining_seconds;
        self.anchor = Some(now - Duration::seconds(elapsed));
        self.phase = Phase::Running;
    }

    pub fn tick(&mut self) -> Tick {
        self.tick_at(Utc::now())
    }

    /// Recomputes remaining time from the anchor. Transitions to `completed`
    /// when the countdown reaches zero; subsequent ticks are ignored, so the
    /// completion outcome is delivered exactly once per run.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Tick {
        if self.phase != Phase::Running {
            return Tick::Ignored;
        }
        let Some(anchor) = self.anchor else {
            return Tick::Ignored;
        };
        let remaining = self.derive_remaining(anchor, now);
        self.remaining_seconds = remaining;
        if remaining == 0 {
            self.phase = Phase::Completed;
            self.anchor = None;
            Tick::Completed
        } else {
            Tick::Counting(remaining)
        }
    }

    pub fn pause(&mut self) -> Tick {
        self.pause_at(Utc::now())
    }

    /// Takes one final tick to capture an accurate snapshot, then freezes in
    /// `paused`. If that final tick lands on zero the completion wins and the
    /// engine is `completed` instead. No-op unless running.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Tick {
        let outcome = self.tick_at(now);
        if let Tick::Counting(_) = outcome {
            self.phase = Phase::Paused;
            self.anchor = None;
        }
        outcome
    }

    /// Stops the countdown and restores the full duration. Allowed from every
    /// phase except `editing`.
    pub fn reset(&mut self) {
        if self.phase == Phase::Editing {
            return;
        }
        self.phase = Phase::Idle;
        self.anchor = None;
        self.remaining_seconds = self.total_seconds;
    }

    /// Opens duration editing. Only allowed from `idle`.
    pub fn begin_edit(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Editing;
    }

    /// Parses a leading integer from `raw`; valid iff it lands in
    /// [1, 240] minutes. A valid, different value replaces the duration and
    /// resets the countdown, and the new minutes are returned so the caller
    /// can persist them. Anything else silently keeps the prior duration.
    /// Always exits `editing` back to `idle`.
    pub fn commit_edit(&mut self, raw: &str) -> Option<i64> {
        if self.phase != Phase::Editing {
            return None;
        }
        self.phase = Phase::Idle;
        let minutes = parse_leading_int(raw)?;
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
            return None;
        }
        if minutes * 60 == self.total_seconds {
            return None;
        }
        self.total_seconds = minutes * 60;
        self.remaining_seconds = self.total_seconds;
        Some(minutes)
    }

    /// Abandons the edit, keeping the prior duration. Escape takes this path;
    /// Enter goes through `commit_edit`.
    pub fn cancel_edit(&mut self) {
        if self.phase != Phase::Editing {
            return;
        }
        self.phase = Phase::Idle;
    }

    /// Leaves the brief `completed` display state and rearms for the next run.
    pub fn rearm(&mut self) {
        if self.phase != Phase::Completed {
            return;
        }
        self.phase = Phase::Idle;
        self.remaining_seconds = self.total_seconds;
    }

    fn derive_remaining(&self, anchor: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - anchor).num_seconds();
        (self.total_seconds - elapsed).clamp(0, self.total_seconds)
    }
}

/// Leading-integer parse in the `parseInt` style: optional sign, then digits,
/// trailing junk ignored. `None` when no integer leads the input.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

pub fn format_clock(seconds: i64) -> String {
    let s = seconds.max(0);
    if s >= 3600 {
        format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
    } else {
        format!("{:02}:{:02}", s / 60, s % 60)
    }
}
