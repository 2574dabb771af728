use crate::ledger::ActivityLedger;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// The year the heatmap renders. The ledger itself is year-agnostic; days
/// outside this year are recorded but simply have no cell in the grid.
pub const TARGET_YEAR: i32 = 2026;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Five ordered visual buckets for a day's session count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    Empty,
    Level1,
    Level2,
    Level3,
    Level4,
}

impl Intensity {
    pub fn css_class(self) -> &'static str {
        match self {
            Intensity::Empty => "empty",
            Intensity::Level1 => "level-1",
            Intensity::Level2 => "level-2",
            Intensity::Level3 => "level-3",
            Intensity::Level4 => "level-4",
        }
    }
}

pub fn intensity_for(count: u32) -> Intensity {
    match count {
        0 => Intensity::Empty,
        1 => Intensity::Level1,
        2..=3 => Intensity::Level2,
        4..=5 => Intensity::Level3,
        _ => Intensity::Level4,
    }
}

/// Descriptive label for a day cell, e.g. `2026-03-14: 2 sessions`.
pub fn cell_label(date: &str, count: u32) -> String {
    match count {
        0 => format!("{date}: No activity"),
        1 => format!("{date}: 1 session"),
        n => format!("{date}: {n} sessions"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: String,
    pub day: u32,
    pub count: u32,
    pub level: &'static str,
    pub label: String,
}

impl DayCell {
    pub fn for_date(date: &str, count: u32) -> Self {
        let day = date
            .rsplit('-')
            .next()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        Self {
            date: date.to_string(),
            day,
            count,
            level: intensity_for(count).css_class(),
            label: cell_label(date, count),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub month: u32,
    pub name: &'static str,
    /// Blank cells before day 1 so it lands in its weekday column
    /// (Monday-first).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

/// Builds the twelve-month grid for `year` from the ledger's counts.
pub fn build_year(year: i32, ledger: &ActivityLedger) -> Vec<MonthGrid> {
    (1..=12)
        .filter_map(|month| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let leading_blanks = first.weekday().num_days_from_monday();
            let cells = (1..=31)
                .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
                .map(|date| {
                    let key = date.to_string();
                    let count = ledger.count_on(&key);
                    DayCell::for_date(&key, count)
                })
                .collect();
            Some(MonthGrid {
                month,
                name: MONTH_NAMES[(month - 1) as usize],
                leading_blanks,
                cells,
            })
        })
        .collect()
}
