use std::str::FromStr;

use chrono::{Duration, Months, NaiveDateTime};

use crate::error::{Result, TallyError};
use crate::models::Transaction;

/// Relative time window measured back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    All,
    LastWeek,
    LastMonth,
    LastYear,
}

impl TimeWindow {
    /// Records must be strictly after this instant. `None` means no lower bound.
    ///
    /// Month and year steps clamp the day to the end of the target month,
    /// so 31 March minus one month is the last day of February.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TimeWindow::All => None,
            TimeWindow::LastWeek => Some(now - Duration::days(7)),
            TimeWindow::LastMonth => now.checked_sub_months(Months::new(1)),
            TimeWindow::LastYear => now.checked_sub_months(Months::new(12)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::All => "All time",
            TimeWindow::LastWeek => "Last 7 days",
            TimeWindow::LastMonth => "Last month",
            TimeWindow::LastYear => "Last year",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeWindow::All),
            "week" | "last-week" => Ok(TimeWindow::LastWeek),
            "month" | "last-month" => Ok(TimeWindow::LastMonth),
            "year" | "last-year" => Ok(TimeWindow::LastYear),
            other => Err(TallyError::Validation(format!(
                "unknown window '{other}' (expected all, week, month or year)"
            ))),
        }
    }
}

fn in_window(txn: &Transaction, cutoff: Option<NaiveDateTime>) -> bool {
    cutoff.map_or(true, |c| txn.timestamp > c)
}

/// Case-insensitive substring match on category or description.
fn matches_query(txn: &Transaction, needle: &str) -> bool {
    needle.is_empty()
        || txn.category.to_lowercase().contains(needle)
        || txn.description.to_lowercase().contains(needle)
}

/// Narrow `records` to the time window, then to the text query.
///
/// Both conditions must hold. Input order is preserved.
pub fn filter(
    records: &[Transaction],
    query: &str,
    window: TimeWindow,
    now: NaiveDateTime,
) -> Vec<Transaction> {
    let cutoff = window.cutoff(now);
    let needle = query.to_lowercase();
    let out: Vec<Transaction> = records
        .iter()
        .filter(|t| in_window(t, cutoff))
        .filter(|t| matches_query(t, &needle))
        .cloned()
        .collect();
    tracing::debug!(
        input = records.len(),
        output = out.len(),
        query = %needle,
        window = ?window,
        "filtered transactions"
    );
    out
}
