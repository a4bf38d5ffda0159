use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Result, TallyError};
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Week,
    Month,
    Year,
}

impl Granularity {
    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Display label for the period starting at `start`.
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Week => {
                let end = start + Duration::days(6);
                format!("{} - {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))
            }
            Granularity::Month => start.format("%B %Y").to_string(),
            Granularity::Year => start.format("%Y").to_string(),
        }
    }
}

impl FromStr for Granularity {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(TallyError::Validation(format!(
                "unknown period '{other}' (expected week, month or year)"
            ))),
        }
    }
}

/// How buckets are ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketOrder {
    /// Newest period first, by period start date.
    #[default]
    Period,
    /// Descending by the label string. Matches what older exports showed but
    /// misorders weeks across months and months within a year.
    Label,
}

impl FromStr for BucketOrder {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "period" | "date" => Ok(BucketOrder::Period),
            "label" => Ok(BucketOrder::Label),
            other => Err(TallyError::Validation(format!(
                "unknown order '{other}' (expected period or label)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub start: NaiveDate,
    pub label: String,
    pub members: Vec<Transaction>,
}

/// Partition `records` into period buckets.
///
/// Every record lands in exactly one bucket; members keep input order.
pub fn group_by_period(
    records: &[Transaction],
    granularity: Granularity,
    order: BucketOrder,
) -> Vec<Bucket> {
    let mut by_start: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for txn in records {
        let start = granularity.period_start(txn.timestamp.date());
        by_start.entry(start).or_default().push(txn.clone());
    }

    let mut buckets: Vec<Bucket> = by_start
        .into_iter()
        .rev()
        .map(|(start, members)| Bucket {
            start,
            label: granularity.label(start),
            members,
        })
        .collect();

    if order == BucketOrder::Label {
        buckets.sort_by(|a, b| b.label.cmp(&a.label));
    }

    tracing::debug!(
        records = records.len(),
        buckets = buckets.len(),
        granularity = ?granularity,
        "grouped transactions"
    );
    buckets
}
