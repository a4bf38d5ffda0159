use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::cli::open_store;
use crate::error::Result;
use crate::models::{Transaction, TransactionKind};
use crate::settings::load_settings;

const MONTHS: u32 = 3;

struct DemoTxn {
    day: u32,
    kind: TransactionKind,
    /// Amount in cents.
    cents: i64,
    category: &'static str,
    description: &'static str,
}

/// Entries repeated every demo month.
const MONTHLY: &[DemoTxn] = &[
    DemoTxn { day: 1, kind: TransactionKind::Income, cents: 420_000, category: "Salary", description: "Monthly pay" },
    DemoTxn { day: 2, kind: TransactionKind::Expense, cents: 145_000, category: "Rent", description: "" },
    DemoTxn { day: 5, kind: TransactionKind::Expense, cents: 1_599, category: "Subscriptions", description: "Streaming" },
    DemoTxn { day: 9, kind: TransactionKind::Expense, cents: 8_432, category: "Groceries", description: "Weekly shop" },
    DemoTxn { day: 16, kind: TransactionKind::Expense, cents: 9_115, category: "Groceries", description: "Weekly shop" },
    DemoTxn { day: 18, kind: TransactionKind::Expense, cents: 6_200, category: "Utilities", description: "Electricity, water" },
    DemoTxn { day: 23, kind: TransactionKind::Expense, cents: 7_748, category: "Groceries", description: "Weekly shop" },
];

/// One-off entries, one per month in rotation.
const ROTATING: &[DemoTxn] = &[
    DemoTxn { day: 12, kind: TransactionKind::Income, cents: 35_000, category: "Freelance", description: "Logo design" },
    DemoTxn { day: 20, kind: TransactionKind::Expense, cents: 12_999, category: "Travel", description: "Train tickets" },
    DemoTxn { day: 26, kind: TransactionKind::Expense, cents: 4_850, category: "Dining", description: "Birthday dinner" },
];

fn month_start(today: NaiveDate, back: u32) -> Option<NaiveDate> {
    today.with_day(1)?.checked_sub_months(Months::new(back))
}

fn at(month: NaiveDate, day: u32) -> Option<NaiveDateTime> {
    month.with_day(day)?.and_hms_opt(12, 0, 0)
}

/// Sample transactions for the last few months, skipping dates still in the future.
pub fn sample_transactions(now: NaiveDateTime) -> Result<Vec<Transaction>> {
    let mut out = Vec::new();
    for back in (0..MONTHS).rev() {
        let Some(month) = month_start(now.date(), back) else {
            continue;
        };
        let rotating = &ROTATING[(month.month0() as usize) % ROTATING.len()];
        for entry in MONTHLY.iter().chain(std::iter::once(rotating)) {
            let Some(ts) = at(month, entry.day) else {
                continue;
            };
            if ts > now {
                continue;
            }
            out.push(Transaction::new(
                entry.kind,
                Decimal::new(entry.cents, 2),
                entry.category,
                entry.description,
                ts,
            )?);
        }
    }
    Ok(out)
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let samples = sample_transactions(Local::now().naive_local())?;
    for txn in &samples {
        store.insert(txn)?;
    }
    store.close()?;
    println!("Loaded {} sample transactions into {}", samples.len(), settings.db_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    #[test]
    fn test_samples_never_in_future() {
        let now = parse_timestamp("2024-03-10 08:00").unwrap();
        let samples = sample_transactions(now).unwrap();
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|t| t.timestamp <= now));
        assert!(samples.iter().any(|t| t.timestamp.date().month() == 1));
    }

    #[test]
    fn test_samples_have_both_kinds() {
        let now = parse_timestamp("2024-03-31 23:00").unwrap();
        let samples = sample_transactions(now).unwrap();
        assert!(samples.iter().any(|t| t.kind == TransactionKind::Income));
        assert!(samples.iter().any(|t| t.kind == TransactionKind::Expense));
        // three full months: seven monthly entries plus one rotating each
        assert_eq!(samples.len(), 24);
    }
}
