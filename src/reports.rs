use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::grouping::{group_by_period, BucketOrder, Granularity};
use crate::models::{Transaction, TransactionKind};

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl Totals {
    /// Income, expense and net over any slice of records. Empty input is all zeros.
    ///
    /// Amounts are capped at `MAX_AMOUNT` on entry, so these sums stay in range.
    pub fn of(records: &[Transaction]) -> Self {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for txn in records {
            debug_assert!(
                !txn.amount.is_sign_negative() || txn.amount.is_zero(),
                "negative amount on transaction {:?}",
                txn.id
            );
            match txn.kind {
                TransactionKind::Income => income += txn.amount,
                TransactionKind::Expense => expense += txn.amount,
            }
        }
        Totals {
            income,
            expense,
            net: income - expense,
        }
    }
}

// ---------------------------------------------------------------------------
// Period summaries
// ---------------------------------------------------------------------------

pub struct PeriodSummary {
    pub label: String,
    pub start: NaiveDate,
    pub totals: Totals,
    pub count: usize,
    pub members: Vec<Transaction>,
}

/// Group `records` and total each bucket.
pub fn period_summaries(
    records: &[Transaction],
    granularity: Granularity,
    order: BucketOrder,
) -> Vec<PeriodSummary> {
    group_by_period(records, granularity, order)
        .into_iter()
        .map(|bucket| PeriodSummary {
            totals: Totals::of(&bucket.members),
            count: bucket.members.len(),
            label: bucket.label,
            start: bucket.start,
            members: bucket.members,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category analytics
// ---------------------------------------------------------------------------

pub struct CategoryAnalysis {
    pub category: String,
    pub totals: Totals,
    pub periods: Vec<PeriodSummary>,
}

/// Distinct categories in use, sorted. Derived from the records on every call.
pub fn categories(records: &[Transaction]) -> Vec<String> {
    records
        .iter()
        .map(|t| t.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records whose category equals `category` exactly (case-sensitive).
pub fn in_category(records: &[Transaction], category: &str) -> Vec<Transaction> {
    records
        .iter()
        .filter(|t| t.category == category)
        .cloned()
        .collect()
}

pub fn analyze(
    records: &[Transaction],
    category: &str,
    granularity: Granularity,
    order: BucketOrder,
) -> CategoryAnalysis {
    let selected = in_category(records, category);
    let totals = Totals::of(&selected);
    let periods = period_summaries(&selected, granularity, order);
    tracing::debug!(
        category,
        records = selected.len(),
        periods = periods.len(),
        "analyzed category"
    );
    CategoryAnalysis {
        category: category.to_string(),
        totals,
        periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_timestamp, MAX_AMOUNT};
    use std::str::FromStr;

    fn txn(kind: TransactionKind, amount: &str, category: &str, description: &str, date: &str) -> Transaction {
        Transaction::new(
            kind,
            Decimal::from_str(amount).unwrap(),
            category,
            description,
            parse_timestamp(date).unwrap(),
        )
        .unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn(TransactionKind::Income, "1000", "Sales", "Jan sale", "2024-01-05"),
            txn(TransactionKind::Expense, "200", "Rent", "", "2024-01-10"),
        ]
    }

    fn mixed() -> Vec<Transaction> {
        vec![
            txn(TransactionKind::Expense, "12.40", "Food", "lunch", "2024-03-02"),
            txn(TransactionKind::Income, "50", "Food", "refund", "2024-02-20"),
            txn(TransactionKind::Expense, "30.10", "food", "snacks", "2024-02-15"),
            txn(TransactionKind::Expense, "7.50", "Food", "coffee", "2024-02-01"),
            txn(TransactionKind::Income, "900", "Salary", "", "2024-01-31"),
        ]
    }

    #[test]
    fn test_totals_scenario() {
        let t = Totals::of(&scenario());
        assert_eq!(t.income, Decimal::from(1000));
        assert_eq!(t.expense, Decimal::from(200));
        assert_eq!(t.net, Decimal::from(800));
    }

    #[test]
    fn test_totals_of_largest_amounts() {
        let big = txn(TransactionKind::Income, "1000000000000", "Sales", "", "2024-01-05");
        let mut records = vec![big.clone(); 10_000];
        records.push(Transaction { kind: TransactionKind::Expense, ..big });
        let t = Totals::of(&records);
        assert_eq!(t.income, MAX_AMOUNT * Decimal::from(10_000));
        assert_eq!(t.expense, MAX_AMOUNT);
        assert_eq!(t.net, MAX_AMOUNT * Decimal::from(9_999));
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(Totals::of(&[]), Totals::default());
        assert_eq!(Totals::of(&[]).net, Decimal::ZERO);
    }

    #[test]
    fn test_net_is_income_minus_expense() {
        for slice in [&mixed()[..], &mixed()[1..3], &scenario()[..1]] {
            let t = Totals::of(slice);
            assert_eq!(t.net, t.income - t.expense);
        }
    }

    #[test]
    fn test_totals_keep_decimal_precision() {
        let records = vec![
            txn(TransactionKind::Expense, "0.10", "X", "", "2024-01-01"),
            txn(TransactionKind::Expense, "0.20", "X", "", "2024-01-02"),
        ];
        assert_eq!(Totals::of(&records).expense, Decimal::from_str("0.30").unwrap());
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(categories(&mixed()), vec!["Food", "Salary", "food"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_category_match_is_exact() {
        let food = in_category(&mixed(), "Food");
        assert_eq!(food.len(), 3);
        assert!(food.iter().all(|t| t.category == "Food"));
    }

    #[test]
    fn test_analyze_per_month() {
        let analysis = analyze(&mixed(), "Food", Granularity::Month, BucketOrder::Period);
        assert_eq!(analysis.totals.income, Decimal::from(50));
        assert_eq!(analysis.totals.expense, Decimal::from_str("19.90").unwrap());
        assert_eq!(analysis.totals.net, Decimal::from_str("30.10").unwrap());

        let labels: Vec<&str> = analysis.periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["March 2024", "February 2024"]);
        let feb = &analysis.periods[1];
        assert_eq!(feb.count, 2);
        assert_eq!(feb.totals.income, Decimal::from(50));
        assert_eq!(feb.totals.expense, Decimal::from_str("7.50").unwrap());
        assert_eq!(feb.members[0].description, "refund");
    }

    #[test]
    fn test_analyze_counts_match_category_filter() {
        let records = mixed();
        for g in [Granularity::Week, Granularity::Month, Granularity::Year] {
            for cat in ["Food", "food", "Salary", "Missing"] {
                let analysis = analyze(&records, cat, g, BucketOrder::Period);
                let counted: usize = analysis.periods.iter().map(|p| p.count).sum();
                assert_eq!(counted, in_category(&records, cat).len());
            }
        }
    }

    #[test]
    fn test_analyze_unknown_category_is_empty() {
        let analysis = analyze(&mixed(), "Travel", Granularity::Year, BucketOrder::Period);
        assert!(analysis.periods.is_empty());
        assert_eq!(analysis.totals, Totals::default());
    }

    #[test]
    fn test_period_summaries_total_each_bucket() {
        let summaries = period_summaries(&mixed(), Granularity::Year, BucketOrder::Period);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].count, 5);
        assert_eq!(summaries[0].totals, Totals::of(&mixed()));
    }
}
