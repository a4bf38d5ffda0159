use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};

/// Storage format for timestamps. Lexical order matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest accepted amount (one trillion). Keeps every sum of stored amounts
/// far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(TallyError::Validation(format!(
                "unknown transaction type '{other}' (expected income or expense)"
            ))),
        }
    }
}

/// A single income or expense entry. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: &str,
        description: &str,
        timestamp: NaiveDateTime,
    ) -> Result<Self> {
        validate_amount(amount)?;
        let category = validate_category(category)?;
        Ok(Self {
            id: None,
            kind,
            amount,
            category,
            description: description.trim().to_string(),
            timestamp,
        })
    }

    /// Build the replacement record for an edit. The id is carried over.
    pub fn with_changes(&self, changes: TransactionChanges) -> Result<Self> {
        let amount = changes.amount.unwrap_or(self.amount);
        validate_amount(amount)?;
        let category = match changes.category {
            Some(c) => validate_category(&c)?,
            None => self.category.clone(),
        };
        Ok(Self {
            id: self.id,
            kind: changes.kind.unwrap_or(self.kind),
            amount,
            category,
            description: changes
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| self.description.clone()),
            timestamp: changes.timestamp.unwrap_or(self.timestamp),
        })
    }
}

/// Fields to replace when editing a transaction; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

pub(crate) fn validate_amount(amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TallyError::Validation(format!(
            "amount must not be negative, got {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(TallyError::Validation(format!(
            "amount must not exceed {MAX_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(TallyError::Validation("category is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parse a user-entered amount such as `1200`, `42.5` or `1,234.56`.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(TallyError::Validation("amount is required".to_string()));
    }
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| TallyError::Validation(format!("'{input}' is not a valid amount")))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TallyError::Validation(format!("'{input}' is not a valid date (YYYY-MM-DD)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_kind_parsing_is_closed() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!(" expense ".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        let err = "transfer".parse::<TransactionKind>().unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
    }

    #[test]
    fn test_kind_label_is_uppercase() {
        assert_eq!(TransactionKind::Income.label(), "INCOME");
        assert_eq!(TransactionKind::Expense.label(), "EXPENSE");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Decimal::new(123456, 2));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert!(matches!(parse_amount("abc"), Err(TallyError::Validation(_))));
        assert!(matches!(parse_amount(""), Err(TallyError::Validation(_))));
        assert!(matches!(parse_amount("-5"), Err(TallyError::Validation(_))));
    }

    #[test]
    fn test_parse_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000, 0));
        assert_eq!(parse_amount("1,000,000,000,000").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            parse_amount("1000000000000.01"),
            Err(TallyError::Validation(_))
        ));
        assert!(matches!(
            parse_amount("79228162514264337593543950335"),
            Err(TallyError::Validation(_))
        ));
        let result = Transaction::new(
            TransactionKind::Income,
            Decimal::MAX,
            "Sales",
            "",
            ts("2024-01-05"),
        );
        assert!(matches!(result, Err(TallyError::Validation(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(ts("2024-01-05").format(TIMESTAMP_FORMAT).to_string(), "2024-01-05 00:00:00");
        assert_eq!(ts("2024-01-05 14:30").format(TIMESTAMP_FORMAT).to_string(), "2024-01-05 14:30:00");
        assert!(parse_timestamp("05/01/2024").is_err());
    }

    #[test]
    fn test_new_rejects_blank_category() {
        let result = Transaction::new(
            TransactionKind::Expense,
            Decimal::new(10, 0),
            "   ",
            "",
            ts("2024-01-05"),
        );
        assert!(matches!(result, Err(TallyError::Validation(_))));
    }

    #[test]
    fn test_with_changes_keeps_id() {
        let mut original = Transaction::new(
            TransactionKind::Expense,
            Decimal::new(200, 0),
            "Rent",
            "",
            ts("2024-01-10"),
        )
        .unwrap();
        original.id = Some(7);
        let changed = original
            .with_changes(TransactionChanges {
                amount: Some(Decimal::new(250, 0)),
                description: Some("January rent".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(changed.id, Some(7));
        assert_eq!(changed.amount, Decimal::new(250, 0));
        assert_eq!(changed.category, "Rent");
        assert_eq!(changed.description, "January rent");
        assert_eq!(original.amount, Decimal::new(200, 0));
    }
}
