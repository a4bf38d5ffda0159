use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{filter_label, filtered_snapshot, open_store, FilterArgs};
use crate::error::Result;
use crate::fmt::{money, report_date};
use crate::models::{parse_amount, parse_timestamp, Transaction, TransactionChanges, TransactionKind};
use crate::settings::load_settings;

pub fn add(
    kind: &str,
    amount: &str,
    category: &str,
    description: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    // Validate everything before touching the store.
    let kind: TransactionKind = kind.parse()?;
    let amount = parse_amount(amount)?;
    let timestamp = match date {
        Some(d) => parse_timestamp(d)?,
        None => chrono::Local::now().naive_local(),
    };
    let txn = Transaction::new(kind, amount, category, description.unwrap_or(""), timestamp)?;

    let settings = load_settings();
    let store = open_store(&settings)?;
    let id = store.insert(&txn)?;
    store.close()?;
    println!(
        "Added {} #{id}: {} {}",
        txn.kind,
        money(txn.amount, &settings.currency_symbol),
        txn.category
    );
    Ok(())
}

pub fn update(
    id: i64,
    kind: Option<&str>,
    amount: Option<&str>,
    category: Option<String>,
    description: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let changes = TransactionChanges {
        kind: kind.map(str::parse::<TransactionKind>).transpose()?,
        amount: amount.map(parse_amount).transpose()?,
        category,
        description,
        timestamp: date.map(parse_timestamp).transpose()?,
    };

    let settings = load_settings();
    let store = open_store(&settings)?;
    let current = store.get(id)?;
    let replacement = current.with_changes(changes)?;
    store.update(&replacement)?;
    store.close()?;
    println!("Updated transaction #{id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let store = open_store(&load_settings())?;
    store.delete(id)?;
    store.close()?;
    println!("Deleted transaction #{id}");
    Ok(())
}

pub fn list(opts: &FilterArgs) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let rows = filtered_snapshot(&store, opts)?;
    store.close()?;

    let label = filter_label(opts)?;
    if rows.is_empty() {
        println!("No transactions for {}.", label.to_lowercase());
        return Ok(());
    }
    println!("Transactions: {label}\n{}", format_transactions(&rows, &settings.currency_symbol));
    Ok(())
}

pub fn format_transactions(rows: &[Transaction], symbol: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Category", "Description", "Amount"]);
    for t in rows {
        let kind = match t.kind {
            TransactionKind::Income => t.kind.label().green(),
            TransactionKind::Expense => t.kind.label().red(),
        };
        table.add_row(vec![
            Cell::new(t.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(report_date(&t.timestamp)),
            Cell::new(kind),
            Cell::new(&t.category),
            Cell::new(&t.description),
            Cell::new(money(t.amount, symbol)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
